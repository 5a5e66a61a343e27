//! Plan execution engine.
//!
//! This module implements the executor that takes operation plans
//! and applies them to the database.

use rusqlite::Connection;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::notification::NotificationEvent;
use crate::schedule::format_date;

use super::plan::{OperationPlan, PlanAction, Subject};

/// Result of executing a plan.
///
/// This struct provides information about what happened during execution,
/// including the events recorded in the outbox.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Descriptions of actions that were taken.
    pub actions_taken: Vec<String>,

    /// Warnings from the plan.
    pub warnings: Vec<String>,

    /// The entity the plan was about.
    pub subject: Option<Subject>,

    /// Events recorded in the outbox, with their ids.
    pub notifications: Vec<NotificationEvent>,
}

/// Executes operation plans against a connection.
///
/// Callers pass an open transaction so a failing action leaves nothing
/// behind once the transaction is dropped.
///
/// # Examples
///
/// ```no_run
/// use labres::database::{Database, DatabaseConfig};
/// use labres::operations::{OperationPlan, PlanExecutor};
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/labres.db")).unwrap();
/// let tx = db.begin_transaction().unwrap();
///
/// let plan = OperationPlan::new("Test operation");
/// let result = PlanExecutor::new(&tx).execute(&plan).unwrap();
/// tx.commit().unwrap();
/// assert!(result.notifications.is_empty());
/// ```
pub struct PlanExecutor<'a> {
    conn: &'a Connection,
}

impl<'a> PlanExecutor<'a> {
    /// Creates a new plan executor.
    #[must_use]
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Executes the given plan.
    ///
    /// # Errors
    ///
    /// Returns an error if any action fails to execute, including an update
    /// that matches no row.
    pub fn execute(&self, plan: &OperationPlan) -> Result<ExecutionResult> {
        let mut notifications = Vec::new();

        for action in &plan.actions {
            log::debug!("executing: {}", action.description());
            if let Some(event) = self.execute_action(action, plan)? {
                notifications.push(event);
            }
        }

        Ok(ExecutionResult {
            actions_taken: plan.actions.iter().map(PlanAction::description).collect(),
            warnings: plan.warnings.clone(),
            subject: plan.subject,
            notifications,
        })
    }

    /// Executes a single action.
    ///
    /// Returns the recorded event for notification actions.
    fn execute_action(
        &self,
        action: &PlanAction,
        plan: &OperationPlan,
    ) -> Result<Option<NotificationEvent>> {
        let conn = self.conn;
        let at = plan.timestamp;

        match action {
            PlanAction::InsertResource(resource) => {
                Database::insert_resource(conn, resource)?;
            }
            PlanAction::UpdateResourceStatus { id, status } => {
                if !Database::update_resource_status(conn, *id, *status, at)? {
                    return Err(Error::not_found(format!("resource {id}")));
                }
            }
            PlanAction::DeleteResource(id) => {
                if !Database::delete_resource(conn, *id)? {
                    return Err(Error::not_found(format!("resource {id}")));
                }
            }
            PlanAction::InsertReservation(reservation) => {
                Database::insert_reservation(conn, reservation)?;
            }
            PlanAction::UpdateReservationStatus { id, status, reason } => {
                if !Database::update_reservation_status(conn, *id, *status, reason.as_deref(), at)?
                {
                    return Err(Error::not_found(format!("reservation {id}")));
                }
            }
            PlanAction::ExtendReservation {
                id,
                end_date,
                end_time,
            } => {
                if !Database::update_reservation_end(conn, *id, *end_date, *end_time, at)? {
                    return Err(Error::not_found(format!("reservation {id}")));
                }
            }
            PlanAction::InsertRelease(release) => {
                Database::insert_release(conn, release)?;
            }
            PlanAction::UpdateReleaseStatus { id, status } => {
                if !Database::update_release_status(conn, *id, *status, at)? {
                    return Err(Error::not_found(format!("release {id}")));
                }
            }
            PlanAction::ReclaimReleaseDates {
                release,
                dates,
                by,
                status,
            } => {
                let marked = Database::mark_dates_reclaimed(conn, *release, dates, *by)?;
                if marked != dates.len() {
                    log::warn!(
                        "release {release}: {marked} of {} dates were still unreclaimed",
                        dates.len()
                    );
                }
                if !Database::update_release_status(conn, *release, *status, at)? {
                    return Err(Error::not_found(format!("release {release}")));
                }
            }
            PlanAction::ReturnReclaimedDates {
                release,
                from,
                dates,
                status,
            } => {
                for (date, to) in dates {
                    if !Database::transfer_reclaimed_date(conn, *release, *date, *from, *to)? {
                        log::warn!(
                            "release {release}: {} was not reclaimed by reservation {from}",
                            format_date(*date)
                        );
                    }
                }
                if !Database::update_release_status(conn, *release, *status, at)? {
                    return Err(Error::not_found(format!("release {release}")));
                }
            }
            PlanAction::RecordNotification(draft) => {
                let event = Database::insert_notification(conn, draft.clone())?;
                return Ok(Some(event));
            }
        }

        Ok(None)
    }
}
