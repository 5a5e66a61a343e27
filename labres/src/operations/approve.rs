//! Approval planning and the reclaim of released dates.
//!
//! Approving runs the conflict check inside the write transaction, so the
//! decision and the status change cannot be split by another writer. Once a
//! reservation is approved over dates that others gave back, those dates are
//! marked as reclaimed by it.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::conflict::{Candidate, ConflictChecker};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::notification::{NotificationDraft, NotificationKind};
use crate::reservation::{Reservation, ReservationId, ReservationStatus};
use crate::schedule::{format_date, DateRange, TimeWindow};

use super::lookup;
use super::plan::{OperationPlan, PlanAction, PlanContext, Subject};

/// An approval plan generator.
#[derive(Debug, Clone, Copy)]
pub struct ApprovePlan {
    id: ReservationId,
}

impl ApprovePlan {
    /// Creates a planner approving reservation `id`.
    #[must_use]
    pub const fn new(id: ReservationId) -> Self {
        Self { id }
    }

    /// Builds an operation plan for this approval.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is not an administrator
    /// - The reservation does not exist or is not pending
    /// - An approved reservation on the resource overlaps it
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        ctx.actor.require_admin("approve reservations")?;
        let reservation = lookup::reservation(ctx.conn, self.id)?;

        let status = reservation.effective_status(ctx.now);
        if status != ReservationStatus::Pending {
            return Err(Error::illegal(reservation.label(), status, "approve"));
        }

        let candidate = Candidate::new(
            reservation.resource(),
            reservation.dates(),
            reservation.window(),
            reservation.owner(),
        )
        .ignoring(reservation.id());
        ConflictChecker::ensure_clear(ctx.conn, &candidate)?;

        let notice = NotificationDraft::reservation(
            NotificationKind::ReservationApproved,
            reservation.owner().clone(),
            reservation.id(),
            format!(
                "{} for {} {} was approved",
                reservation.label(),
                reservation.dates(),
                reservation.window()
            ),
            ctx.timestamp,
        );

        Ok(
            OperationPlan::new(format!("Approve {}", reservation.label()))
                .at(ctx.timestamp)
                .about(Subject::Reservation(reservation.id()))
                .add_action(PlanAction::UpdateReservationStatus {
                    id: reservation.id(),
                    status: ReservationStatus::Approved,
                    reason: None,
                })
                .add_actions(reclaim_actions(
                    ctx,
                    &reservation,
                    &[(reservation.dates(), reservation.window())],
                )?)
                .add_action(PlanAction::RecordNotification(notice)),
        )
    }
}

/// Plans the reclaim of released dates by `reservation` within `regions`.
///
/// Every live release on the same resource owned by someone else gives up
/// the active dates that fall inside a region whose window overlaps the
/// released reservation's window. Each affected release owner is notified
/// once.
pub(crate) fn reclaim_actions(
    ctx: &PlanContext<'_>,
    reservation: &Reservation,
    regions: &[(DateRange, TimeWindow)],
) -> Result<Vec<PlanAction>> {
    let mut actions = Vec::new();

    for release in Database::list_releases_for_resource(ctx.conn, reservation.resource())? {
        if !release.is_live() || release.owner() == reservation.owner() {
            continue;
        }
        let parent = lookup::reservation(ctx.conn, release.reservation())?;

        let taken: BTreeSet<NaiveDate> = release
            .active_dates()
            .into_iter()
            .filter(|d| {
                regions.iter().any(|(dates, window)| {
                    dates.contains(*d) && window.overlaps(&parent.window())
                })
            })
            .collect();
        if taken.is_empty() {
            continue;
        }

        let status = release.status_after_reclaim(&taken);
        let listed: Vec<String> = taken.iter().map(|d| format_date(*d)).collect();
        log::debug!(
            "{} reclaims {} from {}",
            reservation.label(),
            listed.join(", "),
            release.label()
        );

        actions.push(PlanAction::ReclaimReleaseDates {
            release: release.id(),
            dates: taken.into_iter().collect(),
            by: reservation.id(),
            status,
        });
        actions.push(PlanAction::RecordNotification(NotificationDraft::release(
            NotificationKind::ReleaseReclaimed,
            release.owner().clone(),
            release.reservation(),
            release.id(),
            format!(
                "{} of reservation {} was booked on {}",
                release.label(),
                release.reservation(),
                listed.join(", ")
            ),
            ctx.timestamp,
        )));
    }

    Ok(actions)
}
