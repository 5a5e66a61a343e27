//! Release planning.
//!
//! Owners of an approved reservation may give back some of its dates for
//! others to book, and may withdraw the offer later. Dates someone already
//! booked stay with them.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::notification::{NotificationDraft, NotificationKind};
use crate::release::{Release, ReleaseId, ReleaseRequest, ReleaseStatus};
use crate::reservation::ReservationStatus;
use crate::schedule::format_date;

use super::lookup;
use super::plan::{OperationPlan, PlanAction, PlanContext, Subject};

/// A release plan generator.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    request: ReleaseRequest,
}

impl ReleasePlan {
    /// Creates a planner for `request`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use labres::operations::ReleasePlan;
    /// use labres::{ReleaseRequest, ReservationId};
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    /// let planner = ReleasePlan::new(ReleaseRequest::new(ReservationId::new(1), [day], "travel"));
    /// ```
    #[must_use]
    pub const fn new(request: ReleaseRequest) -> Self {
        Self { request }
    }

    /// Builds an operation plan for this release.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The reservation does not exist
    /// - The actor does not own it
    /// - It is not approved or already ended
    /// - No dates or no reason were given
    /// - A date is outside the reservation, in the past, or already held by
    ///   another release of the same reservation
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        let parent = lookup::reservation(ctx.conn, self.request.reservation)?;
        if !ctx.actor.owns(parent.owner()) {
            return Err(ctx.actor.denied(format!("release dates of {}", parent.label())));
        }

        let status = parent.effective_status(ctx.now);
        if status != ReservationStatus::Approved {
            return Err(Error::illegal(parent.label(), status, "release dates of"));
        }

        let id = Database::next_release_id(ctx.conn)?;
        let release = Release::builder(id, parent.id(), parent.owner().clone(), parent.resource())
            .dates(self.request.dates.iter().copied())
            .reason(&self.request.reason)
            .created_at(ctx.timestamp)
            .build()?;

        let today = ctx.now.date();
        let held: BTreeSet<NaiveDate> =
            Database::list_releases_for_reservation(ctx.conn, parent.id())?
                .iter()
                .flat_map(Release::claimed_dates)
                .collect();

        for date in release.original_dates() {
            let problem = if !parent.dates().contains(*date) {
                Some(format!("is outside {}", parent.dates()))
            } else if *date < today {
                Some("is in the past".to_string())
            } else if held.contains(date) {
                Some("is already released".to_string())
            } else {
                None
            };
            if let Some(problem) = problem {
                return Err(Error::validation(
                    "dates",
                    format!("{} {problem}", format_date(*date)),
                ));
            }
        }

        let listed: Vec<String> = release
            .original_dates()
            .iter()
            .map(|d| format_date(*d))
            .collect();
        let notice = NotificationDraft::release(
            NotificationKind::ReleaseCreated,
            parent.owner().clone(),
            parent.id(),
            id,
            format!(
                "{} gives back {} of {}",
                release.label(),
                listed.join(", "),
                parent.label()
            ),
            ctx.timestamp,
        );

        Ok(OperationPlan::new(format!("Release dates of {}", parent.label()))
            .at(ctx.timestamp)
            .about(Subject::Release(id))
            .add_action(PlanAction::InsertRelease(release))
            .add_action(PlanAction::RecordNotification(notice)))
    }
}

/// A plan generator withdrawing a release.
#[derive(Debug, Clone)]
pub struct CancelReleasePlan {
    id: ReleaseId,
    reason: Option<String>,
}

impl CancelReleasePlan {
    /// Creates a planner cancelling release `id`.
    #[must_use]
    pub fn new(id: ReleaseId, reason: Option<String>) -> Self {
        Self { id, reason }
    }

    /// Builds an operation plan for this cancellation.
    ///
    /// Reclaimed dates stay reclaimed; the rest go back to the parent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The release does not exist
    /// - The actor neither owns it nor is an administrator
    /// - It is already cancelled
    /// - An administrator cancels someone else's release without a reason
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        let release = lookup::release(ctx.conn, self.id)?;

        let on_behalf = if ctx.actor.owns(release.owner()) {
            false
        } else if ctx.actor.is_admin() {
            true
        } else {
            return Err(ctx.actor.denied(format!("cancel {}", release.label())));
        };

        if !release.is_live() {
            return Err(Error::illegal(release.label(), release.status(), "cancel"));
        }

        let reason = lookup::clean_reason(self.reason.as_deref());
        if on_behalf && reason.is_none() {
            return Err(Error::validation(
                "reason",
                "cancelling another user's release needs a reason",
            ));
        }

        let message = match &reason {
            Some(reason) => format!("{} was cancelled: {reason}", release.label()),
            None => format!("{} was cancelled", release.label()),
        };
        let notice = NotificationDraft::release(
            NotificationKind::ReleaseCancelled,
            release.owner().clone(),
            release.reservation(),
            release.id(),
            message,
            ctx.timestamp,
        );

        Ok(OperationPlan::new(format!("Cancel {}", release.label()))
            .at(ctx.timestamp)
            .about(Subject::Release(release.id()))
            .add_action(PlanAction::UpdateReleaseStatus {
                id: release.id(),
                status: ReleaseStatus::Cancelled,
            })
            .add_action(PlanAction::RecordNotification(notice)))
    }
}
