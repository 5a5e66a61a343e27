//! Cancellation and revocation planning.
//!
//! The owner cancels; an administrator acting on someone else's reservation
//! revokes and must say why. Either way the live releases of the
//! reservation go with it, and released dates it had booked are returned.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::database::Database;
use crate::error::{Error, Result};
use crate::notification::{NotificationDraft, NotificationKind};
use crate::release::ReleaseStatus;
use crate::reservation::{Reservation, ReservationId, ReservationStatus};

use super::lookup;
use super::plan::{OperationPlan, PlanAction, PlanContext, Subject};

/// A cancellation plan generator.
#[derive(Debug, Clone)]
pub struct CancelPlan {
    id: ReservationId,
    reason: Option<String>,
}

impl CancelPlan {
    /// Creates a planner cancelling reservation `id`.
    #[must_use]
    pub fn new(id: ReservationId, reason: Option<String>) -> Self {
        Self { id, reason }
    }

    /// Builds an operation plan for this cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The reservation does not exist
    /// - The actor neither owns it nor is an administrator
    /// - It is not pending or upcoming
    /// - An administrator revokes without a reason
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        let reservation = lookup::reservation(ctx.conn, self.id)?;

        let revoking = if ctx.actor.owns(reservation.owner()) {
            false
        } else if ctx.actor.is_admin() {
            true
        } else {
            return Err(ctx.actor.denied(format!("cancel {}", reservation.label())));
        };

        let status = reservation.effective_status(ctx.now);
        if !matches!(
            status,
            ReservationStatus::Pending | ReservationStatus::Approved
        ) {
            return Err(Error::illegal(reservation.label(), status, "cancel"));
        }

        let reason = lookup::clean_reason(self.reason.as_deref());
        if revoking && reason.is_none() {
            return Err(Error::validation(
                "reason",
                "revoking another user's reservation needs a reason",
            ));
        }

        let releases: Vec<PlanAction> =
            Database::list_releases_for_reservation(ctx.conn, reservation.id())?
                .into_iter()
                .filter(|r| r.is_live())
                .map(|r| PlanAction::UpdateReleaseStatus {
                    id: r.id(),
                    status: ReleaseStatus::Cancelled,
                })
                .collect();

        let returned = if status == ReservationStatus::Approved {
            return_actions(ctx, &reservation)?
        } else {
            Vec::new()
        };

        let (kind, verb) = if revoking {
            (NotificationKind::ReservationRevoked, "revoked")
        } else {
            (NotificationKind::ReservationCancelled, "cancelled")
        };
        let message = match &reason {
            Some(reason) => format!("{} was {verb}: {reason}", reservation.label()),
            None => format!("{} was {verb}", reservation.label()),
        };
        let notice = NotificationDraft::reservation(
            kind,
            reservation.owner().clone(),
            reservation.id(),
            message,
            ctx.timestamp,
        );

        let label = if revoking { "Revoke" } else { "Cancel" };
        Ok(OperationPlan::new(format!("{label} {}", reservation.label()))
            .at(ctx.timestamp)
            .about(Subject::Reservation(reservation.id()))
            .add_action(PlanAction::UpdateReservationStatus {
                id: reservation.id(),
                status: ReservationStatus::Cancelled,
                reason,
            })
            .add_actions(releases)
            .add_actions(returned)
            .add_action(PlanAction::RecordNotification(notice)))
    }
}

/// Plans giving back the released dates `reservation` reclaimed.
///
/// Another approved reservation whose window overlaps the released
/// reservation's window on that date takes the reclaim over; otherwise the
/// reclaim is cleared and the date is back in the release.
fn return_actions(ctx: &PlanContext<'_>, reservation: &Reservation) -> Result<Vec<PlanAction>> {
    let mut actions = Vec::new();
    let approved: Vec<Reservation> =
        Database::list_reservations_for_resource(ctx.conn, reservation.resource())?
            .into_iter()
            .filter(|r| r.status() == ReservationStatus::Approved && r.id() != reservation.id())
            .collect();

    for release in Database::list_releases_for_resource(ctx.conn, reservation.resource())? {
        let ours: Vec<NaiveDate> = release
            .reclaimed()
            .iter()
            .filter(|(_, by)| **by == reservation.id())
            .map(|(date, _)| *date)
            .collect();
        if ours.is_empty() {
            continue;
        }

        let parent = lookup::reservation(ctx.conn, release.reservation())?;
        let dates: Vec<(NaiveDate, Option<ReservationId>)> = ours
            .into_iter()
            .map(|date| {
                let next = approved
                    .iter()
                    .find(|r| {
                        r.owner() != release.owner()
                            && r.dates().contains(date)
                            && r.window().overlaps(&parent.window())
                    })
                    .map(Reservation::id);
                (date, next)
            })
            .collect();
        let cleared: BTreeSet<NaiveDate> = dates
            .iter()
            .filter(|(_, next)| next.is_none())
            .map(|(date, _)| *date)
            .collect();

        log::debug!(
            "{} returns {} date(s) to {}",
            reservation.label(),
            cleared.len(),
            release.label()
        );
        actions.push(PlanAction::ReturnReclaimedDates {
            release: release.id(),
            from: reservation.id(),
            status: release.status_after_return(&cleared),
            dates,
        });
    }

    Ok(actions)
}
