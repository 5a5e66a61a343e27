//! Extension planning for approved reservations.
//!
//! An extension only ever grows a reservation: later last date, later daily
//! end, or both. Only the newly covered time is checked for conflicts since
//! the rest is already held.

use crate::conflict::{Candidate, ConflictChecker};
use crate::error::{Error, Result};
use crate::notification::{NotificationDraft, NotificationKind};
use crate::policy::{BookingPolicy, PolicyContext};
use crate::reservation::{ExtendRequest, ReservationId, ReservationStatus};
use crate::schedule::{format_date, format_time, DateRange, TimeWindow};

use super::approve::reclaim_actions;
use super::lookup;
use super::plan::{OperationPlan, PlanAction, PlanContext, Subject};

/// An extension plan generator.
pub struct ExtendPlan<'a> {
    id: ReservationId,
    request: ExtendRequest,
    policy: &'a BookingPolicy,
}

impl<'a> ExtendPlan<'a> {
    /// Creates a planner extending reservation `id`.
    #[must_use]
    pub const fn new(id: ReservationId, request: ExtendRequest, policy: &'a BookingPolicy) -> Self {
        Self {
            id,
            request,
            policy,
        }
    }

    /// Builds an operation plan for this extension.
    ///
    /// Asking for the current end values yields an empty plan with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is not an administrator
    /// - Neither a new end date nor a new end time was given
    /// - The reservation does not exist, is not approved or already ended
    /// - Either value moves backwards
    /// - A booking policy rule rejects the extended reservation
    /// - Another approved reservation holds part of the added time
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        ctx.actor.require_admin("extend reservations")?;
        if self.request.is_empty() {
            return Err(Error::validation(
                "new_end_date",
                "give a new end date, a new end time or both",
            ));
        }

        let reservation = lookup::reservation(ctx.conn, self.id)?;
        let status = reservation.effective_status(ctx.now);
        if status != ReservationStatus::Approved {
            return Err(Error::illegal(reservation.label(), status, "extend"));
        }

        let old_dates = reservation.dates();
        let old_window = reservation.window();
        let end_date = self.request.new_end_date.unwrap_or(old_dates.end());
        let end_time = self.request.new_end_time.unwrap_or(old_window.end());

        if end_date < old_dates.end() {
            return Err(Error::validation(
                "new_end_date",
                format!(
                    "{} is before the current end date {}",
                    format_date(end_date),
                    format_date(old_dates.end())
                ),
            ));
        }
        if end_time < old_window.end() {
            return Err(Error::validation(
                "new_end_time",
                format!(
                    "{} is before the current end time {}",
                    format_time(end_time),
                    format_time(old_window.end())
                ),
            ));
        }

        let plan = OperationPlan::new(format!("Extend {}", reservation.label()))
            .at(ctx.timestamp)
            .about(Subject::Reservation(reservation.id()));
        if end_date == old_dates.end() && end_time == old_window.end() {
            return Ok(plan.add_warning(format!(
                "{} already ends on {} at {}",
                reservation.label(),
                format_date(end_date),
                format_time(end_time)
            )));
        }

        let dates = DateRange::new(old_dates.start(), end_date)?;
        let window = TimeWindow::new(old_window.start(), end_time)?;
        self.policy
            .evaluate(PolicyContext::Extend, &dates, &window, ctx.now)?;

        let mut regions = Vec::new();
        if end_time > old_window.end() {
            regions.push((old_dates, TimeWindow::new(old_window.end(), end_time)?));
        }
        if let Some(first_new) = old_dates.end().succ_opt().filter(|d| *d <= end_date) {
            regions.push((DateRange::new(first_new, end_date)?, window));
        }

        let base = Candidate::new(
            reservation.resource(),
            dates,
            window,
            reservation.owner(),
        )
        .ignoring(reservation.id());
        ConflictChecker::check_regions(ctx.conn, &base, &regions)?.into_result()?;

        let notice = NotificationDraft::reservation(
            NotificationKind::ReservationExtended,
            reservation.owner().clone(),
            reservation.id(),
            format!(
                "{} now runs {dates} {window}",
                reservation.label()
            ),
            ctx.timestamp,
        );

        Ok(plan
            .add_action(PlanAction::ExtendReservation {
                id: reservation.id(),
                end_date,
                end_time,
            })
            .add_actions(reclaim_actions(ctx, &reservation, &regions)?)
            .add_action(PlanAction::RecordNotification(notice)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::database::test_util::{
        create_test_database, date, insert_test_reservation, insert_test_resource, plan_context,
    };
    use crate::database::Database;
    use crate::operations::PlanExecutor;
    use chrono::NaiveTime;

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn to(date: Option<chrono::NaiveDate>, time: Option<NaiveTime>) -> ExtendRequest {
        ExtendRequest {
            new_end_date: date,
            new_end_time: time,
        }
    }

    #[test]
    fn test_plan_extend_date_and_time() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (1, 3), (9, 12), ReservationStatus::Approved);
        let admin = Actor::admin("carol").unwrap();
        let policy = BookingPolicy::permissive();

        let plan = ExtendPlan::new(r.id(), to(Some(date(5)), Some(at(14))), &policy)
            .build_plan(&plan_context(conn, &admin))
            .unwrap();
        let result = PlanExecutor::new(conn).execute(&plan).unwrap();
        assert_eq!(result.notifications[0].kind, NotificationKind::ReservationExtended);

        let stored = Database::get_reservation(conn, r.id()).unwrap().unwrap();
        assert_eq!(stored.id(), r.id());
        assert_eq!(stored.dates().end(), date(5));
        assert_eq!(stored.window().end(), at(14));
        assert_eq!(stored.window().start(), at(9));
    }

    #[test]
    fn test_plan_extend_same_values_is_noop() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (1, 3), (9, 12), ReservationStatus::Approved);
        let admin = Actor::admin("carol").unwrap();
        let policy = BookingPolicy::permissive();

        let plan = ExtendPlan::new(r.id(), to(Some(date(3)), Some(at(12))), &policy)
            .build_plan(&plan_context(conn, &admin))
            .unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.notifications().count(), 0);
    }

    #[test]
    fn test_plan_extend_backwards() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (1, 3), (9, 12), ReservationStatus::Approved);
        let admin = Actor::admin("carol").unwrap();
        let policy = BookingPolicy::permissive();
        let ctx = plan_context(conn, &admin);

        let err = ExtendPlan::new(r.id(), to(Some(date(2)), None), &policy)
            .build_plan(&ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "new_end_date"));

        let err = ExtendPlan::new(r.id(), to(None, Some(at(11))), &policy)
            .build_plan(&ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "new_end_time"));

        let err = ExtendPlan::new(r.id(), to(None, None), &policy)
            .build_plan(&ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_plan_extend_pending_is_illegal() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (1, 3), (9, 12), ReservationStatus::Pending);
        let admin = Actor::admin("carol").unwrap();
        let policy = BookingPolicy::permissive();

        let err = ExtendPlan::new(r.id(), to(Some(date(4)), None), &policy)
            .build_plan(&plan_context(conn, &admin))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalStateTransition { .. }));
    }

    #[test]
    fn test_plan_extend_checks_added_days() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (1, 3), (9, 12), ReservationStatus::Approved);
        let blocker = insert_test_reservation(conn, ws.id(), "bob", (5, 5), (10, 11), ReservationStatus::Approved);
        let admin = Actor::admin("carol").unwrap();
        let policy = BookingPolicy::permissive();

        let err = ExtendPlan::new(r.id(), to(Some(date(6)), None), &policy)
            .build_plan(&plan_context(conn, &admin))
            .unwrap_err();
        assert_eq!(err.blocking_reservation(), Some(blocker.id()));

        let plan = ExtendPlan::new(r.id(), to(Some(date(4)), None), &policy)
            .build_plan(&plan_context(conn, &admin));
        assert!(plan.is_ok());
    }

    #[test]
    fn test_plan_extend_checks_added_hours() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (1, 3), (9, 12), ReservationStatus::Approved);
        let blocker = insert_test_reservation(conn, ws.id(), "bob", (2, 2), (13, 15), ReservationStatus::Approved);
        let admin = Actor::admin("carol").unwrap();
        let policy = BookingPolicy::permissive();

        let err = ExtendPlan::new(r.id(), to(None, Some(at(14))), &policy)
            .build_plan(&plan_context(conn, &admin))
            .unwrap_err();
        assert_eq!(err.blocking_reservation(), Some(blocker.id()));

        let plan = ExtendPlan::new(r.id(), to(None, Some(at(13))), &policy)
            .build_plan(&plan_context(conn, &admin));
        assert!(plan.is_ok());
    }
}
