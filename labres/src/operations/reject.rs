//! Rejection planning.

use crate::error::{Error, Result};
use crate::notification::{NotificationDraft, NotificationKind};
use crate::reservation::{ReservationId, ReservationStatus};

use super::lookup;
use super::plan::{OperationPlan, PlanAction, PlanContext, Subject};

/// A rejection plan generator.
#[derive(Debug, Clone)]
pub struct RejectPlan {
    id: ReservationId,
    reason: String,
}

impl RejectPlan {
    /// Creates a planner rejecting reservation `id` for `reason`.
    #[must_use]
    pub fn new(id: ReservationId, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }

    /// Builds an operation plan for this rejection.
    ///
    /// Rejecting an already rejected reservation is an illegal transition,
    /// not a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is not an administrator
    /// - The reservation does not exist or is not pending
    /// - The reason is empty after trimming
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        ctx.actor.require_admin("reject reservations")?;
        let reservation = lookup::reservation(ctx.conn, self.id)?;
        let status = reservation.effective_status(ctx.now);
        if status != ReservationStatus::Pending {
            return Err(Error::illegal(reservation.label(), status, "reject"));
        }

        let reason = lookup::clean_reason(Some(&self.reason))
            .ok_or_else(|| Error::validation("reason", "a rejection needs a reason"))?;

        let notice = NotificationDraft::reservation(
            NotificationKind::ReservationRejected,
            reservation.owner().clone(),
            reservation.id(),
            format!("{} was rejected: {reason}", reservation.label()),
            ctx.timestamp,
        );

        Ok(OperationPlan::new(format!("Reject {}", reservation.label()))
            .at(ctx.timestamp)
            .about(Subject::Reservation(reservation.id()))
            .add_action(PlanAction::UpdateReservationStatus {
                id: reservation.id(),
                status: ReservationStatus::Rejected,
                reason: Some(reason),
            })
            .add_action(PlanAction::RecordNotification(notice)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::database::test_util::{
        create_test_database, insert_test_reservation, insert_test_resource, plan_context,
    };
    use crate::database::Database;
    use crate::operations::PlanExecutor;

    #[test]
    fn test_plan_reject_pending() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (2, 3), (9, 12), ReservationStatus::Pending);
        let admin = Actor::admin("carol").unwrap();

        let plan = RejectPlan::new(r.id(), "  lab closed  ")
            .build_plan(&plan_context(conn, &admin))
            .unwrap();
        let result = PlanExecutor::new(conn).execute(&plan).unwrap();
        assert!(result.notifications[0].message.contains("lab closed"));

        let stored = Database::get_reservation(conn, r.id()).unwrap().unwrap();
        assert_eq!(stored.status(), ReservationStatus::Rejected);
        assert_eq!(stored.decision_reason(), Some("lab closed"));
    }

    #[test]
    fn test_plan_reject_twice_is_illegal() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (2, 3), (9, 12), ReservationStatus::Rejected);
        let admin = Actor::admin("carol").unwrap();

        let err = RejectPlan::new(r.id(), "again")
            .build_plan(&plan_context(conn, &admin))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalStateTransition { .. }));

        // State is checked before the reason
        let err = RejectPlan::new(r.id(), "")
            .build_plan(&plan_context(conn, &admin))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalStateTransition { .. }));
    }

    #[test]
    fn test_plan_reject_needs_reason() {
        let db = create_test_database();
        let conn = db.connection();
        let ws = insert_test_resource(conn, "ws-01");
        let r = insert_test_reservation(conn, ws.id(), "alice", (2, 3), (9, 12), ReservationStatus::Pending);
        let admin = Actor::admin("carol").unwrap();

        let err = RejectPlan::new(r.id(), " ")
            .build_plan(&plan_context(conn, &admin))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "reason"));

        let alice = Actor::user("alice").unwrap();
        let err = RejectPlan::new(r.id(), "no")
            .build_plan(&plan_context(conn, &alice))
            .unwrap_err();
        assert!(matches!(err, Error::Authorization { .. }));
    }
}
