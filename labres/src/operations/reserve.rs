//! Reservation request planning.
//!
//! A new request is validated against the resource and the booking policy
//! and stored as pending. Conflicts are not looked at here; they are decided
//! when an administrator approves.

use crate::database::Database;
use crate::error::{Error, Result};
use crate::notification::{NotificationDraft, NotificationKind};
use crate::policy::{BookingPolicy, PolicyContext};
use crate::reservation::{Reservation, ReservationRequest};

use super::lookup;
use super::plan::{OperationPlan, PlanAction, PlanContext, Subject};

/// A reservation plan generator.
///
/// This struct is responsible for analyzing a booking request and
/// generating a plan that stores it as pending.
pub struct ReservePlan<'a> {
    request: ReservationRequest,
    policy: &'a BookingPolicy,
}

impl<'a> ReservePlan<'a> {
    /// Creates a new reserve plan for `request`, checked against `policy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime};
    /// use labres::operations::ReservePlan;
    /// use labres::policy::BookingPolicy;
    /// use labres::{DateRange, ReservationRequest, ResourceId, TimeWindow};
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    /// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
    /// let request = ReservationRequest::new(
    ///     ResourceId::new(1),
    ///     DateRange::single(day),
    ///     TimeWindow::new(at(9), at(12)).unwrap(),
    ///     "benchmarks",
    /// );
    /// let policy = BookingPolicy::permissive();
    /// let planner = ReservePlan::new(request, &policy);
    /// ```
    #[must_use]
    pub const fn new(request: ReservationRequest, policy: &'a BookingPolicy) -> Self {
        Self { request, policy }
    }

    /// Builds an operation plan for this request.
    ///
    /// This method performs all validation and determines what actions
    /// are needed. It does NOT modify the database.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The resource does not exist
    /// - The resource is under maintenance
    /// - The reason is empty after trimming
    /// - A booking policy rule rejects the request
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        let request = &self.request;
        let resource = lookup::resource(ctx.conn, request.resource)?;
        if resource.in_maintenance() {
            return Err(Error::validation(
                "resource",
                format!("resource '{}' is under maintenance", resource.label()),
            ));
        }

        let id = Database::next_reservation_id(ctx.conn)?;
        let reservation = Reservation::builder(
            id,
            ctx.actor.id().clone(),
            resource.id(),
            request.dates,
            request.window,
        )
        .reason(&request.reason)
        .metadata(request.metadata.clone())
        .created_at(ctx.timestamp)
        .build()?;

        self.policy.evaluate(
            PolicyContext::Create,
            &reservation.dates(),
            &reservation.window(),
            ctx.now,
        )?;

        let message = format!(
            "{} on '{}' for {} {} is awaiting approval",
            reservation.label(),
            resource.label(),
            reservation.dates(),
            reservation.window()
        );
        let notice = NotificationDraft::reservation(
            NotificationKind::ReservationCreated,
            reservation.owner().clone(),
            id,
            message,
            ctx.timestamp,
        );

        Ok(OperationPlan::new(format!(
            "Request '{}' for {}",
            resource.label(),
            ctx.actor.id()
        ))
        .at(ctx.timestamp)
        .about(Subject::Reservation(id))
        .add_action(PlanAction::InsertReservation(reservation))
        .add_action(PlanAction::RecordNotification(notice)))
    }
}
