//! The reservation engine: the single entry point for every operation.
//!
//! Each mutation opens an IMMEDIATE transaction, plans against it, executes
//! the plan, reads the result back and commits. Notification events are
//! written to the outbox inside that transaction and handed to the emitter
//! only after the commit succeeded.

use std::sync::Arc;

use rusqlite::Connection;

use crate::actor::{Actor, UserId};
use crate::availability::{resource_availability, AvailabilitySettings, ResourceAvailability};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::conflict::Occupant;
use crate::database::{Database, DatabaseConfig};
use crate::error::{Error, Result};
use crate::notification::{LogEmitter, NotificationEmitter, NotificationEvent, NotificationId};
use crate::operations::{
    ApprovePlan, CancelPlan, CancelReleasePlan, ExtendPlan, OperationPlan, PlanContext,
    PlanExecutor, RegistryPlan, RegistryRequest, RejectPlan, ReleasePlan, ReservePlan, Subject,
};
use crate::policy::BookingPolicy;
use crate::release::{Release, ReleaseId, ReleaseRequest};
use crate::reservation::{
    ExtendRequest, Reservation, ReservationId, ReservationRequest, ReservationStatus,
};
use crate::resource::{NewResource, Resource, ResourceId, ResourceStatus};

/// What a mutation did.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    /// The entity as it is after the operation.
    pub value: T,
    /// Descriptions of the actions performed.
    pub actions: Vec<String>,
    /// Warnings raised while planning.
    pub warnings: Vec<String>,
    /// Events recorded in the outbox.
    pub notifications: Vec<NotificationEvent>,
    /// `false` for a dry run, whose writes were rolled back.
    pub committed: bool,
}

/// The lab reservation engine.
///
/// # Examples
///
/// ```no_run
/// use labres::database::DatabaseConfig;
/// use labres::{Actor, Engine, NewResource};
///
/// let mut engine = Engine::open(DatabaseConfig::new("/tmp/labres.db")).unwrap();
/// let admin = Actor::admin("carol").unwrap();
/// let ws = engine.create_resource(&admin, NewResource::new("ws-01")).unwrap();
/// assert_eq!(ws.value.label(), "ws-01");
/// ```
pub struct Engine {
    db: Database,
    policy: Arc<BookingPolicy>,
    availability: AvailabilitySettings,
    clock: Box<dyn Clock>,
    emitter: Option<Box<dyn NotificationEmitter>>,
    dry_run: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("db", &self.db)
            .field("policy", &self.policy)
            .field("availability", &self.availability)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine over an open database with the default policy,
    /// the system clock and a [`LogEmitter`].
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            db,
            policy: Arc::new(BookingPolicy::from_config(&Default::default())),
            availability: AvailabilitySettings::default(),
            clock: Box::new(SystemClock),
            emitter: Some(Box::new(LogEmitter)),
            dry_run: false,
        }
    }

    /// Opens the database and creates an engine with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        Ok(Self::new(Database::open(config)?))
    }

    /// Creates an engine whose policy and availability hours come from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the availability hours are invalid.
    pub fn from_config(db: Database, config: &Config) -> Result<Self> {
        let policy = BookingPolicy::from_config(&config.policy.clone().unwrap_or_default());
        let availability = AvailabilitySettings::from_config(config)?;
        log::debug!("booking policy rules: {:?}", policy.rule_names());
        Ok(Self::new(db)
            .with_policy(policy)
            .with_availability(availability))
    }

    /// Replaces the booking policy.
    #[must_use]
    pub fn with_policy(mut self, policy: BookingPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Replaces the availability settings.
    #[must_use]
    pub const fn with_availability(mut self, settings: AvailabilitySettings) -> Self {
        self.availability = settings;
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces the emitter.
    #[must_use]
    pub fn with_emitter(mut self, emitter: impl NotificationEmitter + 'static) -> Self {
        self.emitter = Some(Box::new(emitter));
        self
    }

    /// Leaves every event undelivered in the outbox.
    #[must_use]
    pub fn without_emitter(mut self) -> Self {
        self.emitter = None;
        self
    }

    /// Plans and executes mutations but rolls them back.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the current lab-local time.
    #[must_use]
    pub fn now(&self) -> chrono::NaiveDateTime {
        self.clock.now()
    }

    /// Returns the underlying database.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    // Registry

    /// Registers a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator or the label is
    /// empty or taken.
    pub fn create_resource(&mut self, actor: &Actor, spec: NewResource) -> Result<Outcome<Resource>> {
        let planner = RegistryPlan::new(RegistryRequest::Create(spec));
        self.apply(actor, |ctx| planner.build_plan(ctx), read_resource)
    }

    /// Puts a resource into or out of maintenance.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator or the resource
    /// does not exist.
    pub fn set_resource_status(
        &mut self,
        actor: &Actor,
        id: ResourceId,
        status: ResourceStatus,
    ) -> Result<Outcome<Resource>> {
        let planner = RegistryPlan::new(RegistryRequest::SetStatus { id, status });
        self.apply(actor, |ctx| planner.build_plan(ctx), read_resource)
    }

    /// Removes a resource and its whole booking history.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator, the resource
    /// does not exist, or it still has pending or upcoming reservations.
    pub fn delete_resource(&mut self, actor: &Actor, id: ResourceId) -> Result<Outcome<ResourceId>> {
        let planner = RegistryPlan::new(RegistryRequest::Delete(id));
        self.apply(actor, |ctx| planner.build_plan(ctx), |_, _| Ok(id))
    }

    // Reservations

    /// Submits a reservation request on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is unknown or under maintenance, the
    /// reason is blank, or the booking policy refuses the request.
    pub fn create_reservation(
        &mut self,
        actor: &Actor,
        request: ReservationRequest,
    ) -> Result<Outcome<Reservation>> {
        let policy = Arc::clone(&self.policy);
        self.apply(
            actor,
            |ctx| ReservePlan::new(request, &policy).build_plan(ctx),
            read_reservation,
        )
    }

    /// Approves a pending reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] naming the blocking reservation, or an
    /// authorization, not-found or state error.
    pub fn approve_reservation(
        &mut self,
        actor: &Actor,
        id: ReservationId,
    ) -> Result<Outcome<Reservation>> {
        self.apply(
            actor,
            |ctx| ApprovePlan::new(id).build_plan(ctx),
            read_reservation,
        )
    }

    /// Rejects a pending reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator, the reason is
    /// blank, or the reservation is not pending.
    pub fn reject_reservation(
        &mut self,
        actor: &Actor,
        id: ReservationId,
        reason: &str,
    ) -> Result<Outcome<Reservation>> {
        self.apply(
            actor,
            |ctx| RejectPlan::new(id, reason).build_plan(ctx),
            read_reservation,
        )
    }

    /// Cancels (owner) or revokes (administrator) a reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not cancel it, it is already
    /// finished, or a revocation has no reason.
    pub fn cancel_reservation(
        &mut self,
        actor: &Actor,
        id: ReservationId,
        reason: Option<&str>,
    ) -> Result<Outcome<Reservation>> {
        let reason = reason.map(str::to_string);
        self.apply(
            actor,
            |ctx| CancelPlan::new(id, reason).build_plan(ctx),
            read_reservation,
        )
    }

    /// Extends an approved reservation in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator, the request is
    /// empty or moves backwards, the policy refuses it, or the added time
    /// conflicts.
    pub fn extend_reservation(
        &mut self,
        actor: &Actor,
        id: ReservationId,
        request: ExtendRequest,
    ) -> Result<Outcome<Reservation>> {
        let policy = Arc::clone(&self.policy);
        self.apply(
            actor,
            |ctx| ExtendPlan::new(id, request, &policy).build_plan(ctx),
            read_reservation,
        )
    }

    // Releases

    /// Gives back dates of an approved reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not own the reservation, it is not
    /// upcoming and approved, or a date is not eligible.
    pub fn create_release(&mut self, actor: &Actor, request: ReleaseRequest) -> Result<Outcome<Release>> {
        self.apply(
            actor,
            |ctx| ReleasePlan::new(request).build_plan(ctx),
            read_release,
        )
    }

    /// Withdraws a release.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not cancel it, it is already
    /// cancelled, or an administrator gives no reason.
    pub fn cancel_release(
        &mut self,
        actor: &Actor,
        id: ReleaseId,
        reason: Option<&str>,
    ) -> Result<Outcome<Release>> {
        let reason = reason.map(str::to_string);
        self.apply(
            actor,
            |ctx| CancelReleasePlan::new(id, reason).build_plan(ctx),
            read_release,
        )
    }

    // Queries

    /// Returns a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub fn get_reservation(&self, id: ReservationId) -> Result<Reservation> {
        Database::get_reservation(self.db.connection(), id)?
            .ok_or_else(|| Error::not_found(format!("reservation {id}")))
    }

    /// Returns a release.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub fn get_release(&self, id: ReleaseId) -> Result<Release> {
        Database::get_release(self.db.connection(), id)?
            .ok_or_else(|| Error::not_found(format!("release {id}")))
    }

    /// Lists the reservations owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_reservations_for_user(&self, user: &UserId) -> Result<Vec<Reservation>> {
        Database::list_reservations_for_user(self.db.connection(), user)
    }

    /// Lists the reservations on a resource, optionally only those whose
    /// effective status is `status`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown resource.
    pub fn list_reservations_for_resource(
        &self,
        resource: ResourceId,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>> {
        let conn = self.db.connection();
        if Database::get_resource(conn, resource)?.is_none() {
            return Err(Error::not_found(format!("resource {resource}")));
        }
        let now = self.clock.now();
        Ok(Database::list_reservations_for_resource(conn, resource)?
            .into_iter()
            .filter(|r| status.map_or(true, |s| r.effective_status(now) == s))
            .collect())
    }

    /// Lists every resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_resources(&self) -> Result<Vec<Resource>> {
        Database::list_resources(self.db.connection())
    }

    /// Lists every resource with its current availability and next free
    /// window.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn list_resources_with_availability(&self) -> Result<Vec<ResourceAvailability>> {
        let conn = self.db.connection();
        let now = self.clock.now();

        Database::list_resources(conn)?
            .into_iter()
            .map(|resource| {
                let occupants = approved_occupants(conn, resource.id())?;
                Ok(resource_availability(
                    resource,
                    &occupants,
                    &self.availability,
                    now,
                ))
            })
            .collect()
    }

    /// Lists the releases on a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_releases_for_resource(&self, resource: ResourceId) -> Result<Vec<Release>> {
        Database::list_releases_for_resource(self.db.connection(), resource)
    }

    /// Lists the releases of a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown reservation.
    pub fn list_releases_for_reservation(&self, id: ReservationId) -> Result<Vec<Release>> {
        self.get_reservation(id)?;
        Database::list_releases_for_reservation(self.db.connection(), id)
    }

    /// Lists undelivered events, optionally only those for `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_undelivered_notifications(
        &self,
        user: Option<&UserId>,
    ) -> Result<Vec<NotificationEvent>> {
        Database::list_undelivered_notifications(self.db.connection(), user)
    }

    /// Lists every event addressed to `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_notifications_for_user(&self, user: &UserId) -> Result<Vec<NotificationEvent>> {
        Database::list_notifications_for_user(self.db.connection(), user)
    }

    /// Marks an event as delivered. Marking it twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown event.
    pub fn mark_notification_delivered(&self, id: NotificationId) -> Result<()> {
        if Database::mark_notification_delivered(self.db.connection(), id)? {
            Ok(())
        } else {
            Err(Error::not_found(format!("notification {id}")))
        }
    }

    /// Runs one mutation: plan, execute and read back inside an IMMEDIATE
    /// transaction, then commit (or roll back for a dry run) and deliver.
    fn apply<T>(
        &mut self,
        actor: &Actor,
        plan: impl FnOnce(&PlanContext<'_>) -> Result<OperationPlan>,
        read: impl FnOnce(&Connection, &OperationPlan) -> Result<T>,
    ) -> Result<Outcome<T>> {
        let now = self.clock.now();
        let timestamp = self.clock.timestamp();
        let lock_wait = self.db.config().busy_timeout.as_secs();

        let tx = self.db.begin_transaction()?;
        let ctx = PlanContext {
            conn: &tx,
            actor,
            now,
            timestamp,
        };

        let plan = plan(&ctx)?;
        log::debug!("{} by {actor}", plan.description);
        for warning in &plan.warnings {
            log::warn!("{warning}");
        }

        let result = PlanExecutor::new(&tx).execute(&plan)?;
        let value = read(&tx, &plan)?;

        if self.dry_run {
            log::info!("dry run: rolled back '{}'", plan.description);
            drop(tx);
        } else {
            tx.commit()
                .map_err(|e| Database::map_busy(Error::from(e), lock_wait))?;
            log::info!("{}", plan.description);
            self.deliver(&result.notifications);
        }

        Ok(Outcome {
            value,
            actions: result.actions_taken,
            warnings: result.warnings,
            notifications: result.notifications,
            committed: !self.dry_run,
        })
    }

    /// Hands committed events to the emitter. Failures are logged and the
    /// event stays undelivered.
    fn deliver(&self, events: &[NotificationEvent]) {
        let Some(emitter) = &self.emitter else {
            return;
        };

        for event in events {
            match emitter.emit(event) {
                Ok(()) => {
                    if let Err(e) = Database::mark_notification_delivered(self.db.connection(), event.id)
                    {
                        log::warn!("notification {} delivered but not marked: {e}", event.id);
                    }
                }
                Err(e) => log::warn!("could not deliver notification {}: {e}", event.id),
            }
        }
    }
}

fn approved_occupants(conn: &Connection, resource: ResourceId) -> Result<Vec<Occupant>> {
    Database::list_reservations_for_resource(conn, resource)?
        .into_iter()
        .filter(|r| r.status() == ReservationStatus::Approved)
        .map(|reservation| {
            let releases = Database::list_releases_for_reservation(conn, reservation.id())?;
            Ok(Occupant {
                reservation,
                releases,
            })
        })
        .collect()
}

fn read_resource(conn: &Connection, plan: &OperationPlan) -> Result<Resource> {
    match plan.subject {
        Some(Subject::Resource(id)) => Database::get_resource(conn, id)?
            .ok_or_else(|| Error::not_found(format!("resource {id}"))),
        _ => Err(Error::not_found(plan.description.clone())),
    }
}

fn read_reservation(conn: &Connection, plan: &OperationPlan) -> Result<Reservation> {
    match plan.subject {
        Some(Subject::Reservation(id)) => Database::get_reservation(conn, id)?
            .ok_or_else(|| Error::not_found(format!("reservation {id}"))),
        _ => Err(Error::not_found(plan.description.clone())),
    }
}

fn read_release(conn: &Connection, plan: &OperationPlan) -> Result<Release> {
    match plan.subject {
        Some(Subject::Release(id)) => Database::get_release(conn, id)?
            .ok_or_else(|| Error::not_found(format!("release {id}"))),
        _ => Err(Error::not_found(plan.description.clone())),
    }
}
