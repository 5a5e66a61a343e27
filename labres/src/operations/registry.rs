//! Resource registry planning.
//!
//! Registering, retiring and servicing resources is reserved to
//! administrators. Removing a resource takes its booking history with it, so
//! it is refused while anything on it is still pending or upcoming.

use crate::database::Database;
use crate::error::{Error, Result};
use crate::reservation::ReservationStatus;
use crate::resource::{NewResource, Resource, ResourceId, ResourceStatus};

use super::lookup;
use super::plan::{OperationPlan, PlanAction, PlanContext, Subject};

/// A registry change requested by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryRequest {
    /// Register a new resource.
    Create(NewResource),
    /// Put a resource into or out of maintenance.
    SetStatus {
        /// The resource.
        id: ResourceId,
        /// The new status.
        status: ResourceStatus,
    },
    /// Remove a resource and its history.
    Delete(ResourceId),
}

/// A registry plan generator.
///
/// # Examples
///
/// ```no_run
/// use labres::database::{Database, DatabaseConfig};
/// use labres::operations::{PlanContext, PlanExecutor, RegistryPlan, RegistryRequest};
/// use labres::{Actor, NewResource};
///
/// let mut db = Database::open(DatabaseConfig::new("/tmp/labres.db")).unwrap();
/// let admin = Actor::admin("carol").unwrap();
/// let tx = db.begin_transaction().unwrap();
/// let ctx = PlanContext {
///     conn: &tx,
///     actor: &admin,
///     now: chrono::Local::now().naive_local(),
///     timestamp: std::time::SystemTime::now(),
/// };
///
/// let plan = RegistryPlan::new(RegistryRequest::Create(NewResource::new("ws-01")))
///     .build_plan(&ctx)
///     .unwrap();
/// PlanExecutor::new(&tx).execute(&plan).unwrap();
/// tx.commit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RegistryPlan {
    request: RegistryRequest,
}

impl RegistryPlan {
    /// Creates a planner for `request`.
    #[must_use]
    pub const fn new(request: RegistryRequest) -> Self {
        Self { request }
    }

    /// Builds an operation plan for this registry request.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is not an administrator
    /// - The label is empty or already taken
    /// - The resource does not exist
    /// - A resource with pending or upcoming reservations is being deleted
    pub fn build_plan(&self, ctx: &PlanContext<'_>) -> Result<OperationPlan> {
        match &self.request {
            RegistryRequest::Create(spec) => {
                ctx.actor.require_admin("register resources")?;
                Self::plan_create(ctx, spec)
            }
            RegistryRequest::SetStatus { id, status } => {
                ctx.actor.require_admin("change resource status")?;
                Self::plan_set_status(ctx, *id, *status)
            }
            RegistryRequest::Delete(id) => {
                ctx.actor.require_admin("delete resources")?;
                Self::plan_delete(ctx, *id)
            }
        }
    }

    fn plan_create(ctx: &PlanContext<'_>, spec: &NewResource) -> Result<OperationPlan> {
        let id = Database::next_resource_id(ctx.conn)?;
        let resource = Resource::builder(id, &spec.label)
            .location(spec.location.clone())
            .specification(spec.specification.clone())
            .created_at(ctx.timestamp)
            .build()?;

        if Database::get_resource_by_label(ctx.conn, resource.label())?.is_some() {
            return Err(Error::validation(
                "label",
                format!("a resource labelled '{}' already exists", resource.label()),
            ));
        }

        Ok(
            OperationPlan::new(format!("Register resource '{}'", resource.label()))
                .at(ctx.timestamp)
                .about(Subject::Resource(id))
                .add_action(PlanAction::InsertResource(resource)),
        )
    }

    fn plan_set_status(
        ctx: &PlanContext<'_>,
        id: ResourceId,
        status: ResourceStatus,
    ) -> Result<OperationPlan> {
        let resource = lookup::resource(ctx.conn, id)?;
        let plan = OperationPlan::new(format!("Set resource {id} to {status}"))
            .at(ctx.timestamp)
            .about(Subject::Resource(id));

        if resource.status() == status {
            return Ok(plan.add_warning(format!("resource {id} is already {status}")));
        }
        Ok(plan.add_action(PlanAction::UpdateResourceStatus { id, status }))
    }

    fn plan_delete(ctx: &PlanContext<'_>, id: ResourceId) -> Result<OperationPlan> {
        let resource = lookup::resource(ctx.conn, id)?;

        let outstanding = Database::list_reservations_for_resource(ctx.conn, id)?
            .into_iter()
            .find(|r| {
                matches!(
                    r.effective_status(ctx.now),
                    ReservationStatus::Pending | ReservationStatus::Approved
                )
            });
        if let Some(blocking) = outstanding {
            log::debug!(
                "resource {id} still has {} in state {}",
                blocking.label(),
                blocking.status()
            );
            return Err(Error::illegal(
                format!("resource {id}"),
                format!("in use by {}", blocking.label()),
                "delete",
            ));
        }

        Ok(
            OperationPlan::new(format!("Delete resource '{}'", resource.label()))
                .at(ctx.timestamp)
                .about(Subject::Resource(id))
                .add_action(PlanAction::DeleteResource(id)),
        )
    }
}
