//! Ledger operations using the plan-execute pattern.
//!
//! This module provides a plan-execute pattern for every mutation,
//! separating planning from execution to enable dry-run mode, better testing,
//! and clear error messages.
//!
//! # Architecture
//!
//! Operations are split into two phases:
//! 1. **Planning**: Checks authorization, state and constraints against the
//!    open transaction and builds a plan
//! 2. **Execution**: Takes the plan and performs the database writes,
//!    recording notification events in the outbox
//!
//! # Examples
//!
//! ```no_run
//! use labres::database::{Database, DatabaseConfig};
//! use labres::operations::{ApprovePlan, PlanContext, PlanExecutor};
//! use labres::{Actor, ReservationId};
//!
//! let mut db = Database::open(DatabaseConfig::new("/tmp/labres.db")).unwrap();
//! let admin = Actor::admin("carol").unwrap();
//!
//! let tx = db.begin_transaction().unwrap();
//! let ctx = PlanContext {
//!     conn: &tx,
//!     actor: &admin,
//!     now: chrono::Local::now().naive_local(),
//!     timestamp: std::time::SystemTime::now(),
//! };
//!
//! // Generate plan
//! let plan = ApprovePlan::new(ReservationId::new(1)).build_plan(&ctx).unwrap();
//!
//! // Execute plan
//! let result = PlanExecutor::new(&tx).execute(&plan).unwrap();
//! tx.commit().unwrap();
//! ```

pub mod approve;
pub mod cancel;
pub mod executor;
pub mod extend;
mod lookup;
pub mod plan;
pub mod registry;
pub mod reject;
pub mod release;
pub mod reserve;

#[cfg(test)]
mod proptests;

pub use approve::ApprovePlan;
pub use cancel::CancelPlan;
pub use executor::{ExecutionResult, PlanExecutor};
pub use extend::ExtendPlan;
pub use plan::{OperationPlan, PlanAction, PlanContext, Subject};
pub use registry::{RegistryPlan, RegistryRequest};
pub use reject::RejectPlan;
pub use release::{CancelReleasePlan, ReleasePlan};
pub use reserve::ReservePlan;
