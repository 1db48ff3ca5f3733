//! Headless transaction core (plan/apply/compensate).

pub mod coordinator;
pub mod edits;
pub mod executor;
pub mod planner;
pub mod resources;

pub use coordinator::{
    TransactionCoordinator, TransactionError, TransactionReport, TransactionStatus,
};
pub use executor::{Compensation, CompensationError, PlanExecutor};
pub use planner::{ConflictError, DocumentEditPlan};
pub use resources::{ResourceChangeApplier, ResourceOperationError};
