//! wsedit - workspace edit transaction engine
//!
//! Module structure:
//! - engine: headless core (planner, executor, coordinator, resource applier)
//! - services: ports (collaborator contracts) + adapters (local implementations)
//! - logging: tracing setup for embedding binaries

pub mod engine;
pub mod logging;
pub mod services;

pub use engine::coordinator::{
    TransactionCoordinator, TransactionError, TransactionReport, TransactionStatus,
};
pub use engine::executor::{Compensation, CompensationError};
pub use engine::planner::{ConflictError, DocumentEditPlan};
pub use engine::resources::ResourceOperationError;
pub use services::ports::{
    ApplyError, EditErrorKind, EditorAccess, FileEdit, NotificationSink, PersistenceGateway,
    Position, PositionEncoding, Range, ResourceChange, ResourceStore, TextEdit,
    WorkspaceTransaction,
};
