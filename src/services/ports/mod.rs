//! Service ports: traits + data contracts.

pub mod edit;
pub mod workspace;

pub use edit::{
    FileEdit, Position, PositionEncoding, Range, ResourceChange, TextEdit, WorkspaceTransaction,
};
pub use workspace::{
    ApplyError, EditErrorKind, EditorAccess, NotificationSink, PersistenceGateway, ResourceStore,
};
