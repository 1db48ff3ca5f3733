//! Local adapters for the engine's collaborator ports.

pub mod buffer;
pub mod disk;
pub mod fs;
pub mod lsp;
pub mod notify;
pub mod runtime;

pub use buffer::OpenBuffers;
pub use disk::LocalDisk;
pub use fs::LocalResourceStore;
pub use lsp::transaction_from_lsp;
pub use notify::TracingSink;
pub use runtime::{ChannelSink, TransactionMessage, TransactionService};
