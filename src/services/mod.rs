//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used across the engine.
//! - `adapters`: local-process implementations (buffers, disk, filesystem,
//!   notifications, LSP ingestion, background runtime).

pub mod adapters;
pub mod ports;
