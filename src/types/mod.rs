// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to keep operation and correlation ids apart.

mod cluster;
mod id;

pub use cluster::{ClusterHandle, ClusterIdError};
pub use id::{CorrelationId, Id, OperationId};
