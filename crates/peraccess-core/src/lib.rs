//! Shared service plumbing: health endpoints, request-id layer, tracing
//! setup, and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
