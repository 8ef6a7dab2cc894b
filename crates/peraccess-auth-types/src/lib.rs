//! Session-token types for PerAccess.
//!
//! Provides JWT validation and the session-cookie builders.

pub mod cookie;
pub mod token;
