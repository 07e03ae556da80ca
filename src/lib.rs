//! Fluent client for Azure Resource Manager networking resources
//!
//! Aggregates such as [`network::ApplicationGateway`] are defined locally,
//! their children (pools, listeners, rules, ...) wired together by name, and
//! the whole tree is submitted in one create-or-update call. References to
//! children that were removed before submission are dropped on the way out.

pub mod arm;
pub mod config;
pub mod error;
pub mod network;
pub mod resource;

pub use error::{NetworkError, Result};
