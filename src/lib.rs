//! kube-inspector: probe and identity service for container orchestration demos.
//!
//! Exposes liveness, readiness and health probes, a per-instance visit counter
//! and an identity endpoint. Each replica keeps its own counter and start time,
//! so requests spread across replicas show diverging state.

pub mod clock;
pub mod config;
pub mod counter;
pub mod error;
pub mod http;
pub mod identity;
pub mod middleware;
pub mod readiness;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::*;
