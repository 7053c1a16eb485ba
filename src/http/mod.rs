//! HTTP server module.
//!
//! Serves the router over plain HTTP (TLS is terminated by the ingress in
//! front of the pods) and drains connections gracefully on SIGTERM/SIGINT,
//! which is what the kubelet sends when a pod is being replaced.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
