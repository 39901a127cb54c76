//! REST API module for external integrations
//!
//! Provides a read-only HTTP API exposing control plane readiness,
//! operator health and Prometheus metrics.

mod dto;
mod handlers;
mod server;

pub use dto::{ControlPlaneListResponse, ControlPlaneReadiness};
pub use server::{router, run_server};
