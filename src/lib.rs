//! mesh-operator: readiness reporting for managed service mesh control planes
//!
//! This crate evaluates the workloads owned by a ServiceMeshControlPlane and
//! reports the result as a single Ready condition on the control plane.

pub mod controller;
pub mod crd;
pub mod error;

#[cfg(feature = "rest-api")]
pub mod rest_api;

pub use crate::error::{Error, Result};
