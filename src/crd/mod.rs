//! Custom Resource Definitions for the mesh operator
//!
//! This module defines the ServiceMeshControlPlane CRD and its status types.

mod control_plane;
pub mod types;


pub use control_plane::{ControlPlaneStatus, ServiceMeshControlPlane, ServiceMeshControlPlaneSpec};
pub use types::*;
