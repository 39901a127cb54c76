//! HTTP handlers for the REST API

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kube::api::Api;
use tracing::{error, instrument};

use crate::controller::ControllerState;
use crate::crd::ServiceMeshControlPlane;

use super::dto::{
    ControlPlaneListResponse, ControlPlaneReadiness, ErrorResponse, HealthResponse,
};

/// Health check endpoint
#[instrument]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List the readiness of all control planes
#[instrument(skip(state))]
pub async fn list_control_planes(
    State(state): State<Arc<ControllerState>>,
) -> Result<Json<ControlPlaneListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let api: Api<ServiceMeshControlPlane> = Api::all(state.client.clone());

    match api.list(&Default::default()).await {
        Ok(list) => {
            let items: Vec<ControlPlaneReadiness> =
                list.items.iter().map(ControlPlaneReadiness::from).collect();
            let total = items.len();
            Ok(Json(ControlPlaneListResponse { items, total }))
        }
        Err(e) => {
            error!("Failed to list control planes: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("list_failed", &e.to_string())),
            ))
        }
    }
}

/// Get the readiness of one control plane
#[instrument(skip(state), fields(name = %name, namespace = %namespace))]
pub async fn get_control_plane(
    State(state): State<Arc<ControllerState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<ControlPlaneReadiness>, (StatusCode, Json<ErrorResponse>)> {
    let api: Api<ServiceMeshControlPlane> = Api::namespaced(state.client.clone(), &namespace);

    match api.get(&name).await {
        Ok(smcp) => Ok(Json(ControlPlaneReadiness::from(&smcp))),
        Err(kube::Error::Api(e)) if e.code == 404 => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "not_found",
                &format!("ServiceMeshControlPlane {}/{} not found", namespace, name),
            )),
        )),
        Err(e) => {
            error!(
                "Failed to get control plane {}/{}: {:?}",
                namespace, name, e
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("get_failed", &e.to_string())),
            ))
        }
    }
}
