//! REST API handlers for evpngwd
//!
//! Exposes the lifecycle operations over HTTP/JSON using axum. Resource
//! bodies are the JSON forms of [`Vrf`], [`LogicalBridge`] and
//! [`BridgePort`]; errors are returned as [`ApiErrorResponse`].

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use evpn_gw_common::{Code, GwError};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::resource_id::full_name;
use crate::server::Server;
use crate::types::{
    BridgePort, CreateBridgePortRequest, CreateLogicalBridgeRequest, CreateVrfRequest,
    DeleteRequest, GetRequest, ListRequest, ListResponse, LogicalBridge,
    UpdateLogicalBridgeRequest, UpdateVrfRequest, Vrf, BRIDGE_COLLECTION, PORT_COLLECTION,
    VRF_COLLECTION,
};

/// Error response body
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// Status code name, e.g. `NOT_FOUND`
    pub code: String,
    /// Error message
    pub message: String,
}

/// Handler error carrying its HTTP status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorResponse {
                code: Code::InvalidArgument.as_str().to_string(),
                message,
            },
        }
    }
}

impl From<GwError> for ApiError {
    fn from(err: GwError) -> Self {
        let code = err.code();
        let status = match code {
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if err.is_client_error() {
            warn!(error = %err, "Request rejected");
        } else {
            error!(error = %err, "Request failed");
        }
        Self {
            status,
            body: ApiErrorResponse {
                code: code.as_str().to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct CreateVrfQuery {
    #[serde(default)]
    pub vrf_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateLogicalBridgeQuery {
    #[serde(default)]
    pub logical_bridge_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateBridgePortQuery {
    #[serde(default)]
    pub bridge_port_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub allow_missing: bool,
}

/// Build the API router
pub fn router(server: Arc<Server>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/vrfs", get(list_vrfs).post(create_vrf))
        .route(
            "/v1/vrfs/{id}",
            get(get_vrf).patch(update_vrf).delete(delete_vrf),
        )
        .route(
            "/v1/bridges",
            get(list_logical_bridges).post(create_logical_bridge),
        )
        .route(
            "/v1/bridges/{id}",
            get(get_logical_bridge)
                .patch(update_logical_bridge)
                .delete(delete_logical_bridge),
        )
        .route("/v1/ports", get(list_bridge_ports).post(create_bridge_port))
        .route(
            "/v1/ports/{id}",
            get(get_bridge_port).delete(delete_bridge_port),
        )
        .with_state(server)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn delete_request(collection: &str, id: &str, query: DeleteQuery) -> DeleteRequest {
    DeleteRequest {
        name: full_name(collection, id),
        allow_missing: query.allow_missing,
    }
}

fn get_request(collection: &str, id: &str) -> GetRequest {
    GetRequest {
        name: full_name(collection, id),
    }
}

fn acknowledge() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

// --- VRF ---

async fn create_vrf(
    State(server): State<Arc<Server>>,
    query: Result<Query<CreateVrfQuery>, QueryRejection>,
    body: Result<Json<Vrf>, JsonRejection>,
) -> ApiResult<Vrf> {
    let Query(query) = query?;
    let Json(vrf) = body?;
    let vrf = server
        .create_vrf(CreateVrfRequest {
            vrf_id: query.vrf_id,
            vrf,
        })
        .await?;
    Ok(Json(vrf))
}

async fn list_vrfs(
    State(server): State<Arc<Server>>,
    query: Result<Query<ListRequest>, QueryRejection>,
) -> ApiResult<ListResponse<Vrf>> {
    let Query(req) = query?;
    Ok(Json(server.list_vrfs(req).await?))
}

async fn get_vrf(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<Vrf> {
    Ok(Json(server.get_vrf(get_request(VRF_COLLECTION, &id)).await?))
}

async fn update_vrf(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
    body: Result<Json<Vrf>, JsonRejection>,
) -> ApiResult<Vrf> {
    let Json(mut vrf) = body?;
    vrf.name = full_name(VRF_COLLECTION, &id);
    Ok(Json(server.update_vrf(UpdateVrfRequest { vrf }).await?))
}

async fn delete_vrf(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<serde_json::Value> {
    let Query(query) = query?;
    server
        .delete_vrf(delete_request(VRF_COLLECTION, &id, query))
        .await?;
    Ok(acknowledge())
}

// --- Logical bridge ---

async fn create_logical_bridge(
    State(server): State<Arc<Server>>,
    query: Result<Query<CreateLogicalBridgeQuery>, QueryRejection>,
    body: Result<Json<LogicalBridge>, JsonRejection>,
) -> ApiResult<LogicalBridge> {
    let Query(query) = query?;
    let Json(logical_bridge) = body?;
    let bridge = server
        .create_logical_bridge(CreateLogicalBridgeRequest {
            logical_bridge_id: query.logical_bridge_id,
            logical_bridge,
        })
        .await?;
    Ok(Json(bridge))
}

async fn list_logical_bridges(
    State(server): State<Arc<Server>>,
    query: Result<Query<ListRequest>, QueryRejection>,
) -> ApiResult<ListResponse<LogicalBridge>> {
    let Query(req) = query?;
    Ok(Json(server.list_logical_bridges(req).await?))
}

async fn get_logical_bridge(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<LogicalBridge> {
    Ok(Json(
        server
            .get_logical_bridge(get_request(BRIDGE_COLLECTION, &id))
            .await?,
    ))
}

async fn update_logical_bridge(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
    body: Result<Json<LogicalBridge>, JsonRejection>,
) -> ApiResult<LogicalBridge> {
    let Json(mut logical_bridge) = body?;
    logical_bridge.name = full_name(BRIDGE_COLLECTION, &id);
    Ok(Json(
        server
            .update_logical_bridge(UpdateLogicalBridgeRequest { logical_bridge })
            .await?,
    ))
}

async fn delete_logical_bridge(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<serde_json::Value> {
    let Query(query) = query?;
    server
        .delete_logical_bridge(delete_request(BRIDGE_COLLECTION, &id, query))
        .await?;
    Ok(acknowledge())
}

// --- Bridge port ---

async fn create_bridge_port(
    State(server): State<Arc<Server>>,
    query: Result<Query<CreateBridgePortQuery>, QueryRejection>,
    body: Result<Json<BridgePort>, JsonRejection>,
) -> ApiResult<BridgePort> {
    let Query(query) = query?;
    let Json(bridge_port) = body?;
    let port = server
        .create_bridge_port(CreateBridgePortRequest {
            bridge_port_id: query.bridge_port_id,
            bridge_port,
        })
        .await?;
    Ok(Json(port))
}

async fn list_bridge_ports(
    State(server): State<Arc<Server>>,
    query: Result<Query<ListRequest>, QueryRejection>,
) -> ApiResult<ListResponse<BridgePort>> {
    let Query(req) = query?;
    Ok(Json(server.list_bridge_ports(req).await?))
}

async fn get_bridge_port(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
) -> ApiResult<BridgePort> {
    Ok(Json(
        server
            .get_bridge_port(get_request(PORT_COLLECTION, &id))
            .await?,
    ))
}

async fn delete_bridge_port(
    State(server): State<Arc<Server>>,
    Path(id): Path<String>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<serde_json::Value> {
    let Query(query) = query?;
    server
        .delete_bridge_port(delete_request(PORT_COLLECTION, &id, query))
        .await?;
    Ok(acknowledge())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gw_error_status_mapping() {
        let cases = [
            (GwError::invalid_argument("bad"), StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            (GwError::not_found("vrfs/blue"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (GwError::frr("apply vrf", "down"), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        ];
        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.body.code, code);
        }
    }

    #[test]
    fn test_names_from_path() {
        assert_eq!(get_request(VRF_COLLECTION, "blue").name, "vrfs/blue");
        let req = delete_request(PORT_COLLECTION, "port1", DeleteQuery { allow_missing: true });
        assert_eq!(req.name, "ports/port1");
        assert!(req.allow_missing);
    }
}
