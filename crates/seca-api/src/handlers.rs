//! REST API handlers.
//!
//! Each handler maps path and query parameters onto a [`MockCloud`] provider
//! and returns the record (or an iterator of records) as JSON. Errors are
//! `{"error": "..."}` bodies.
//!
//! [`MockCloud`]: seca_lifecycle::MockCloud

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use seca_lifecycle::{
    BlockStorageSpec, Lifecycle, LifecycleError, ResourceRequest, WorkspaceSpec,
};
use seca_selector::Selector;
use seca_state::{ResourceKey, ResourceSpec};

use crate::ApiState;

/// Query parameters accepted by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Label selector, e.g. `tier=RD*,iops>=5000`.
    pub labels: Option<String>,
}

impl ListParams {
    /// The parsed selector, or `None` when absent or blank.
    fn selector(&self) -> Option<Selector> {
        self.labels
            .as_deref()
            .map(Selector::parse)
            .filter(|s| !s.is_empty())
    }

    fn from_query(query: Result<Query<ListParams>, QueryRejection>) -> Result<Self, Response> {
        query
            .map(|Query(params)| params)
            .map_err(|rejection| error_response(&rejection.body_text(), StatusCode::BAD_REQUEST))
    }
}

/// Envelope for list responses.
#[derive(Debug, Serialize)]
pub struct ResourceIterator<T> {
    pub items: Vec<T>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
pub struct ResponseMetadata {
    pub provider: String,
    pub resource: String,
    pub verb: &'static str,
}

fn iterator<T: Serialize>(items: Vec<T>, provider: &str, resource: String) -> Response {
    Json(ResourceIterator {
        items,
        metadata: ResponseMetadata {
            provider: format!("{provider}/v1"),
            resource,
            verb: "list",
        },
    })
    .into_response()
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (status, Json(json!({ "error": msg }))).into_response()
}

fn lifecycle_error(err: LifecycleError) -> Response {
    let status = match &err {
        LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
        LifecycleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LifecycleError::UpdateSkipped(_) | LifecycleError::Scheduler(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        warn!(error = %err, "request failed");
    }
    error_response(&err.to_string(), status)
}

// ── Generic resource operations ────────────────────────────────

fn get_resource<S: ResourceSpec + Serialize>(lifecycle: &Lifecycle<S>, key: &ResourceKey) -> Response {
    match lifecycle.get(key) {
        Ok(record) => Json(record).into_response(),
        Err(e) => lifecycle_error(e),
    }
}

fn put_resource<S: ResourceSpec + Serialize + DeserializeOwned>(
    lifecycle: &Lifecycle<S>,
    key: &ResourceKey,
    payload: Result<Json<ResourceRequest<S>>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(&rejection.body_text(), StatusCode::BAD_REQUEST),
    };
    match lifecycle.create_or_update(key, request) {
        Ok(applied) => {
            let status = if applied.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(applied.record)).into_response()
        }
        Err(e) => lifecycle_error(e),
    }
}

fn delete_resource<S: ResourceSpec>(lifecycle: &Lifecycle<S>, key: &ResourceKey) -> Response {
    match lifecycle.delete(key) {
        Ok(_) => {
            let mut body = json!({
                "deleted": true,
                "tenant": key.tenant(),
                "name": key.name(),
            });
            if let Some(ws) = key.workspace() {
                body["workspace"] = json!(ws);
            }
            (StatusCode::ACCEPTED, Json(body)).into_response()
        }
        Err(e) => lifecycle_error(e),
    }
}

fn list_resources<S: ResourceSpec + Serialize>(
    lifecycle: &Lifecycle<S>,
    tenant: &str,
    workspace: Option<&str>,
    params: &ListParams,
) -> Response {
    let selector = params.selector();
    let resource = match workspace {
        Some(ws) => format!("tenants/{tenant}/workspaces/{ws}/{}", S::PLURAL),
        None => format!("tenants/{tenant}/{}", S::PLURAL),
    };
    match lifecycle.list(tenant, workspace, selector.as_ref()) {
        Ok(records) => iterator(records, S::PROVIDER, resource),
        Err(e) => lifecycle_error(e),
    }
}

// ── Workspaces ─────────────────────────────────────────────────

/// GET /providers/seca.workspace/v1/tenants/{tenant}/workspaces
pub async fn list_workspaces(
    State(state): State<ApiState>,
    Path(tenant): Path<String>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Response {
    match ListParams::from_query(query) {
        Ok(params) => list_resources(&state.cloud.workspaces, &tenant, None, &params),
        Err(resp) => resp,
    }
}

/// GET /providers/seca.workspace/v1/tenants/{tenant}/workspaces/{name}
pub async fn get_workspace(
    State(state): State<ApiState>,
    Path((tenant, name)): Path<(String, String)>,
) -> Response {
    get_resource(&state.cloud.workspaces, &ResourceKey::tenant_scoped(tenant, name))
}

/// PUT /providers/seca.workspace/v1/tenants/{tenant}/workspaces/{name}
pub async fn put_workspace(
    State(state): State<ApiState>,
    Path((tenant, name)): Path<(String, String)>,
    payload: Result<Json<ResourceRequest<WorkspaceSpec>>, JsonRejection>,
) -> Response {
    let key = ResourceKey::tenant_scoped(tenant, name);
    put_resource(&state.cloud.workspaces, &key, payload)
}

/// DELETE /providers/seca.workspace/v1/tenants/{tenant}/workspaces/{name}
pub async fn delete_workspace(
    State(state): State<ApiState>,
    Path((tenant, name)): Path<(String, String)>,
) -> Response {
    delete_resource(&state.cloud.workspaces, &ResourceKey::tenant_scoped(tenant, name))
}

// ── Block storages ─────────────────────────────────────────────

/// GET /providers/seca.storage/v1/tenants/{tenant}/workspaces/{workspace}/block-storages
pub async fn list_block_storages(
    State(state): State<ApiState>,
    Path((tenant, workspace)): Path<(String, String)>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Response {
    match ListParams::from_query(query) {
        Ok(params) => {
            list_resources(&state.cloud.block_storages, &tenant, Some(&workspace), &params)
        }
        Err(resp) => resp,
    }
}

/// GET /providers/seca.storage/v1/tenants/{tenant}/workspaces/{workspace}/block-storages/{name}
pub async fn get_block_storage(
    State(state): State<ApiState>,
    Path((tenant, workspace, name)): Path<(String, String, String)>,
) -> Response {
    let key = ResourceKey::workspace_scoped(tenant, workspace, name);
    get_resource(&state.cloud.block_storages, &key)
}

/// PUT /providers/seca.storage/v1/tenants/{tenant}/workspaces/{workspace}/block-storages/{name}
pub async fn put_block_storage(
    State(state): State<ApiState>,
    Path((tenant, workspace, name)): Path<(String, String, String)>,
    payload: Result<Json<ResourceRequest<BlockStorageSpec>>, JsonRejection>,
) -> Response {
    let key = ResourceKey::workspace_scoped(tenant, workspace, name);
    put_resource(&state.cloud.block_storages, &key, payload)
}

/// DELETE /providers/seca.storage/v1/tenants/{tenant}/workspaces/{workspace}/block-storages/{name}
pub async fn delete_block_storage(
    State(state): State<ApiState>,
    Path((tenant, workspace, name)): Path<(String, String, String)>,
) -> Response {
    let key = ResourceKey::workspace_scoped(tenant, workspace, name);
    delete_resource(&state.cloud.block_storages, &key)
}

// ── SKUs ───────────────────────────────────────────────────────

/// GET /providers/seca.storage/v1/tenants/{tenant}/skus
pub async fn list_skus(
    State(state): State<ApiState>,
    Path(tenant): Path<String>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Response {
    let params = match ListParams::from_query(query) {
        Ok(params) => params,
        Err(resp) => return resp,
    };
    let selector = params.selector();
    let skus = state.cloud.skus.list(&tenant, selector.as_ref());
    iterator(skus, "seca.storage", format!("tenants/{tenant}/skus"))
}

/// GET /providers/seca.storage/v1/tenants/{tenant}/skus/{name}
pub async fn get_sku(
    State(state): State<ApiState>,
    Path((tenant, name)): Path<(String, String)>,
) -> Response {
    match state.cloud.skus.get(&tenant, &name) {
        Ok(sku) => Json(sku).into_response(),
        Err(e) => lifecycle_error(e),
    }
}

// ── Misc ───────────────────────────────────────────────────────

/// Images are not served by the mock.
pub async fn not_implemented() -> Response {
    error_response("not implemented", StatusCode::NOT_IMPLEMENTED)
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::to_bytes;
    use seca_core::SecadConfig;
    use seca_lifecycle::MockCloud;
    use serde_json::Value;

    fn test_state() -> ApiState {
        let cloud = MockCloud::new(&SecadConfig::default()).unwrap();
        ApiState {
            cloud: Arc::new(cloud),
        }
    }

    fn volume_path(name: &str) -> Path<(String, String, String)> {
        Path(("t1".to_string(), "ws1".to_string(), name.to_string()))
    }

    fn volume_request(size_gb: u64) -> Result<Json<ResourceRequest<BlockStorageSpec>>, JsonRejection> {
        Ok(Json(
            ResourceRequest::new(BlockStorageSpec::with_size(size_gb)).with_label("env", "test"),
        ))
    }

    fn labels(selector: &str) -> Result<Query<ListParams>, QueryRejection> {
        Ok(Query(ListParams {
            labels: Some(selector.to_string()),
        }))
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn put_creates_then_updates() {
        let state = test_state();

        let resp = put_block_storage(State(state.clone()), volume_path("vol"), volume_request(50)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["metadata"]["resourceVersion"], 1);
        assert_eq!(body["status"]["state"], "pending");
        assert_eq!(body["labels"]["env"], "test");

        let resp = put_block_storage(State(state), volume_path("vol"), volume_request(60)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["metadata"]["resourceVersion"], 2);
        assert_eq!(body["status"]["state"], "updating");
        assert_eq!(body["status"]["sizeGB"], 60);
    }

    #[tokio::test(start_paused = true)]
    async fn get_reflects_progression() {
        let state = test_state();
        put_block_storage(State(state.clone()), volume_path("vol"), volume_request(50)).await;

        tokio::time::sleep(Duration::from_millis(700)).await;
        let resp = get_block_storage(State(state), volume_path("vol")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"]["state"], "active");
        assert_eq!(body["status"]["conditions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn get_nonexistent_is_404() {
        let state = test_state();
        let resp = get_block_storage(State(state), volume_path("nope")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_spec_is_400() {
        let state = test_state();
        let resp = put_block_storage(State(state), volume_path("vol"), volume_request(0)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_returns_accepted_then_404() {
        let state = test_state();
        put_block_storage(State(state.clone()), volume_path("vol"), volume_request(50)).await;

        let resp = delete_block_storage(State(state.clone()), volume_path("vol")).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body = body_json(resp).await;
        assert_eq!(body["deleted"], true);
        assert_eq!(body["workspace"], "ws1");
        assert_eq!(body["name"], "vol");

        let resp = delete_block_storage(State(state), volume_path("vol")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn list_block_storages_with_selector() {
        let state = test_state();
        put_block_storage(State(state.clone()), volume_path("a"), volume_request(10)).await;
        let other = Ok(Json(
            ResourceRequest::new(BlockStorageSpec::with_size(10)).with_label("env", "prod"),
        ));
        put_block_storage(State(state.clone()), volume_path("b"), other).await;

        let path = Path(("t1".to_string(), "ws1".to_string()));
        let resp = list_block_storages(State(state), path, labels("env=prod")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["metadata"]["name"], "b");
        assert_eq!(body["metadata"]["verb"], "list");
        assert_eq!(body["metadata"]["provider"], "seca.storage/v1");
        assert_eq!(
            body["metadata"]["resource"],
            "tenants/t1/workspaces/ws1/block-storages"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn workspace_crud() {
        let state = test_state();
        let path = || Path(("t1".to_string(), "ws1".to_string()));

        let request = Ok(Json(ResourceRequest::new(WorkspaceSpec::default())));
        let resp = put_workspace(State(state.clone()), path(), request).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await["metadata"]["kind"], "workspace");

        let resp = list_workspaces(
            State(state.clone()),
            Path("t1".to_string()),
            Ok(Query(ListParams::default())),
        )
        .await;
        let body = body_json(resp).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["metadata"]["resource"], "tenants/t1/workspaces");

        let resp = delete_workspace(State(state.clone()), path()).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert!(body_json(resp).await.get("workspace").is_none());

        let resp = get_workspace(State(state), path()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn skus_filter_by_labels() {
        let state = test_state();
        let resp = list_skus(State(state.clone()), Path("t1".to_string()), labels("tier=RD100")).await;
        let body = body_json(resp).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["metadata"]["name"], "seca.rd100");

        let resp = list_skus(State(state), Path("t1".to_string()), labels("foo")).await;
        let body = body_json(resp).await;
        assert!(body["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn get_sku_found_and_missing() {
        let state = test_state();
        let found = get_sku(
            State(state.clone()),
            Path(("t1".to_string(), "seca.le5k".to_string())),
        )
        .await;
        assert_eq!(found.status(), StatusCode::OK);

        let missing = get_sku(State(state), Path(("t1".to_string(), "nope".to_string()))).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn images_are_not_implemented() {
        assert_eq!(not_implemented().await.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
