//! seca-api — REST API for the SECA mock.
//!
//! Serves the workspace and storage providers over axum, backed by a shared
//! [`MockCloud`].
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/providers/seca.workspace/v1/tenants/{tenant}/workspaces` | List workspaces |
//! | GET/PUT/DELETE | `/providers/seca.workspace/v1/tenants/{tenant}/workspaces/{name}` | Get, create-or-update, delete a workspace |
//! | GET | `/providers/seca.storage/v1/tenants/{tenant}/skus` | List storage SKUs |
//! | GET | `/providers/seca.storage/v1/tenants/{tenant}/skus/{name}` | Get a storage SKU |
//! | GET | `/providers/seca.storage/v1/tenants/{tenant}/workspaces/{workspace}/block-storages` | List block storages |
//! | GET/PUT/DELETE | `/providers/seca.storage/v1/tenants/{tenant}/workspaces/{workspace}/block-storages/{name}` | Get, create-or-update, delete a block storage |
//! | any | `/providers/seca.storage/v1/tenants/{tenant}/images[/{name}]` | 501 |
//! | GET | `/healthz` | Liveness |
//!
//! List endpoints accept a `labels` query parameter holding a label selector.

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use seca_lifecycle::MockCloud;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub cloud: Arc<MockCloud>,
}

/// Build the complete API router.
pub fn build_router(cloud: Arc<MockCloud>) -> Router {
    let state = ApiState { cloud };

    let workspace_routes = Router::new()
        .route("/tenants/{tenant}/workspaces", get(handlers::list_workspaces))
        .route(
            "/tenants/{tenant}/workspaces/{name}",
            get(handlers::get_workspace)
                .put(handlers::put_workspace)
                .delete(handlers::delete_workspace),
        );

    let storage_routes = Router::new()
        .route("/tenants/{tenant}/skus", get(handlers::list_skus))
        .route("/tenants/{tenant}/skus/{name}", get(handlers::get_sku))
        .route(
            "/tenants/{tenant}/workspaces/{workspace}/block-storages",
            get(handlers::list_block_storages),
        )
        .route(
            "/tenants/{tenant}/workspaces/{workspace}/block-storages/{name}",
            get(handlers::get_block_storage)
                .put(handlers::put_block_storage)
                .delete(handlers::delete_block_storage),
        )
        .route("/tenants/{tenant}/images", any(handlers::not_implemented))
        .route("/tenants/{tenant}/images/{name}", any(handlers::not_implemented));

    Router::new()
        .nest("/providers/seca.workspace/v1", workspace_routes)
        .nest("/providers/seca.storage/v1", storage_routes)
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
