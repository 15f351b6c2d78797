//! HTTP routes of the data service.
//!
//! - `GET /` index page
//! - `GET /status` liveness
//! - `GET /list` cached database ids
//! - `GET /list/remote` databases visible to the token
//! - `GET /query?id=<id>[&nocache=1]` database records

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use ndata_core::{DataService, Record};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;

/// Shortest database id accepted by `/query`.
const MIN_ID_LEN: usize = 10;

const INDEX_HTML: &str = r#"<!doctype html>
<head>
<title>Notion Data Service</title>
</head>
<body>
<h1>Notion Data Service</h1>
<ul>
<li><a href="/status">Status</a></li>
<li><a href="/list">List data</a></li>
<li><a href="/query?id=">Query data</a></li>
</ul>
</body>
</html>"#;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub last_updated: i64,
    pub notion_databases: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoteListResponse {
    pub last_updated: i64,
    pub databases: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<'a> {
    pub last_updated: i64,
    pub notion_data: &'a [Record],
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nocache: String,
}

/// Build the application router.
pub fn router(service: Arc<DataService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/status", get(status))
        .route("/list", get(list))
        .route("/list/remote", get(list_remote))
        .route("/query", get(query))
        .fallback(not_found)
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn status() -> impl IntoResponse {
    Json(serde_json::json!({ "success": true }))
}

async fn list(State(service): State<Arc<DataService>>) -> Json<ListResponse> {
    let notion_databases = service.list_known_databases().await;
    Json(ListResponse { last_updated: now(), notion_databases })
}

async fn list_remote(State(service): State<Arc<DataService>>) -> Result<Json<RemoteListResponse>, ApiError> {
    let databases = service.list_accessible_databases().await?;
    Ok(Json(RemoteListResponse { last_updated: now(), databases }))
}

async fn query(State(service): State<Arc<DataService>>, Query(params): Query<QueryParams>) -> Result<Response, ApiError> {
    let id = params.id.trim();
    if id.len() < MIN_ID_LEN {
        return Err(ApiError::InvalidInput(format!("invalid database id {id:?}")));
    }

    let records = if params.nocache.is_empty() {
        service.query_cached(id).await?
    } else {
        service.query_database(id, true).await?
    };

    Ok(Json(DataResponse { last_updated: now(), notion_data: &records }).into_response())
}

async fn not_found(uri: Uri) -> StatusCode {
    tracing::info!(uri = %uri, "Route not found");
    StatusCode::NOT_FOUND
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
