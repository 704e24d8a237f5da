//! Raw upstream passthrough.
//!
//! Serves the upstream documents unmodified, through the raw cache. Kept for
//! older clients that parse the upstream format themselves.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;
use std::sync::Arc;
use votewatch_core::Electorate;

use crate::error::ApiResult;
use crate::service::VotesService;
use crate::state::AppState;

async fn raw_document(service: &VotesService, electorate: Electorate) -> ApiResult<Json<Arc<Value>>> {
    let doc = service.raw(electorate).await?;
    Ok(Json(doc))
}

/// GET /raw/romania
pub async fn raw_romania(State(service): State<Arc<VotesService>>) -> ApiResult<Json<Arc<Value>>> {
    raw_document(&service, Electorate::Romania).await
}

/// GET /raw/diaspora
pub async fn raw_diaspora(State(service): State<Arc<VotesService>>) -> ApiResult<Json<Arc<Value>>> {
    raw_document(&service, Electorate::Diaspora).await
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/romania", get(raw_romania))
        .route("/diaspora", get(raw_diaspora))
}
