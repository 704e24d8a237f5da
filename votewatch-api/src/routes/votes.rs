//! `GET /votes`

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::service::VotesService;
use crate::types::VotesResponse;

/// Romania, diaspora and combined candidate lists, or `502 { error }`.
pub async fn get_votes(State(service): State<Arc<VotesService>>) -> ApiResult<Json<VotesResponse>> {
    let votes = service.get_votes().await?;
    Ok(Json(votes))
}
