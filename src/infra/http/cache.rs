//! Cache key lookup handlers.
//!
//! The glob arrives as `?pattern=`; without it (or when empty) every key is
//! listed. Reserved characters follow query-string encoding, so `+` must be
//! sent as `%2B` and `&` as `%26`.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use super::error::ApiError;
use super::state::HttpState;

#[derive(Debug, Default, Deserialize)]
pub struct KeyPatternQuery {
    #[serde(default)]
    pub pattern: Option<String>,
}

pub async fn get_cache(
    State(state): State<HttpState>,
    Query(query): Query<KeyPatternQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.cache.get_all_keys(query.pattern.as_deref()).await?))
}

pub async fn get_key(
    State(state): State<HttpState>,
    Query(query): Query<KeyPatternQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.cache.get_key(query.pattern.as_deref()).await?))
}
