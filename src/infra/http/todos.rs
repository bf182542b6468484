//! Todo CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::application::todos::{AddTodoRequest, RemovedTodo, UpdateTodoRequest};
use crate::domain::entities::TodoRecord;

use super::error::ApiError;
use super::state::HttpState;

pub async fn get(State(state): State<HttpState>) -> Result<Json<Vec<TodoRecord>>, ApiError> {
    let todos = state.todos.get().await?;
    Ok(Json(todos))
}

pub async fn add(
    State(state): State<HttpState>,
    Json(payload): Json<AddTodoRequest>,
) -> Result<(StatusCode, Json<TodoRecord>), ApiError> {
    let todo = state.todos.add(payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update(
    State(state): State<HttpState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<TodoRecord>, ApiError> {
    let todo = state.todos.update(payload, id).await?;
    Ok(Json(todo))
}

pub async fn remove(
    State(state): State<HttpState>,
    Path(id): Path<i64>,
) -> Result<Json<RemovedTodo>, ApiError> {
    let removed = state.todos.remove(id).await?;
    Ok(Json(removed))
}
