use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::TodoRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateTodoParams {
    pub work: String,
    pub done: bool,
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone)]
pub struct UpdateTodoParams {
    pub id: i64,
    pub work: Option<String>,
    pub done: Option<bool>,
}

#[async_trait]
pub trait TodosRepo: Send + Sync {
    async fn list_todos(&self) -> Result<Vec<TodoRecord>, RepoError>;

    async fn create_todo(&self, params: CreateTodoParams) -> Result<TodoRecord, RepoError>;

    async fn update_todo(&self, params: UpdateTodoParams) -> Result<TodoRecord, RepoError>;

    async fn delete_todo(&self, id: i64) -> Result<(), RepoError>;
}
