use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::application::broker::{ChannelPublisher, publish_json};
use crate::application::repos::{CreateTodoParams, RepoError, TodosRepo, UpdateTodoParams};
use crate::domain::entities::TodoRecord;
use crate::domain::error::DomainError;
use crate::domain::todos::TodoEvent;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTodoRequest {
    pub work: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub work: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedTodo {
    pub id: i64,
    pub deleted: bool,
}

/// Where change notifications go.
#[derive(Clone)]
pub struct ChangeFeed {
    pub publisher: Arc<dyn ChannelPublisher>,
    pub channel: String,
}

/// Todo CRUD over the record store. Every read goes to the store.
#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodosRepo>,
    feed: Option<ChangeFeed>,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodosRepo>) -> Self {
        Self { repo, feed: None }
    }

    pub fn with_change_feed_opt(mut self, feed: Option<ChangeFeed>) -> Self {
        self.feed = feed;
        self
    }

    pub async fn get(&self) -> Result<Vec<TodoRecord>, TodoError> {
        Ok(self.repo.list_todos().await?)
    }

    pub async fn add(&self, request: AddTodoRequest) -> Result<TodoRecord, TodoError> {
        let AddTodoRequest { work, done } = request;
        let todo = self
            .repo
            .create_todo(CreateTodoParams { work, done })
            .await?;

        self.notify(&TodoEvent::created(&todo)).await;
        Ok(todo)
    }

    pub async fn update(
        &self,
        request: UpdateTodoRequest,
        id: i64,
    ) -> Result<TodoRecord, TodoError> {
        let todo = self
            .repo
            .update_todo(UpdateTodoParams {
                id,
                work: request.work,
                done: request.done,
            })
            .await
            .map_err(not_found_as_domain)?;

        self.notify(&TodoEvent::updated(&todo)).await;
        Ok(todo)
    }

    pub async fn remove(&self, id: i64) -> Result<RemovedTodo, TodoError> {
        self.repo
            .delete_todo(id)
            .await
            .map_err(not_found_as_domain)?;

        self.notify(&TodoEvent::removed(id)).await;
        Ok(RemovedTodo { id, deleted: true })
    }

    async fn notify(&self, event: &TodoEvent) {
        let Some(feed) = self.feed.as_ref() else {
            return;
        };

        match publish_json(feed.publisher.as_ref(), &feed.channel, event).await {
            Ok(receivers) => {
                counter!("todo_events_published_total").increment(1);
                info!(
                    target = "application::todos",
                    channel = %feed.channel,
                    action = event.action.as_str(),
                    receivers,
                    "published todo change"
                );
            }
            Err(err) => {
                counter!("todo_events_publish_failed_total").increment(1);
                warn!(
                    target = "application::todos",
                    channel = %feed.channel,
                    action = event.action.as_str(),
                    error = %err,
                    "failed to publish todo change"
                );
            }
        }
    }
}

fn not_found_as_domain(err: RepoError) -> TodoError {
    match err {
        RepoError::NotFound => TodoError::Domain(DomainError::not_found("todo")),
        other => TodoError::Repo(other),
    }
}
