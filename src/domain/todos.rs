//! Todo change notifications and field limits.

use serde::{Deserialize, Serialize};

use super::entities::TodoRecord;

/// Storage limit of the `work` column, in characters.
pub const WORK_MAX_CHARS: usize = 100;

/// Returns `true` when `work` fits the storage column.
pub fn work_fits(work: &str) -> bool {
    work.chars().count() <= WORK_MAX_CHARS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoAction {
    Created,
    Updated,
    Removed,
}

impl TodoAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TodoAction::Created => "created",
            TodoAction::Updated => "updated",
            TodoAction::Removed => "removed",
        }
    }
}

/// Payload published on the change channel after every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEvent {
    pub action: TodoAction,
    pub todo: TodoEventBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoEventBody {
    Record(TodoRecord),
    Removed { id: i64 },
}

impl TodoEvent {
    pub fn created(todo: &TodoRecord) -> Self {
        Self {
            action: TodoAction::Created,
            todo: TodoEventBody::Record(todo.clone()),
        }
    }

    pub fn updated(todo: &TodoRecord) -> Self {
        Self {
            action: TodoAction::Updated,
            todo: TodoEventBody::Record(todo.clone()),
        }
    }

    pub fn removed(id: i64) -> Self {
        Self {
            action: TodoAction::Removed,
            todo: TodoEventBody::Removed { id },
        }
    }
}
