use std::sync::Arc;

use crate::application::cache::CacheLookupService;
use crate::application::todos::TodoService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct HttpState {
    pub todos: Arc<TodoService>,
    pub cache: Arc<CacheLookupService>,
    pub db: Arc<PostgresRepositories>,
}
