use async_trait::async_trait;

use crate::{
    application::repos::{CreateTodoParams, RepoError, TodosRepo, UpdateTodoParams},
    domain::{
        entities::TodoRecord,
        todos::{WORK_MAX_CHARS, work_fits},
    },
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    work: String,
    done: bool,
}

impl From<TodoRow> for TodoRecord {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            work: row.work,
            done: row.done,
        }
    }
}

fn ensure_work_fits(work: &str) -> Result<(), RepoError> {
    if work_fits(work) {
        Ok(())
    } else {
        Err(RepoError::invalid_input(format!(
            "work exceeds {WORK_MAX_CHARS} characters"
        )))
    }
}

#[async_trait]
impl TodosRepo for PostgresRepositories {
    async fn list_todos(&self) -> Result<Vec<TodoRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, work, done
            FROM todos
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TodoRecord::from).collect())
    }

    async fn create_todo(&self, params: CreateTodoParams) -> Result<TodoRecord, RepoError> {
        ensure_work_fits(&params.work)?;

        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            INSERT INTO todos (work, done)
            VALUES ($1, $2)
            RETURNING id, work, done
            "#,
        )
        .bind(params.work)
        .bind(params.done)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_todo(&self, params: UpdateTodoParams) -> Result<TodoRecord, RepoError> {
        if let Some(work) = params.work.as_deref() {
            ensure_work_fits(work)?;
        }

        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos
            SET work = COALESCE($2, work),
                done = COALESCE($3, done)
            WHERE id = $1
            RETURNING id, work, done
            "#,
        )
        .bind(params.id)
        .bind(params.work)
        .bind(params.done)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(TodoRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_todo(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
