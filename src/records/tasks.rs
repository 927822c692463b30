/// Task record management
use crate::{
    db::models::{Task, TaskStatus},
    error::{ApiError, ApiResult},
    records::{CreateTaskRequest, UpdateTaskRequest},
};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Task manager
#[derive(Clone)]
pub struct TaskManager {
    db: SqlitePool,
}

impl TaskManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a task. The assignee, when given, must be an existing account.
    pub async fn create(&self, req: CreateTaskRequest) -> ApiResult<Task> {
        if let Some(ref assignee) = req.assigned_to {
            self.ensure_account_exists(assignee).await?;
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO task (id, title, description, assigned_to, status, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.assigned_to)
        .bind(TaskStatus::Todo.as_str())
        .bind(req.due_date)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        self.get(&id).await
    }

    /// Update a task and return the canonical row
    pub async fn update(&self, id: &str, req: UpdateTaskRequest) -> ApiResult<Task> {
        let mut task = self.get(id).await?;

        if let Some(title) = req.title {
            task.title = title;
        }
        if let Some(description) = req.description {
            task.description = Some(description);
        }
        if let Some(assignee) = req.assigned_to {
            self.ensure_account_exists(&assignee).await?;
            task.assigned_to = Some(assignee);
        }
        if let Some(status) = req.status {
            task.status = status;
        }
        if let Some(due) = req.due_date {
            task.due_date = Some(due);
        }
        task.updated_at = Utc::now();

        sqlx::query(
            "UPDATE task SET title = ?1, description = ?2, assigned_to = ?3, status = ?4, due_date = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.assigned_to)
        .bind(task.status.as_str())
        .bind(task.due_date)
        .bind(task.updated_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(task)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Task> {
        let row = sqlx::query("SELECT * FROM task WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound(format!("Task {} not found", id)))?;

        task_from_row(&row)
    }

    pub async fn list(&self) -> ApiResult<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM task ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(task_from_row).collect()
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM task WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Task {} not found", id)));
        }

        Ok(())
    }

    async fn ensure_account_exists(&self, account_id: &str) -> ApiResult<()> {
        let exists = sqlx::query("SELECT 1 FROM account WHERE id = ?1")
            .bind(account_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if exists.is_none() {
            return Err(ApiError::Validation(format!(
                "Assignee {} does not exist",
                account_id
            )));
        }

        Ok(())
    }
}

fn task_from_row(row: &SqliteRow) -> ApiResult<Task> {
    let status = TaskStatus::from_str(row.get::<String, _>("status").as_str())?;

    Ok(Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        assigned_to: row.get("assigned_to"),
        status,
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
