/// Project record management
use crate::{
    db::models::Project,
    error::{ApiError, ApiResult},
    records::{CreateProjectRequest, UpdateProjectRequest},
};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Project manager
#[derive(Clone)]
pub struct ProjectManager {
    db: SqlitePool,
}

impl ProjectManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: CreateProjectRequest) -> ApiResult<Project> {
        if let Some(ref client_id) = req.client_id {
            self.ensure_client_exists(client_id).await?;
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO project (id, name, description, client_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.client_id)
        .bind("active")
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(Project {
            id,
            name: req.name,
            description: req.description,
            client_id: req.client_id,
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn update(&self, id: &str, req: UpdateProjectRequest) -> ApiResult<Project> {
        let mut project = self.get(id).await?;

        if let Some(name) = req.name {
            project.name = name;
        }
        if let Some(description) = req.description {
            project.description = Some(description);
        }
        if let Some(client_id) = req.client_id {
            self.ensure_client_exists(&client_id).await?;
            project.client_id = Some(client_id);
        }
        if let Some(status) = req.status {
            project.status = status;
        }
        project.updated_at = Utc::now();

        sqlx::query(
            "UPDATE project SET name = ?1, description = ?2, client_id = ?3, status = ?4, updated_at = ?5
             WHERE id = ?6",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.client_id)
        .bind(&project.status)
        .bind(project.updated_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(project)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Project> {
        let row = sqlx::query("SELECT * FROM project WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound(format!("Project {} not found", id)))?;

        project_from_row(&row)
    }

    pub async fn list(&self) -> ApiResult<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM project ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(project_from_row).collect()
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM project WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Project {} not found", id)));
        }

        Ok(())
    }

    async fn ensure_client_exists(&self, client_id: &str) -> ApiResult<()> {
        let exists = sqlx::query("SELECT 1 FROM client WHERE id = ?1")
            .bind(client_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if exists.is_none() {
            return Err(ApiError::Validation(format!(
                "Client {} does not exist",
                client_id
            )));
        }

        Ok(())
    }
}

fn project_from_row(row: &SqliteRow) -> ApiResult<Project> {
    Ok(Project {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        client_id: row.get("client_id"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
