/// Client record management
///
/// Clients are persisted rows with a unique email, replacing what was once
/// ad hoc in-memory data.
use crate::{
    db::models::Client,
    error::{is_unique_violation, ApiError, ApiResult},
    records::{CreateClientRequest, UpdateClientRequest},
};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Client manager
#[derive(Clone)]
pub struct ClientManager {
    db: SqlitePool,
}

impl ClientManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: CreateClientRequest) -> ApiResult<Client> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let email = req.email.trim().to_lowercase();

        let result = sqlx::query(
            "INSERT INTO client (id, name, email, company, phone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&email)
        .bind(&req.company)
        .bind(&req.phone)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            if is_unique_violation(&e) {
                return Err(ApiError::Conflict("Client email already exists".to_string()));
            }
            return Err(ApiError::Database(e));
        }

        Ok(Client {
            id,
            name: req.name,
            email,
            company: req.company,
            phone: req.phone,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn update(&self, id: &str, req: UpdateClientRequest) -> ApiResult<Client> {
        let mut client = self.get(id).await?;

        if let Some(name) = req.name {
            client.name = name;
        }
        if let Some(company) = req.company {
            client.company = Some(company);
        }
        if let Some(phone) = req.phone {
            client.phone = Some(phone);
        }
        client.updated_at = Utc::now();

        sqlx::query(
            "UPDATE client SET name = ?1, company = ?2, phone = ?3, updated_at = ?4 WHERE id = ?5",
        )
        .bind(&client.name)
        .bind(&client.company)
        .bind(&client.phone)
        .bind(client.updated_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(client)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Client> {
        let row = sqlx::query("SELECT * FROM client WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", id)))?;

        client_from_row(&row)
    }

    pub async fn list(&self) -> ApiResult<Vec<Client>> {
        let rows = sqlx::query("SELECT * FROM client ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(client_from_row).collect()
    }

    /// Delete a client. Rejected while bills still reference it.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM client WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => {
                Err(ApiError::NotFound(format!("Client {} not found", id)))
            }
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(
                ApiError::Conflict("Client has bills and cannot be deleted".to_string()),
            ),
            Err(e) => Err(ApiError::Database(e)),
        }
    }
}

fn client_from_row(row: &SqliteRow) -> ApiResult<Client> {
    Ok(Client {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        company: row.get("company"),
        phone: row.get("phone"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
