/// Bill record management
use crate::{
    db::models::{Bill, BillStatus},
    error::{ApiError, ApiResult},
    records::{CreateBillRequest, UpdateBillRequest},
};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Bill manager
#[derive(Clone)]
pub struct BillManager {
    db: SqlitePool,
}

impl BillManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a bill. The client must exist.
    pub async fn create(&self, req: CreateBillRequest) -> ApiResult<Bill> {
        self.ensure_client_exists(&req.client_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let currency = req.currency.unwrap_or_else(|| "USD".to_string());

        sqlx::query(
            "INSERT INTO bill (id, client_id, amount_cents, currency, description, status, issued_at, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&id)
        .bind(&req.client_id)
        .bind(req.amount_cents)
        .bind(&currency)
        .bind(&req.description)
        .bind(BillStatus::Draft.as_str())
        .bind(now)
        .bind(req.due_date)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(Bill {
            id,
            client_id: req.client_id,
            amount_cents: req.amount_cents,
            currency,
            description: req.description,
            status: BillStatus::Draft,
            issued_at: now,
            due_date: req.due_date,
            paid_at: None,
        })
    }

    /// Update a bill and return the canonical row. Marking a bill paid
    /// stamps `paid_at`.
    pub async fn update(&self, id: &str, req: UpdateBillRequest) -> ApiResult<Bill> {
        let mut bill = self.get(id).await?;

        if let Some(amount) = req.amount_cents {
            if amount < 1 {
                return Err(ApiError::Validation(
                    "Bill amount must be positive".to_string(),
                ));
            }
            bill.amount_cents = amount;
        }
        if let Some(description) = req.description {
            bill.description = Some(description);
        }
        if let Some(due) = req.due_date {
            bill.due_date = Some(due);
        }
        if let Some(status) = req.status {
            if status == BillStatus::Paid && bill.status != BillStatus::Paid {
                bill.paid_at = Some(Utc::now());
            }
            bill.status = status;
        }

        sqlx::query(
            "UPDATE bill SET amount_cents = ?1, description = ?2, status = ?3, due_date = ?4, paid_at = ?5
             WHERE id = ?6",
        )
        .bind(bill.amount_cents)
        .bind(&bill.description)
        .bind(bill.status.as_str())
        .bind(bill.due_date)
        .bind(bill.paid_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(bill)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Bill> {
        let row = sqlx::query("SELECT * FROM bill WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound(format!("Bill {} not found", id)))?;

        bill_from_row(&row)
    }

    pub async fn list(&self) -> ApiResult<Vec<Bill>> {
        let rows = sqlx::query("SELECT * FROM bill ORDER BY issued_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(bill_from_row).collect()
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM bill WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Bill {} not found", id)));
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

fn bill_from_row(row: &SqliteRow) -> ApiResult<Bill> {
    let status = BillStatus::from_str(row.get::<String, _>("status").as_str())?;

    Ok(Bill {
        id: row.get("id"),
        client_id: row.get("client_id"),
        amount_cents: row.get("amount_cents"),
        currency: row.get("currency"),
        description: row.get("description"),
        status,
        issued_at: row.get("issued_at"),
        due_date: row.get("due_date"),
        paid_at: row.get("paid_at"),
    })
}
