/// Supporting dashboard records: tasks, projects, clients, bills
///
/// Simple CRUD with referential checks. Every mutating operation returns
/// the canonical updated row so callers never need a follow-up fetch.

mod bills;
mod clients;
mod projects;
mod tasks;

pub use bills::BillManager;
pub use clients::ClientManager;
pub use projects::ProjectManager;
pub use tasks::TaskManager;

use crate::db::models::{BillStatus, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Task creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Project creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub client_id: Option<String>,
}

/// Project update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_id: Option<String>,
    pub status: Option<String>,
}

/// Client creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
}

/// Client update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

/// Bill creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub client_id: String,
    #[validate(range(min = 1))]
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Bill update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBillRequest {
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub status: Option<BillStatus>,
    pub due_date: Option<DateTime<Utc>>,
}
