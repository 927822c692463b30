/// Domain record models and shared enumerations
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Intern,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Intern => "intern",
            Role::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> ApiResult<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "intern" => Ok(Role::Intern),
            "member" => Ok(Role::Member),
            _ => Err(ApiError::Validation(format!("Invalid role: {}", s))),
        }
    }
}

/// Internship status lifecycle.
///
/// A single closed enumeration shared across the backend; transitions only
/// move forward, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
    Pending,
    InProgress,
    Completed,
}

impl InternshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InternshipStatus::Pending => "pending",
            InternshipStatus::InProgress => "in_progress",
            InternshipStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "pending" => Ok(InternshipStatus::Pending),
            "in_progress" => Ok(InternshipStatus::InProgress),
            "completed" => Ok(InternshipStatus::Completed),
            _ => Err(ApiError::Validation(format!(
                "Invalid internship status: {}",
                s
            ))),
        }
    }

    /// Forward-only transition check (pending -> in_progress -> completed)
    pub fn can_transition_to(&self, next: InternshipStatus) -> bool {
        next > *self
    }
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(ApiError::Validation(format!("Invalid task status: {}", s))),
        }
    }
}

/// Bill status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Draft,
    Sent,
    Paid,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Draft => "draft",
            BillStatus::Sent => "sent",
            BillStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "draft" => Ok(BillStatus::Draft),
            "sent" => Ok(BillStatus::Sent),
            "paid" => Ok(BillStatus::Paid),
            _ => Err(ApiError::Validation(format!("Invalid bill status: {}", s))),
        }
    }
}

/// Account record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub internship_start: Option<DateTime<Utc>>,
    pub internship_end: Option<DateTime<Utc>>,
    pub internship_status: Option<InternshipStatus>,
    pub certificate_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

/// Session record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub account_id: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Internship record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Internship {
    pub id: String,
    pub intern_id: String,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: InternshipStatus,
    pub certificate_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Certificate record. Immutable once minted except the artifact fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    /// Public display identifier (`NEX-<random>-<checksum>`)
    pub certificate_id: String,
    pub internship_id: String,
    pub intern_id: String,
    pub intern_name: String,
    pub internship_title: String,
    pub issued_at: DateTime<Utc>,
    pub artifact_url: Option<String>,
    pub artifact_uploaded_at: Option<DateTime<Utc>>,
}

/// Task record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub client_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bill record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub client_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
    pub status: BillStatus,
    pub issued_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_only_move_forward() {
        use InternshipStatus::*;

        assert!(Pending.can_transition_to(InProgress));
        assert!(Pending.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));

        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            InternshipStatus::Pending,
            InternshipStatus::InProgress,
            InternshipStatus::Completed,
        ] {
            assert_eq!(
                InternshipStatus::from_str(status.as_str()).unwrap(),
                status
            );
        }

        assert!(InternshipStatus::from_str("Done").is_err());
        assert!(InternshipStatus::from_str("COMPLETED").is_err());
    }
}
