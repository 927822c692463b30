/// Account manager implementation using runtime queries
///
/// Uses sqlx runtime query building instead of compile-time macros to avoid
/// needing DATABASE_URL during compilation.

use crate::{
    account::{AccessClaims, UpdateUserRequest, ValidatedSession},
    config::ServerConfig,
    db::models::{Account, InternshipStatus, Role, Session},
    error::{is_unique_violation, ApiError, ApiResult},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Create a new account.
    ///
    /// Self-registration passes `Role::Member`; admin creation may pass any
    /// role along with an internship window.
    pub async fn create_account(
        &self,
        name: String,
        email: String,
        password: String,
        role: Role,
        internship_start: Option<DateTime<Utc>>,
        internship_end: Option<DateTime<Utc>>,
    ) -> ApiResult<Account> {
        let email = email.trim().to_lowercase();

        if let (Some(start), Some(end)) = (internship_start, internship_end) {
            if end <= start {
                return Err(ApiError::Validation(
                    "Internship end date must be after start date".to_string(),
                ));
            }
        }

        let password_hash = hash_password(&password)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let internship_status = internship_start.map(|_| InternshipStatus::Pending);

        let result = sqlx::query(
            "INSERT INTO account (id, name, email, password_hash, role, internship_start, internship_end, internship_status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&id)
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(internship_start)
        .bind(internship_end)
        .bind(internship_status.map(|s| s.as_str()))
        .bind(now)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            if is_unique_violation(&e) {
                return Err(ApiError::Conflict("Email already registered".to_string()));
            }
            return Err(ApiError::Database(e));
        }

        Ok(Account {
            id,
            name,
            email,
            password_hash,
            role,
            internship_start,
            internship_end,
            internship_status,
            certificate_id: None,
            created_at: now,
            deactivated_at: None,
        })
    }

    /// Authenticate account and create a session
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<(Account, Session)> {
        let account = self
            .get_account_by_email(&email.trim().to_lowercase())
            .await
            .map_err(|e| match e {
                // Don't reveal whether the email exists
                ApiError::NotFound(_) => {
                    ApiError::Authentication("Invalid credentials".to_string())
                }
                other => other,
            })?;

        if account.deactivated_at.is_some() {
            return Err(ApiError::Authorization("Account is deactivated".to_string()));
        }

        if !verify_password(password, &account.password_hash)? {
            return Err(ApiError::Authentication("Invalid credentials".to_string()));
        }

        let session = self.create_session(&account).await?;

        Ok((account, session))
    }

    /// Create a session for an account
    pub async fn create_session(&self, account: &Account) -> ApiResult<Session> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.authentication.access_token_ttl);

        let claims = AccessClaims {
            sub: account.id.clone(),
            sid: session_id.clone(),
            role: account.role.as_str().to_string(),
            scope: "access".to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Token encoding failed: {}", e)))?;

        sqlx::query(
            "INSERT INTO session (id, account_id, access_token, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&session_id)
        .bind(&account.id)
        .bind(&access_token)
        .bind(now)
        .bind(expires_at)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(Session {
            id: session_id,
            account_id: account.id.clone(),
            access_token,
            created_at: now,
            expires_at,
        })
    }

    /// Validate access token and return session info
    pub async fn validate_access_token(&self, token: &str) -> ApiResult<ValidatedSession> {
        let row = sqlx::query(
            "SELECT s.id, s.account_id, s.expires_at, a.role, a.deactivated_at
             FROM session s JOIN account a ON a.id = s.account_id
             WHERE s.access_token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::Authentication("Invalid or expired session".to_string()))?;

        let session_id: String = row.get("id");
        let account_id: String = row.get("account_id");
        let expires_at: DateTime<Utc> = row.get("expires_at");
        let role = Role::from_str(row.get::<String, _>("role").as_str())?;
        let deactivated_at: Option<DateTime<Utc>> = row.get("deactivated_at");

        if Utc::now() > expires_at {
            return Err(ApiError::Authentication("Session expired".to_string()));
        }

        if deactivated_at.is_some() {
            return Err(ApiError::Authorization("Account is deactivated".to_string()));
        }

        Ok(ValidatedSession {
            account_id,
            session_id,
            role,
        })
    }

    /// Delete a session (logout)
    pub async fn delete_session(&self, session_id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM session WHERE id = ?1")
            .bind(session_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Delete sessions whose access tokens have expired
    pub async fn cleanup_expired_sessions(&self) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at < ?1")
            .bind(Utc::now())
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        Ok(result.rows_affected())
    }

    /// Get an account by id
    pub async fn get_account(&self, id: &str) -> ApiResult<Account> {
        let row = sqlx::query("SELECT * FROM account WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound(format!("Account {} not found", id)))?;

        account_from_row(&row)
    }

    /// Get an account by email
    pub async fn get_account_by_email(&self, email: &str) -> ApiResult<Account> {
        let row = sqlx::query("SELECT * FROM account WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound(format!("Account {} not found", email)))?;

        account_from_row(&row)
    }

    /// List all accounts (admin dashboard)
    pub async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        let rows = sqlx::query("SELECT * FROM account ORDER BY created_at DESC")
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::Database)?;

        rows.iter().map(account_from_row).collect()
    }

    /// Update account fields (role, internship window, soft deactivation).
    ///
    /// Accounts are never hard-deleted; deactivation sets a timestamp.
    pub async fn update_account(&self, id: &str, req: UpdateUserRequest) -> ApiResult<Account> {
        let mut account = self.get_account(id).await?;

        if let Some(name) = req.name {
            account.name = name;
        }
        if let Some(role) = req.role {
            account.role = role;
        }
        if let Some(start) = req.internship_start {
            account.internship_start = Some(start);
        }
        if let Some(end) = req.internship_end {
            account.internship_end = Some(end);
        }
        if let Some(deactivated) = req.deactivated {
            account.deactivated_at = if deactivated { Some(Utc::now()) } else { None };
        }

        sqlx::query(
            "UPDATE account SET name = ?1, role = ?2, internship_start = ?3, internship_end = ?4, deactivated_at = ?5
             WHERE id = ?6",
        )
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(account.internship_start)
        .bind(account.internship_end)
        .bind(account.deactivated_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(account)
    }

    /// Link an issued certificate onto the owning account and mark the
    /// internship window completed.
    pub async fn link_certificate(&self, account_id: &str, certificate_id: &str) -> ApiResult<()> {
        sqlx::query(
            "UPDATE account SET certificate_id = ?1, internship_status = ?2 WHERE id = ?3",
        )
        .bind(certificate_id)
        .bind(InternshipStatus::Completed.as_str())
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(())
    }
}

/// Map a database row to an Account
fn account_from_row(row: &SqliteRow) -> ApiResult<Account> {
    let role = Role::from_str(row.get::<String, _>("role").as_str())?;
    let internship_status = row
        .get::<Option<String>, _>("internship_status")
        .map(|s| InternshipStatus::from_str(&s))
        .transpose()?;

    Ok(Account {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        internship_start: row.get("internship_start"),
        internship_end: row.get("internship_end"),
        internship_status,
        certificate_id: row.get("certificate_id"),
        created_at: row.get("created_at"),
        deactivated_at: row.get("deactivated_at"),
    })
}

/// Hash a password with Argon2id
fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored Argon2id hash
fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }
}
