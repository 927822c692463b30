/// Tests for account/session management and the supporting dashboard
/// records (tasks, clients, bills).
use nexus_portal::{
    account::{AccountManager, UpdateUserRequest},
    config::{
        AuthConfig, LoggingConfig, RateLimitConfig, ServerConfig, ServiceConfig, StorageConfig,
    },
    db,
    db::models::{BillStatus, Role},
    error::ApiError,
    records::{
        BillManager, ClientManager, CreateBillRequest, CreateClientRequest, CreateTaskRequest,
        TaskManager, UpdateBillRequest,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

fn test_config(data_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 0,
            public_url: "http://localhost:4000".to_string(),
            version: "test".to_string(),
        },
        storage: StorageConfig {
            data_directory: data_dir.to_path_buf(),
            database_path: data_dir.join("test.sqlite"),
        },
        authentication: AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            cert_signing_secret: "test-cert-signing-secret".to_string(),
            access_token_ttl: 3600,
        },
        artifact: None,
        rate_limit: RateLimitConfig {
            enabled: false,
            authenticated_rps: 100,
            unauthenticated_rps: 10,
            burst_size: 50,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    }
}

async fn setup() -> (TempDir, SqlitePool, Arc<AccountManager>) {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(test_config(dir.path()));

    let pool = db::create_pool(&config.storage.database_path, db::DatabaseOptions::default())
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();

    let accounts = Arc::new(AccountManager::new(pool.clone(), config));
    (dir, pool, accounts)
}

#[tokio::test]
async fn login_creates_a_validatable_session() {
    let (_dir, _pool, accounts) = setup().await;

    let account = accounts
        .create_account(
            "Session User".to_string(),
            "session@example.com".to_string(),
            "hunter2hunter2".to_string(),
            Role::Member,
            None,
            None,
        )
        .await
        .unwrap();

    let (logged_in, session) = accounts
        .login("session@example.com", "hunter2hunter2")
        .await
        .unwrap();
    assert_eq!(logged_in.id, account.id);

    let validated = accounts
        .validate_access_token(&session.access_token)
        .await
        .unwrap();
    assert_eq!(validated.account_id, account.id);
    assert_eq!(validated.role, Role::Member);

    // Logout invalidates the token
    accounts.delete_session(&validated.session_id).await.unwrap();
    let err = accounts
        .validate_access_token(&session.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Authentication(_)));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_identical() {
    let (_dir, _pool, accounts) = setup().await;

    accounts
        .create_account(
            "User".to_string(),
            "known@example.com".to_string(),
            "hunter2hunter2".to_string(),
            Role::Member,
            None,
            None,
        )
        .await
        .unwrap();

    let wrong_password = accounts
        .login("known@example.com", "not-the-password")
        .await
        .unwrap_err();
    let unknown_email = accounts
        .login("unknown@example.com", "hunter2hunter2")
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, ApiError::Authentication(_)));
    assert!(matches!(unknown_email, ApiError::Authentication(_)));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (_dir, _pool, accounts) = setup().await;

    accounts
        .create_account(
            "First".to_string(),
            "dupe@example.com".to_string(),
            "hunter2hunter2".to_string(),
            Role::Member,
            None,
            None,
        )
        .await
        .unwrap();

    // Email comparison is case-insensitive
    let err = accounts
        .create_account(
            "Second".to_string(),
            "DUPE@example.com".to_string(),
            "hunter2hunter2".to_string(),
            Role::Member,
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn deactivated_account_cannot_log_in() {
    let (_dir, _pool, accounts) = setup().await;

    let account = accounts
        .create_account(
            "Gone".to_string(),
            "gone@example.com".to_string(),
            "hunter2hunter2".to_string(),
            Role::Member,
            None,
            None,
        )
        .await
        .unwrap();

    let (_, session) = accounts
        .login("gone@example.com", "hunter2hunter2")
        .await
        .unwrap();

    let updated = accounts
        .update_account(
            &account.id,
            UpdateUserRequest {
                name: None,
                role: None,
                internship_start: None,
                internship_end: None,
                deactivated: Some(true),
            },
        )
        .await
        .unwrap();
    assert!(updated.deactivated_at.is_some());

    let err = accounts
        .login("gone@example.com", "hunter2hunter2")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Authorization(_)));

    // Existing sessions stop working too
    let err = accounts
        .validate_access_token(&session.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Authorization(_)));
}

#[tokio::test]
async fn task_assignee_must_be_an_existing_account() {
    let (_dir, pool, accounts) = setup().await;
    let tasks = TaskManager::new(pool);

    let err = tasks
        .create(CreateTaskRequest {
            title: "Orphan task".to_string(),
            description: None,
            assigned_to: Some("no-such-account".to_string()),
            due_date: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let account = accounts
        .create_account(
            "Assignee".to_string(),
            "assignee@example.com".to_string(),
            "hunter2hunter2".to_string(),
            Role::Intern,
            None,
            None,
        )
        .await
        .unwrap();

    let task = tasks
        .create(CreateTaskRequest {
            title: "Real task".to_string(),
            description: Some("Write the report".to_string()),
            assigned_to: Some(account.id.clone()),
            due_date: None,
        })
        .await
        .unwrap();
    assert_eq!(task.assigned_to.as_deref(), Some(account.id.as_str()));
}

#[tokio::test]
async fn client_email_is_unique() {
    let (_dir, pool, _accounts) = setup().await;
    let clients = ClientManager::new(pool);

    clients
        .create(CreateClientRequest {
            name: "Acme".to_string(),
            email: "billing@acme.example".to_string(),
            company: Some("Acme Corp".to_string()),
            phone: None,
        })
        .await
        .unwrap();

    let err = clients
        .create(CreateClientRequest {
            name: "Acme Again".to_string(),
            email: "billing@acme.example".to_string(),
            company: None,
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn marking_a_bill_paid_stamps_paid_at() {
    let (_dir, pool, _accounts) = setup().await;
    let clients = ClientManager::new(pool.clone());
    let bills = BillManager::new(pool);

    let client = clients
        .create(CreateClientRequest {
            name: "Acme".to_string(),
            email: "pay@acme.example".to_string(),
            company: None,
            phone: None,
        })
        .await
        .unwrap();

    let bill = bills
        .create(CreateBillRequest {
            client_id: client.id.clone(),
            amount_cents: 150_00,
            currency: None,
            description: Some("Consulting".to_string()),
            due_date: None,
        })
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::Draft);
    assert_eq!(bill.currency, "USD");
    assert!(bill.paid_at.is_none());

    let paid = bills
        .update(
            &bill.id,
            UpdateBillRequest {
                amount_cents: None,
                description: None,
                status: Some(BillStatus::Paid),
                due_date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(paid.status, BillStatus::Paid);
    assert!(paid.paid_at.is_some());
}

#[tokio::test]
async fn client_with_bills_cannot_be_deleted() {
    let (_dir, pool, _accounts) = setup().await;
    let clients = ClientManager::new(pool.clone());
    let bills = BillManager::new(pool);

    let client = clients
        .create(CreateClientRequest {
            name: "Sticky".to_string(),
            email: "sticky@acme.example".to_string(),
            company: None,
            phone: None,
        })
        .await
        .unwrap();

    let bill = bills
        .create(CreateBillRequest {
            client_id: client.id.clone(),
            amount_cents: 500,
            currency: None,
            description: None,
            due_date: None,
        })
        .await
        .unwrap();

    let err = clients.delete(&client.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // After the bill is gone the client can be deleted
    bills.delete(&bill.id).await.unwrap();
    clients.delete(&client.id).await.unwrap();
    let err = clients.get(&client.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn billing_an_unknown_client_is_rejected() {
    let (_dir, pool, _accounts) = setup().await;
    let bills = BillManager::new(pool);

    let err = bills
        .create(CreateBillRequest {
            client_id: "no-such-client".to_string(),
            amount_cents: 100,
            currency: None,
            description: None,
            due_date: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
