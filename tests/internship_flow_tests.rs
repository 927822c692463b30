/// End-to-end tests for the internship completion and certificate issuance
/// workflow, run against a real on-disk SQLite database.
use nexus_portal::{
    account::AccountManager,
    artifact::{ArtifactBackend, ArtifactStore},
    certificate::CertificateRegistry,
    config::{
        AuthConfig, LoggingConfig, RateLimitConfig, ServerConfig, ServiceConfig, StorageConfig,
    },
    db,
    db::models::{InternshipStatus, Role},
    error::{ApiError, ApiResult},
    internship::{CreateInternshipRequest, InternshipManager},
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

struct TestEnv {
    _dir: TempDir,
    pool: SqlitePool,
    accounts: Arc<AccountManager>,
    registry: Arc<CertificateRegistry>,
    internships: Arc<InternshipManager>,
}

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

async fn setup() -> TestEnv {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(test_config(dir.path()));

    let pool = db::create_pool(&config.storage.database_path, db::DatabaseOptions::default())
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();

    let accounts = Arc::new(AccountManager::new(pool.clone(), Arc::clone(&config)));
    let registry = Arc::new(CertificateRegistry::new(
        pool.clone(),
        config.authentication.cert_signing_secret.clone(),
        config.service.public_url.clone(),
    ));
    let internships = Arc::new(InternshipManager::new(
        pool.clone(),
        Arc::clone(&accounts),
        Arc::clone(&registry),
        None,
    ));

    TestEnv {
        _dir: dir,
        pool,
        accounts,
        registry,
        internships,
    }
}

/// Backend whose host is always down
struct FailingBackend;

#[async_trait::async_trait]
impl ArtifactBackend for FailingBackend {
    async fn upload(
        &self,
        _public_id: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> ApiResult<String> {
        Err(ApiError::ArtifactStorage("host unavailable".to_string()))
    }
}

async fn create_intern(env: &TestEnv, email: &str) -> String {
    let account = env
        .accounts
        .create_account(
            "Test Intern".to_string(),
            email.to_string(),
            "hunter2hunter2".to_string(),
            Role::Intern,
            None,
            None,
        )
        .await
        .unwrap();
    account.id
}

async fn create_internship(env: &TestEnv, intern_id: &str) -> String {
    let internship = env
        .internships
        .create(CreateInternshipRequest {
            intern_id: intern_id.to_string(),
            title: "Backend Engineering".to_string(),
            start_date: Utc::now() - Duration::days(90),
            end_date: Utc::now(),
        })
        .await
        .unwrap();
    internship.id
}

#[tokio::test]
async fn completing_once_yields_completed_status_and_one_certificate() {
    let env = setup().await;
    let intern_id = create_intern(&env, "intern1@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let (internship, certificate) = env.internships.complete(&internship_id).await.unwrap();

    assert_eq!(internship.status, InternshipStatus::Completed);
    assert!(internship.completed_at.is_some());
    assert_eq!(
        internship.certificate_id.as_deref(),
        Some(certificate.certificate_id.as_str())
    );
    assert!(certificate.certificate_id.starts_with("NEX-"));
    assert!(certificate.artifact_url.is_none());

    // The certificate is linked onto the owning account as well
    let account = env.accounts.get_account(&intern_id).await.unwrap();
    assert_eq!(
        account.certificate_id.as_deref(),
        Some(certificate.certificate_id.as_str())
    );
    assert_eq!(account.internship_status, Some(InternshipStatus::Completed));
}

#[tokio::test]
async fn completing_twice_returns_the_same_certificate() {
    let env = setup().await;
    let intern_id = create_intern(&env, "intern2@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let (_, first) = env.internships.complete(&internship_id).await.unwrap();
    let (internship, second) = env.internships.complete(&internship_id).await.unwrap();

    assert_eq!(first.certificate_id, second.certificate_id);
    assert_eq!(internship.status, InternshipStatus::Completed);

    // Still exactly one certificate for the internship
    let found = env
        .registry
        .find_for_internship(&internship_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.certificate_id, first.certificate_id);
}

#[tokio::test]
async fn concurrent_completions_converge_on_one_certificate() {
    let env = setup().await;
    let intern_id = create_intern(&env, "intern3@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let internships = Arc::clone(&env.internships);
        let id = internship_id.clone();
        handles.push(tokio::spawn(async move { internships.complete(&id).await }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let (_, certificate) = handle.await.unwrap().unwrap();
        ids.insert(certificate.certificate_id);
    }

    assert_eq!(ids.len(), 1, "all completions must see the same certificate");
}

#[tokio::test]
async fn certificate_ids_are_unique_across_the_registry() {
    let env = setup().await;

    let mut ids = HashSet::new();
    for i in 0..20 {
        let intern_id = create_intern(&env, &format!("unique{}@example.com", i)).await;
        let internship_id = create_internship(&env, &intern_id).await;
        let (_, certificate) = env.internships.complete(&internship_id).await.unwrap();
        assert!(
            ids.insert(certificate.certificate_id.clone()),
            "duplicate certificate id minted"
        );
    }

    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn completing_a_missing_internship_is_not_found() {
    let env = setup().await;

    let err = env.internships.complete("no-such-id").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn manual_completion_resolves_the_active_internship() {
    let env = setup().await;
    let intern_id = create_intern(&env, "manual@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let (internship, certificate) = env
        .internships
        .complete_for_intern(&intern_id)
        .await
        .unwrap();

    assert_eq!(internship.id, internship_id);
    assert_eq!(internship.status, InternshipStatus::Completed);
    assert!(certificate.certificate_id.starts_with("NEX-"));

    // With the internship completed there is no active one left
    let err = env
        .internships
        .complete_for_intern(&intern_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn a_second_active_internship_is_rejected() {
    let env = setup().await;
    let intern_id = create_intern(&env, "busy@example.com").await;
    create_internship(&env, &intern_id).await;

    let err = env
        .internships
        .create(CreateInternshipRequest {
            intern_id: intern_id.clone(),
            title: "Second Internship".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Conflict(_)));

    // Completing the first frees the intern for a new internship
    env.internships
        .complete_for_intern(&intern_id)
        .await
        .unwrap();
    env.internships
        .create(CreateInternshipRequest {
            intern_id,
            title: "Second Internship".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(30),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn status_transitions_are_forward_only() {
    let env = setup().await;
    let intern_id = create_intern(&env, "forward@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let internship = env
        .internships
        .update_status(&internship_id, InternshipStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(internship.status, InternshipStatus::InProgress);

    // Backward transition rejected
    let err = env
        .internships
        .update_status(&internship_id, InternshipStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // Completion does not go through the plain status update
    let err = env
        .internships
        .update_status(&internship_id, InternshipStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn status_update_cannot_undo_a_concurrent_completion() {
    let env = setup().await;
    let intern_id = create_intern(&env, "racer@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let completer = {
        let internships = Arc::clone(&env.internships);
        let id = internship_id.clone();
        tokio::spawn(async move { internships.complete(&id).await })
    };
    let updater = {
        let internships = Arc::clone(&env.internships);
        let id = internship_id.clone();
        tokio::spawn(async move {
            internships
                .update_status(&id, InternshipStatus::InProgress)
                .await
        })
    };

    completer.await.unwrap().unwrap();
    // The status update may land before the completion or lose to it with
    // a conflict; it must never win after it.
    let _ = updater.await.unwrap();

    let internship = env.internships.get(&internship_id).await.unwrap();
    assert_eq!(internship.status, InternshipStatus::Completed);
    assert!(internship.certificate_id.is_some());
}

#[tokio::test]
async fn verify_unknown_certificate_is_invalid_not_an_error() {
    let env = setup().await;

    let response = env.registry.verify("NEX-nonexist-FFFFFF").await.unwrap();
    assert!(!response.valid);
    assert!(response.certificate.is_none());
}

#[tokio::test]
async fn verify_and_view_expose_public_fields() {
    let env = setup().await;
    let intern_id = create_intern(&env, "public@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;
    let (_, certificate) = env.internships.complete(&internship_id).await.unwrap();

    let verified = env
        .registry
        .verify(&certificate.certificate_id)
        .await
        .unwrap();
    assert!(verified.valid);
    let details = verified.certificate.unwrap();
    assert_eq!(details.intern_name, "Test Intern");
    assert_eq!(details.internship_title, "Backend Engineering");

    let view = env.registry.view(&certificate.certificate_id).await.unwrap();
    assert_eq!(view.certificate_id, certificate.certificate_id);
    assert!(view
        .verify_url
        .ends_with(&format!("/certificates/verify/{}", certificate.certificate_id)));
    assert!(view.artifact_url.is_none());
}

#[tokio::test]
async fn artifact_can_be_attached_later_without_changing_the_id() {
    let env = setup().await;
    let intern_id = create_intern(&env, "artifact@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    // Issued with no artifact store configured: artifact pending
    let (_, certificate) = env.internships.complete(&internship_id).await.unwrap();
    assert!(certificate.artifact_url.is_none());

    // A later retry attaches the URL; the certificate id is unchanged
    let updated = env
        .registry
        .attach_artifact(
            &certificate.certificate_id,
            "https://artifacts.example.com/cert.svg",
        )
        .await
        .unwrap();

    assert_eq!(updated.certificate_id, certificate.certificate_id);
    assert_eq!(
        updated.artifact_url.as_deref(),
        Some("https://artifacts.example.com/cert.svg")
    );
    assert!(updated.artifact_uploaded_at.is_some());
}

#[tokio::test]
async fn failed_artifact_upload_still_issues_a_certificate() {
    let env = setup().await;
    let intern_id = create_intern(&env, "flaky@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let store = Arc::new(ArtifactStore::new(Box::new(FailingBackend)));
    let internships = InternshipManager::new(
        env.pool.clone(),
        Arc::clone(&env.accounts),
        Arc::clone(&env.registry),
        Some(store),
    );

    let (internship, certificate) = internships.complete(&internship_id).await.unwrap();
    assert_eq!(internship.status, InternshipStatus::Completed);

    // Let the background upload run and fail
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let stored = env.registry.get(&certificate.certificate_id).await.unwrap();
    assert!(stored.artifact_url.is_none());
    assert!(stored.artifact_uploaded_at.is_none());

    // A later retry can still attach the artifact under the same id
    let updated = env
        .registry
        .attach_artifact(
            &certificate.certificate_id,
            "https://artifacts.example.com/late.svg",
        )
        .await
        .unwrap();
    assert_eq!(updated.certificate_id, certificate.certificate_id);
}

#[tokio::test]
async fn my_internship_includes_certificate_after_completion() {
    let env = setup().await;
    let intern_id = create_intern(&env, "me@example.com").await;
    let internship_id = create_internship(&env, &intern_id).await;

    let own = env.internships.get_own(&intern_id).await.unwrap();
    assert!(own.certificate.is_none());

    env.internships.complete(&internship_id).await.unwrap();

    let own = env.internships.get_own(&intern_id).await.unwrap();
    let summary = own.certificate.unwrap();
    assert!(summary.certificate_id.starts_with("NEX-"));
    assert!(summary.verify_url.contains("/certificates/verify/"));
}
