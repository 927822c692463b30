/// Application context and dependency injection
use crate::{
    account::AccountManager,
    artifact::ArtifactStore,
    certificate::CertificateRegistry,
    config::ServerConfig,
    db,
    error::ApiResult,
    internship::InternshipManager,
    rate_limit::{RateLimiter, RateLimiterConfig},
    records::{BillManager, ClientManager, ProjectManager, TaskManager},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub internship_manager: Arc<InternshipManager>,
    pub certificate_registry: Arc<CertificateRegistry>,
    /// Present only when artifact host credentials were configured
    pub artifact_store: Option<Arc<ArtifactStore>>,
    pub task_manager: Arc<TaskManager>,
    pub project_manager: Arc<ProjectManager>,
    pub client_manager: Arc<ClientManager>,
    pub bill_manager: Arc<BillManager>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        // Initialize database
        let pool = db::create_pool(
            &config.storage.database_path,
            db::DatabaseOptions::default(),
        )
        .await?;

        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let config = Arc::new(config);

        let account_manager = Arc::new(AccountManager::new(pool.clone(), Arc::clone(&config)));

        let certificate_registry = Arc::new(CertificateRegistry::new(
            pool.clone(),
            config.authentication.cert_signing_secret.clone(),
            config.service.public_url.clone(),
        ));

        // Artifact store is optional; issuance degrades gracefully without it
        let artifact_store = ArtifactStore::from_config(config.artifact.as_ref()).map(Arc::new);
        if artifact_store.is_none() {
            tracing::info!(
                "Artifact store not configured; certificates will issue without hosted artifacts"
            );
        }

        let internship_manager = Arc::new(InternshipManager::new(
            pool.clone(),
            Arc::clone(&account_manager),
            Arc::clone(&certificate_registry),
            artifact_store.clone(),
        ));

        let task_manager = Arc::new(TaskManager::new(pool.clone()));
        let project_manager = Arc::new(ProjectManager::new(pool.clone()));
        let client_manager = Arc::new(ClientManager::new(pool.clone()));
        let bill_manager = Arc::new(BillManager::new(pool.clone()));

        let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            enabled: config.rate_limit.enabled,
            authenticated_rps: config.rate_limit.authenticated_rps,
            unauthenticated_rps: config.rate_limit.unauthenticated_rps,
            burst_size: config.rate_limit.burst_size,
        }));

        Ok(Self {
            config,
            db: pool,
            account_manager,
            internship_manager,
            certificate_registry,
            artifact_store,
            task_manager,
            project_manager,
            client_manager,
            bill_manager,
            rate_limiter,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
