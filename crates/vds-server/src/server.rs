use tokio::net::TcpListener;
use vds_repo::Repository;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Document store HTTP server.
pub struct VdsServer {
    config: ServerConfig,
}

impl VdsServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the configured on-disk repository.
    pub fn open_repository(&self) -> ServerResult<Repository> {
        Ok(Repository::open(&self.config.repo_path, self.config.repo.clone())?)
    }

    /// Build the router (useful for testing).
    pub fn router(&self, repo: Repository) -> axum::Router {
        build_router(repo, self.config.cors)
    }

    /// Serve requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router(self.open_repository()?);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            repo = %self.config.repo_path.display(),
            "vds server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
