use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// RRP HTTP server.
pub struct RrpServer {
    config: ServerConfig,
    state: AppState,
}

impl RrpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("RRP server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rrp_service::{NoopNotifier, PoolConfig, RatingPool};

    use super::*;

    fn server() -> RrpServer {
        let pool = RatingPool::in_memory(&PoolConfig::in_memory(), Arc::new(NoopNotifier));
        RrpServer::new(ServerConfig::default(), AppState::new(pool))
    }

    #[test]
    fn server_construction() {
        assert_eq!(server().config().bind_addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let _router = server().router();
    }
}
