//! Deferred store handle shared by all handlers
//!
//! The server starts listening before the database session is established.
//! Handlers resolve the store through [`StoreManager::get`], which waits a
//! bounded time for the background connection and otherwise reports the
//! store as not ready.

use portfolio_core::{DatabaseConfig, PortfolioError, StoreBackend};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::memory::MemoryStore;
use super::mongodb::MongoStore;
use super::traits::DocumentStore;

enum StoreState {
    Connecting,
    Ready(Arc<dyn DocumentStore>),
    Failed(String),
}

/// Owns the store once it is connected and tracks its readiness
pub struct StoreManager {
    state: watch::Sender<StoreState>,
    ready_timeout: Duration,
}

impl StoreManager {
    /// Create a manager whose store is still connecting
    ///
    /// `ready_timeout` bounds how long [`get`](Self::get) waits for the
    /// connection to finish.
    pub fn new(ready_timeout: Duration) -> Self {
        let (state, _) = watch::channel(StoreState::Connecting);
        Self {
            state,
            ready_timeout,
        }
    }

    /// Create a manager around an already connected store
    pub fn ready(store: Arc<dyn DocumentStore>) -> Self {
        let manager = Self::new(Duration::ZERO);
        manager.set_ready(store);
        manager
    }

    /// Connect the configured store and publish the outcome
    pub async fn initialize(&self, config: &DatabaseConfig) -> Result<(), PortfolioError> {
        match Self::create_store(config).await {
            Ok(store) => {
                info!(
                    "Connected to {} store at {}",
                    store.store_type(),
                    config.target()
                );
                self.set_ready(store);
                Ok(())
            }
            Err(e) => {
                self.set_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Connect in a background task; failures are logged, not fatal
    pub fn spawn_initialize(self: &Arc<Self>, config: DatabaseConfig) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = manager.initialize(&config).await {
                error!("Database connection to {} failed: {}", config.target(), e);
            }
        })
    }

    /// Create a single store based on configuration
    async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, PortfolioError> {
        match config.backend {
            StoreBackend::Mongodb => {
                let store = MongoStore::connect(config).await?;
                Ok(Arc::new(store))
            }
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        }
    }

    pub fn set_ready(&self, store: Arc<dyn DocumentStore>) {
        self.state.send_replace(StoreState::Ready(store));
    }

    pub fn set_failed(&self, reason: impl Into<String>) {
        self.state.send_replace(StoreState::Failed(reason.into()));
    }

    /// Current state name: `connecting`, `ready` or `failed`
    pub fn status(&self) -> &'static str {
        match *self.state.borrow() {
            StoreState::Connecting => "connecting",
            StoreState::Ready(_) => "ready",
            StoreState::Failed(_) => "failed",
        }
    }

    /// Returns true once the store finished connecting successfully
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), StoreState::Ready(_))
    }

    /// Resolve the store, waiting for an in-flight connection
    pub async fn get(&self) -> Result<Arc<dyn DocumentStore>, PortfolioError> {
        let mut rx = self.state.subscribe();
        let settled = tokio::time::timeout(
            self.ready_timeout,
            rx.wait_for(|state| !matches!(state, StoreState::Connecting)),
        )
        .await;

        match settled {
            Ok(Ok(state)) => Self::resolve(&state),
            Ok(Err(_)) => Err(PortfolioError::Internal(
                "store state channel closed".to_string(),
            )),
            Err(_) => Err(PortfolioError::NotReady(
                "database is still connecting".to_string(),
            )),
        }
    }

    fn resolve(state: &StoreState) -> Result<Arc<dyn DocumentStore>, PortfolioError> {
        match state {
            StoreState::Ready(store) => Ok(Arc::clone(store)),
            StoreState::Failed(reason) => Err(PortfolioError::NotReady(reason.clone())),
            StoreState::Connecting => Err(PortfolioError::NotReady(
                "database is still connecting".to_string(),
            )),
        }
    }

    /// Ping the store, returning its type name
    pub async fn health_check(&self) -> Result<&'static str, PortfolioError> {
        let store = self.get().await?;
        store.health_check().await?;
        Ok(store.store_type())
    }

    /// Close the store if it ever connected
    pub async fn close(&self) -> Result<(), PortfolioError> {
        let store = match &*self.state.borrow() {
            StoreState::Ready(store) => Some(Arc::clone(store)),
            _ => None,
        };
        match store {
            Some(store) => store.close().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_manager_returns_store() {
        let manager = StoreManager::ready(Arc::new(MemoryStore::new()));
        assert!(manager.is_ready());
        assert_eq!(manager.status(), "ready");
        assert_eq!(manager.get().await.unwrap().store_type(), "memory");
    }

    #[tokio::test]
    async fn test_connecting_manager_times_out_as_not_ready() {
        let manager = StoreManager::new(Duration::from_millis(20));
        assert_eq!(manager.status(), "connecting");
        let result = manager.get().await;
        assert!(matches!(result, Err(PortfolioError::NotReady(_))));
    }

    #[tokio::test]
    async fn test_failed_manager_reports_not_ready() {
        let manager = StoreManager::new(Duration::from_secs(5));
        manager.set_failed("authentication failed");
        assert_eq!(manager.status(), "failed");
        match manager.get().await {
            Err(PortfolioError::NotReady(reason)) => assert_eq!(reason, "authentication failed"),
            other => panic!("expected NotReady, got {:?}", other.map(|s| s.store_type())),
        }
    }

    #[tokio::test]
    async fn test_waiting_request_sees_late_connection() {
        let manager = Arc::new(StoreManager::new(Duration::from_secs(5)));
        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.get().await.map(|s| s.store_type()) })
        };

        tokio::task::yield_now().await;
        manager.set_ready(Arc::new(MemoryStore::new()));
        assert_eq!(waiter.await.unwrap().unwrap(), "memory");
    }

    #[tokio::test]
    async fn test_initialize_memory_backend() {
        let manager = Arc::new(StoreManager::new(Duration::from_secs(1)));
        let config = DatabaseConfig {
            backend: StoreBackend::Memory,
            ..DatabaseConfig::default()
        };
        manager.spawn_initialize(config).await.unwrap();
        assert!(manager.is_ready());
        assert_eq!(manager.health_check().await.unwrap(), "memory");
    }

    #[tokio::test]
    async fn test_initialize_failure_is_recorded() {
        let manager = StoreManager::new(Duration::from_secs(1));
        // Mongodb backend without credentials cannot build a connection string
        let result = manager.initialize(&DatabaseConfig::default()).await;
        assert!(result.is_err());
        assert_eq!(manager.status(), "failed");
        assert!(manager.close().await.is_ok());
    }
}
