pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// A paginated object-storage listing call.
#[async_trait]
pub trait ObjectLister: Send + Sync {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage, StorageError>;

    fn name(&self) -> &str;
}

pub type DynObjectLister = Arc<dyn ObjectLister>;

/// Build the lister for this configuration. Missing credentials do not fail
/// here: the returned lister reports the configuration error on every call so
/// the server can still start and serve everything else.
pub async fn create_lister(config: &StorageConfig) -> DynObjectLister {
    match config.resolve() {
        Ok(resolved) => Arc::new(providers::s3::S3Lister::new(&resolved).await),
        Err(e) => {
            warn!("Photo storage unavailable: {}", e);
            Arc::new(providers::unconfigured::UnconfiguredLister::new(e))
        }
    }
}
