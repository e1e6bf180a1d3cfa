use crate::Config;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Photo storage is not configured: {0}")]
    StorageNotConfigured(String),

    #[error("Posts directory does not exist: {0}")]
    PostsDirectoryMissing(String),

    #[error("Posts directory is not accessible: {0}")]
    PostsDirectoryUnreadable(#[from] std::io::Error),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl StartupCheckError {
    /// Whether the server should refuse to start.
    pub fn is_critical(&self) -> bool {
        matches!(self, StartupCheckError::InvalidSetting(_))
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    match config.storage.resolve() {
        Ok(resolved) => info!(
            "Photo storage configured: bucket {} prefix {}",
            resolved.location.bucket, resolved.location.prefix
        ),
        Err(e) => {
            warn!("Photo listing will fail until storage is configured: {}", e);
            errors.push(StartupCheckError::StorageNotConfigured(e.to_string()));
        }
    }

    let posts_dir = &config.posts.source_directory;
    if !posts_dir.exists() {
        warn!("Posts directory does not exist: {:?}", posts_dir);
        errors.push(StartupCheckError::PostsDirectoryMissing(
            posts_dir.display().to_string(),
        ));
    } else {
        match tokio::fs::read_dir(posts_dir).await {
            Ok(_) => info!("Posts directory is accessible: {:?}", posts_dir),
            Err(e) => {
                error!("Posts directory is not accessible: {}", e);
                errors.push(StartupCheckError::PostsDirectoryUnreadable(e));
            }
        }
    }

    if config.photos.default_page_limit == 0 || config.photos.max_page_limit == 0 {
        errors.push(StartupCheckError::InvalidSetting(
            "photos page limits must be greater than zero".to_string(),
        ));
    }
    if config.gallery.photos_per_page == 0 {
        errors.push(StartupCheckError::InvalidSetting(
            "gallery.photos_per_page must be greater than zero".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.gallery.sentinel_threshold) {
        errors.push(StartupCheckError::InvalidSetting(format!(
            "gallery.sentinel_threshold must be between 0 and 1, got {}",
            config.gallery.sentinel_threshold
        )));
    }

    if let Some(path) = &config.app.robots_file
        && !path.exists()
    {
        warn!(
            "Robots file {:?} does not exist, the default will be served",
            path
        );
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
