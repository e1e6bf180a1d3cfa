use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod gallery;
pub mod photos;
pub mod posts;
pub mod robots;
pub mod startup_checks;
pub mod storage;

pub use posts::PostsConfig;
pub use storage::StorageConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub photos: PhotosConfig,
    pub gallery: GalleryConfig,
    pub posts: PostsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    pub base_url: Option<String>,
    /// Served at `/robots.txt` instead of the built-in default when present.
    pub robots_file: Option<PathBuf>,
    /// Ask crawlers to stay away entirely, for preview deployments.
    pub disallow_indexing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Waynspace".to_string(),
            log_level: "info".to_string(),
            base_url: None,
            robots_file: None,
            disallow_indexing: false,
        }
    }
}

/// Photo listing endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PhotosConfig {
    /// How long a storage listing is reused before relisting.
    pub cache_ttl_seconds: u64,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
    pub refresh_interval_minutes: Option<u64>,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 3600,
            default_page_limit: 50,
            max_page_limit: 200,
            refresh_interval_minutes: None,
        }
    }
}

/// Masonry gallery engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub photos_per_page: usize,
    pub load_debounce_ms: u64,
    /// Fraction of the sentinel that must be visible to trigger a page load.
    pub sentinel_threshold: f64,
    pub min_tile_height: f64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            photos_per_page: 24,
            load_debounce_ms: 100,
            sentinel_threshold: 0.1,
            min_tile_height: 1.0,
        }
    }
}

use axum::{
    Router,
    routing::{get, post},
};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub photos: photos::SharedPhotoSource,
    pub posts: Arc<posts::PostsManager>,
    pub config: Config,
}

pub async fn create_app(config: Config) -> Router {
    let lister = storage::create_lister(&config.storage).await;
    create_app_with_lister(config, lister).await
}

/// Build the router around an already constructed storage lister.
pub async fn create_app_with_lister(config: Config, lister: storage::DynObjectLister) -> Router {
    let (router, _) = build_app(config, lister).await;
    router
}

/// Build the router and hand back the shared state so the caller can start
/// background work against the same photo source and posts manager.
pub async fn build_app(config: Config, lister: storage::DynObjectLister) -> (Router, AppState) {
    let photo_source = Arc::new(photos::PhotoSource::new(
        lister,
        config.storage.location(),
        Duration::from_secs(config.photos.cache_ttl_seconds),
    ));

    let posts_manager = Arc::new(posts::PostsManager::new(config.posts.clone()));
    if let Err(e) = posts_manager.refresh_posts().await {
        error!(
            "Failed to load posts from {:?}: {}",
            config.posts.source_directory, e
        );
    }

    let app_state = AppState {
        photos: photo_source,
        posts: posts_manager,
        config,
    };

    let router = Router::new()
        .route("/api/photos", get(photos::photos_handler))
        .route("/api/photos/refresh", post(photos::refresh_photos_handler))
        .route("/api/posts", get(posts::handlers::posts_index_handler))
        .route(
            "/api/posts/refresh",
            post(posts::handlers::refresh_posts_handler),
        )
        .route(
            "/api/posts/{*slug}",
            get(posts::handlers::post_detail_handler),
        )
        .route("/api/categories", get(posts::handlers::categories_handler))
        .route("/api/timeline", get(posts::handlers::timeline_handler))
        .route("/robots.txt", get(robots::robots_txt_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let uri = request.uri();
                    let user_agent = request
                        .headers()
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %uri.path(),
                        query = ?uri.query(),
                        user_agent = %user_agent,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state.clone());

    (router, app_state)
}
