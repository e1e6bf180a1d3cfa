use super::{ErrorResponse, PhotosError, PhotosQuery, RefreshResponse, core::paginate};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use tracing::{error, warn};

fn parse_positive(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn failure_response(e: &PhotosError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to fetch photos".to_string(),
            details: e.to_string(),
        }),
    )
        .into_response()
}

/// `GET /api/photos?page=<n>&limit=<n>`
pub async fn photos_handler(
    State(app_state): State<AppState>,
    Query(query): Query<PhotosQuery>,
) -> Response {
    let config = &app_state.config.photos;
    let page = parse_positive(query.page.as_deref(), 1);
    let limit = parse_positive(query.limit.as_deref(), config.default_page_limit)
        .min(config.max_page_limit.max(1));

    let photos = match app_state.photos.list_photos().await {
        Ok(photos) => photos,
        Err(e) => {
            if e.is_configuration() {
                warn!("Photo storage is not configured: {}", e);
            } else {
                error!("Error fetching photos: {}", e);
            }
            return failure_response(&e);
        }
    };

    let ttl = app_state.photos.ttl().as_secs();
    let cache_control = format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        ttl,
        ttl.saturating_mul(2)
    );

    (
        [(header::CACHE_CONTROL, cache_control)],
        Json(paginate(&photos, page, limit)),
    )
        .into_response()
}

/// `POST /api/photos/refresh`
pub async fn refresh_photos_handler(State(app_state): State<AppState>) -> Response {
    match app_state.photos.refresh().await {
        Ok(photos) => Json(RefreshResponse {
            total: photos.len(),
        })
        .into_response(),
        Err(e) => {
            error!("Failed to refresh photos: {}", e);
            failure_response(&e)
        }
    }
}
