use super::types::{PostsFilter, SortOrder};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

#[derive(Deserialize)]
pub struct PostsQuery {
    page: Option<String>,
    category: Option<String>,
    order: Option<String>,
}

impl PostsQuery {
    fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }

    fn filter(&self) -> PostsFilter {
        PostsFilter {
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            order: match self.order.as_deref() {
                Some("oldest") => SortOrder::Oldest,
                _ => SortOrder::Newest,
            },
        }
    }
}

/// `GET /api/posts?page=<n>&category=<slug>&order=newest|oldest`
pub async fn posts_index_handler(
    State(app_state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Response {
    let page = app_state
        .posts
        .get_posts_page(query.page(), &query.filter())
        .await;
    Json(page).into_response()
}

/// `GET /api/posts/{*slug}`
pub async fn post_detail_handler(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    match app_state.posts.get_post(&slug).await {
        Some(post) => Json(app_state.posts.detail(&post)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Post not found", "slug": slug })),
        )
            .into_response(),
    }
}

pub async fn categories_handler(State(app_state): State<AppState>) -> Response {
    Json(app_state.posts.categories().await).into_response()
}

pub async fn timeline_handler(State(app_state): State<AppState>) -> Response {
    Json(app_state.posts.timeline().await).into_response()
}

/// `POST /api/posts/refresh`
pub async fn refresh_posts_handler(State(app_state): State<AppState>) -> Response {
    match app_state.posts.refresh_posts().await {
        Ok(_) => Json(json!({ "total": app_state.posts.post_count().await })).into_response(),
        Err(e) => {
            error!("Failed to refresh posts: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to refresh posts",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
