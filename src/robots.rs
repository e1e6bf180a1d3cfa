use crate::{AppConfig, AppState};
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

const DISALLOWED_PATHS: &[&str] = &["/api/", "/admin/"];

/// Built-in robots.txt. Preview deployments block everything; otherwise
/// crawlers may index all pages except the JSON API.
pub fn default_robots(app: &AppConfig) -> String {
    if app.disallow_indexing {
        return "User-agent: *\nDisallow: /\n".to_string();
    }

    let mut body = String::from("User-agent: *\nAllow: /\n");
    for path in DISALLOWED_PATHS {
        body.push_str(&format!("Disallow: {}\n", path));
    }

    if let Some(base_url) = &app.base_url {
        let base_url = base_url.trim_end_matches('/');
        body.push_str(&format!("\nHost: {}\nSitemap: {}/sitemap.xml\n", base_url, base_url));
    }

    body
}

/// Handler for /robots.txt
pub async fn robots_txt_handler(State(app_state): State<AppState>) -> Response {
    if let Some(path) = &app_state.config.app.robots_file {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                return (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    content,
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!("Failed to read robots file {:?}: {}", path, e);
            }
        }
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        default_robots(&app_state.config.app),
    )
        .into_response()
}
