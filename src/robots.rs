use crate::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Handler for /robots.txt
/// Serves a custom file from the static directory when present, otherwise
/// a permissive default that keeps crawlers out of the admin API.
pub async fn robots_txt_handler(State(app_state): State<AppState>) -> Response {
    let custom_robots_path = app_state.config.static_files.directory.join("robots.txt");

    if custom_robots_path.exists() {
        match tokio::fs::read_to_string(&custom_robots_path).await {
            Ok(content) => {
                return (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    content,
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!("Failed to read custom robots.txt: {}", e);
            }
        }
    }

    let default_robots = r#"User-agent: *
Allow: /
Disallow: /api/
Crawl-delay: 1
"#;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        default_robots,
    )
        .into_response()
}
