use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod admin;
pub mod api;
pub mod design;
pub mod markdown;
pub mod posts;
pub mod robots;
pub mod settings;
pub mod startup_checks;
pub mod static_files;
pub mod store;
pub mod templating;

pub use admin::AdminConfig;
pub use store::RemoteStoreConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub templates: TemplateConfig,
    pub static_files: StaticConfig,
    pub store: StoreConfig,
    pub blog: BlogConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Where the local cache, admin state, and design settings live.
    pub data_directory: PathBuf,
    #[serde(default)]
    pub remote: RemoteStoreConfig,
    /// Periodic pull from the remote store, minutes. Off when unset.
    #[serde(default)]
    pub refresh_interval_minutes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlogConfig {
    pub url_prefix: String,
    pub posts_per_page: usize,
    pub latest_limit: usize,
    pub home_template: String,
    pub index_template: String,
    pub post_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            app: AppConfig {
                name: "Kiji".to_string(),
                log_level: "info".to_string(),
                base_url: None,
            },
            templates: TemplateConfig {
                directory: PathBuf::from("templates"),
            },
            static_files: StaticConfig {
                directory: PathBuf::from("static"),
            },
            store: StoreConfig {
                data_directory: PathBuf::from("data"),
                remote: RemoteStoreConfig::None,
                refresh_interval_minutes: Some(60),
            },
            blog: BlogConfig {
                url_prefix: "/blog".to_string(),
                posts_per_page: 9,
                latest_limit: 3,
                home_template: "index.html.liquid".to_string(),
                index_template: "blog.html.liquid".to_string(),
                post_template: "post.html.liquid".to_string(),
            },
            admin: AdminConfig {
                username: "admin".to_string(),
                // Digest of "change-me"; replace via `kiji admin set-password`
                password_sha256: admin::SessionStore::hash_password("change-me"),
                session_secret: "change-me-in-production".to_string(),
                session_hours: 24,
            },
        }
    }
}

use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub template_engine: Arc<templating::TemplateEngine>,
    pub static_handler: static_files::StaticFileHandler,
    pub repository: Arc<store::PostRepository>,
    pub sessions: Arc<admin::SessionStore>,
    pub settings: Arc<settings::SettingsStore>,
    pub design: Arc<design::DesignStore>,
    pub config: Config,
}

#[derive(serde::Deserialize)]
struct StaticQuery {
    v: Option<String>,
}

async fn static_file_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<StaticQuery>,
) -> impl IntoResponse {
    app_state
        .static_handler
        .serve(&path, query.v.is_some())
        .await
}

pub async fn create_app(config: Config) -> Router {
    let template_engine = Arc::new(templating::TemplateEngine::new(
        config.templates.directory.clone(),
    ));

    let static_handler =
        static_files::StaticFileHandler::new(config.static_files.directory.clone());

    let data_dir = &config.store.data_directory;

    let remote = store::create_remote_store(&config.store.remote).unwrap_or_else(|e| {
        error!("Remote store unusable, falling back to local cache only: {}", e);
        store::create_remote_store(&RemoteStoreConfig::None)
            .expect("null remote store is infallible")
    });

    let repository = Arc::new(store::PostRepository::new(
        store::LocalCache::new(data_dir),
        remote.clone(),
    ));
    repository.load().await;

    if let Some(interval_minutes) = config.store.refresh_interval_minutes
        && interval_minutes > 0
        && !matches!(config.store.remote, RemoteStoreConfig::None)
    {
        store::PostRepository::start_background_refresh(repository.clone(), interval_minutes);
    }

    let sessions = Arc::new(admin::SessionStore::open(data_dir, config.admin.clone()).await);

    let settings = Arc::new(settings::SettingsStore::new(data_dir, remote));
    settings.load().await;

    let design = Arc::new(design::DesignStore::open(data_dir).await);

    let app_state = AppState {
        template_engine,
        static_handler,
        repository,
        sessions,
        settings,
        design,
        config: config.clone(),
    };

    let blog_prefix = config.blog.url_prefix.trim_end_matches('/').to_string();

    Router::new()
        .route("/", axum::routing::get(posts::handlers::home_handler))
        .route(
            &blog_prefix,
            axum::routing::get(posts::handlers::blog_index_handler),
        )
        .route(
            &format!("{blog_prefix}/{{id}}"),
            axum::routing::get(posts::handlers::post_detail_handler),
        )
        .route(
            "/custom.css",
            axum::routing::get(design::stylesheet_handler),
        )
        .route(
            "/robots.txt",
            axum::routing::get(robots::robots_txt_handler),
        )
        .route("/static/{*path}", axum::routing::get(static_file_handler))
        // Public JSON API
        .route(
            "/api/posts",
            axum::routing::get(posts::handlers::api_posts_handler),
        )
        .route(
            "/api/posts/{id}",
            axum::routing::get(posts::handlers::api_post_handler),
        )
        .route(
            "/api/settings",
            axum::routing::get(settings::public_settings_handler),
        )
        // Session endpoints
        .route("/api/auth", axum::routing::post(admin::handlers::login_handler))
        .route(
            "/api/logout",
            axum::routing::post(admin::handlers::logout_handler),
        )
        .route(
            "/api/verify",
            axum::routing::get(admin::handlers::verify_handler),
        )
        // Admin JSON API
        .route(
            "/api/admin/posts",
            axum::routing::get(admin::handlers::list_posts_handler),
        )
        .route(
            "/api/admin/posts/create",
            axum::routing::post(admin::handlers::create_post_handler),
        )
        .route(
            "/api/admin/posts/update",
            axum::routing::post(admin::handlers::update_post_handler),
        )
        .route(
            "/api/admin/posts/delete",
            axum::routing::post(admin::handlers::delete_post_handler),
        )
        .route(
            "/api/admin/posts/publish",
            axum::routing::post(admin::handlers::publish_post_handler),
        )
        .route(
            "/api/admin/posts/unpublish",
            axum::routing::post(admin::handlers::unpublish_post_handler),
        )
        .route(
            "/api/admin/posts/refresh",
            axum::routing::post(admin::handlers::refresh_posts_handler),
        )
        .route(
            "/api/admin/stats",
            axum::routing::get(admin::handlers::stats_handler),
        )
        .route(
            "/api/admin/settings",
            axum::routing::get(admin::handlers::get_settings_handler),
        )
        .route(
            "/api/admin/settings/update",
            axum::routing::post(admin::handlers::update_settings_handler),
        )
        .route(
            "/api/admin/export",
            axum::routing::get(admin::handlers::export_posts_handler),
        )
        .route(
            "/api/admin/import",
            axum::routing::post(admin::handlers::import_posts_handler),
        )
        .route(
            "/api/admin/password",
            axum::routing::post(admin::handlers::change_password_handler),
        )
        .route(
            "/api/admin/design",
            axum::routing::get(design::get_design_handler),
        )
        .route(
            "/api/admin/design/update",
            axum::routing::post(design::update_design_handler),
        )
        .route(
            "/api/admin/design/export",
            axum::routing::get(design::export_design_handler),
        )
        .route(
            "/api/admin/design/import",
            axum::routing::post(design::import_design_handler),
        )
        // Everything else falls through to plain template pages
        .route(
            "/{*path}",
            axum::routing::get(templating::template_page_handler),
        )
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
                    let headers = request.headers();
                    let user_agent = headers
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");
                    let referer = headers
                        .get("referer")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %request.uri().path(),
                        query = ?request.uri().query(),
                        user_agent = %user_agent,
                        referer = %referer,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            size = %size,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}
