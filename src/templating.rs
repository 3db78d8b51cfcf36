use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::Datelike;
use std::{collections::HashMap, path::PathBuf, sync::Arc, time::SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

const HEADER_PARTIAL: &str = "_header.html.liquid";
const FOOTER_PARTIAL: &str = "_footer.html.liquid";

/// Liquid template engine with an mtime-checked content cache. Pages are
/// rendered with the shared header and footer partials pre-rendered into
/// the `header`/`footer` globals.
pub struct TemplateEngine {
    template_dir: PathBuf,
    cache: Arc<RwLock<HashMap<String, CachedTemplate>>>,
}

struct CachedTemplate {
    content: String,
    modified: SystemTime,
}

impl TemplateEngine {
    pub fn new(template_dir: PathBuf) -> Self {
        Self {
            template_dir,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn load_template(&self, path: &str) -> Result<String, String> {
        let template_path = self.template_dir.join(path);

        let metadata = tokio::fs::metadata(&template_path)
            .await
            .map_err(|e| format!("Failed to get metadata for {}: {}", path, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| format!("Failed to get modified time: {}", e))?;

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(path)
                && cached.modified >= modified
            {
                debug!("Using cached template for {}", path);
                return Ok(cached.content.clone());
            }
        }

        info!("Loading template: {}", path);
        let content = tokio::fs::read_to_string(&template_path)
            .await
            .map_err(|e| format!("Failed to read template {}: {}", path, e))?;

        self.cache.write().await.insert(
            path.to_string(),
            CachedTemplate {
                content: content.clone(),
                modified,
            },
        );

        Ok(content)
    }

    async fn render_partial(&self, name: &str, globals: &liquid::Object) -> String {
        let content = match self.load_template(name).await {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to load partial {}: {}", name, e);
                return String::new();
            }
        };

        let parser = match liquid::ParserBuilder::with_stdlib().build() {
            Ok(parser) => parser,
            Err(e) => {
                error!("Failed to create parser: {}", e);
                return String::new();
            }
        };

        parser
            .parse(&content)
            .and_then(|template| template.render(globals))
            .unwrap_or_else(|e| {
                error!("Failed to render partial {}: {}", name, e);
                String::new()
            })
    }

    /// Render a page template. The header and footer partials are rendered
    /// with the same globals first, so page titles and nav state resolve
    /// inside them too.
    pub async fn render_template(
        &self,
        template_name: &str,
        globals: liquid::Object,
    ) -> Result<String, String> {
        let mut full_globals = globals;
        full_globals.insert(
            "current_year".into(),
            liquid::model::Value::scalar(chrono::Utc::now().year()),
        );

        let header = self.render_partial(HEADER_PARTIAL, &full_globals).await;
        let footer = self.render_partial(FOOTER_PARTIAL, &full_globals).await;
        full_globals.insert("header".into(), liquid::model::Value::scalar(header));
        full_globals.insert("footer".into(), liquid::model::Value::scalar(footer));

        let template_content = self.load_template(template_name).await?;

        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| format!("Failed to create parser: {}", e))?;
        let template = parser
            .parse(&template_content)
            .map_err(|e| format!("Failed to parse template: {}", e))?;

        template
            .render(&full_globals)
            .map_err(|e| format!("Failed to render template: {}", e))
    }

    /// Render a bare page by URL path (`about` -> `about.html.liquid`).
    pub async fn render_page(&self, path: &str) -> Result<Html<String>, StatusCode> {
        let template_path = if path.is_empty() || path == "/" {
            "index.html.liquid".to_string()
        } else {
            format!("{}.html.liquid", path.trim_start_matches('/'))
        };

        if !self.template_dir.join(&template_path).exists() {
            return Err(StatusCode::NOT_FOUND);
        }

        let globals = liquid::object!({
            "page_title": "",
        });
        match self.render_template(&template_path, globals).await {
            Ok(html) => Ok(Html(html)),
            Err(e) => {
                error!("Template rendering error: {}", e);
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Catch-all handler for plain template pages (about, portfolio, ...).
pub async fn template_page_handler(
    State(app_state): State<crate::AppState>,
    path: Option<Path<String>>,
) -> impl IntoResponse {
    let path = path.map(|p| p.0).unwrap_or_default();
    app_state.template_engine.render_page(&path).await
}
