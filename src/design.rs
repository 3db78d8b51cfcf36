use crate::api::ApiResponse;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

const DESIGN_FILE: &str = "site_design.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignColors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub accent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DesignTypography {
    pub primary_font: String,
    pub heading_font: String,
    pub base_font_size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DesignLayout {
    pub border_radius: String,
    pub content_width: String,
}

/// The design tokens the customizer edits. Values are free-form CSS; the
/// only consumer is the generated stylesheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignSettings {
    pub colors: DesignColors,
    pub typography: DesignTypography,
    pub layout: DesignLayout,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            colors: DesignColors {
                primary: "#0071e3".to_string(),
                secondary: "#1d1d1f".to_string(),
                background: "#ffffff".to_string(),
                accent: "#f5f5f7".to_string(),
            },
            typography: DesignTypography {
                primary_font: "Inter".to_string(),
                heading_font: "inherit".to_string(),
                base_font_size: "16px".to_string(),
            },
            layout: DesignLayout {
                border_radius: "8px".to_string(),
                content_width: "1200px".to_string(),
            },
        }
    }
}

/// File interchange shape for design exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignExport {
    pub settings: DesignSettings,
    #[serde(default)]
    pub css: String,
    pub export_date: DateTime<Utc>,
}

/// Render the custom stylesheet from the design tokens: root custom
/// properties, the container width, and a heading font override when one
/// is chosen.
pub fn generate_css(settings: &DesignSettings) -> String {
    let mut css = format!(
        "/* Custom Design Settings */\n\
         :root {{\n\
         \x20   --color-primary: {};\n\
         \x20   --color-secondary: {};\n\
         \x20   --color-bg: {};\n\
         \x20   --color-bg-secondary: {};\n\
         \x20   --font-family: {}, -apple-system, BlinkMacSystemFont, sans-serif;\n\
         \x20   --font-size-base: {};\n\
         \x20   --border-radius-md: {};\n\
         }}\n\n\
         .container {{\n\
         \x20   max-width: {};\n\
         }}\n",
        settings.colors.primary,
        settings.colors.secondary,
        settings.colors.background,
        settings.colors.accent,
        settings.typography.primary_font,
        settings.typography.base_font_size,
        settings.layout.border_radius,
        settings.layout.content_width,
    );

    if settings.typography.heading_font != "inherit" {
        css.push_str(&format!(
            "\nh1, h2, h3, h4, h5, h6 {{\n\
             \x20   font-family: {}, var(--font-family);\n\
             }}\n",
            settings.typography.heading_font
        ));
    }

    css
}

/// Persisted design settings plus the derived stylesheet.
pub struct DesignStore {
    path: PathBuf,
    settings: RwLock<DesignSettings>,
}

impl DesignStore {
    pub async fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(DESIGN_FILE);
        let settings = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Ignoring malformed design file: {}", e);
                    DesignSettings::default()
                }
            },
            Err(_) => DesignSettings::default(),
        };

        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    pub async fn current(&self) -> DesignSettings {
        self.settings.read().await.clone()
    }

    pub async fn stylesheet(&self) -> String {
        generate_css(&*self.settings.read().await)
    }

    pub async fn save(&self, settings: DesignSettings) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(&settings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(&self.path, json).await?;
        *self.settings.write().await = settings;
        info!("Design settings saved");
        Ok(())
    }

    pub async fn export(&self) -> DesignExport {
        let settings = self.current().await;
        DesignExport {
            css: generate_css(&settings),
            settings,
            export_date: Utc::now(),
        }
    }
}

/// GET /custom.css - the stylesheet the pages link after the base styles.
pub async fn stylesheet_handler(State(state): State<AppState>) -> Response {
    let css = state.design.stylesheet().await;
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300, must-revalidate"),
        ],
        css,
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

pub async fn get_design_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(e) = crate::admin::handlers::authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }
    ApiResponse::ok(state.design.current().await).into_response()
}

pub async fn update_design_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(settings): axum::Json<DesignSettings>,
) -> Response {
    if let Err(e) = crate::admin::handlers::authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }

    match state.design.save(settings).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({"message": "Design saved"})).into_response(),
        Err(e) => {
            warn!("Failed to save design settings: {}", e);
            ApiResponse::<()>::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save design")
                .into_response()
        }
    }
}

pub async fn export_design_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(e) = crate::admin::handlers::authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }
    ApiResponse::ok(state.design.export().await).into_response()
}

pub async fn import_design_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<serde_json::Value>,
) -> Response {
    if let Err(e) = crate::admin::handlers::authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }

    let Some(settings) = payload.get("settings") else {
        return ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Invalid design format")
            .into_response();
    };
    let settings: DesignSettings = match serde_json::from_value(settings.clone()) {
        Ok(settings) => settings,
        Err(e) => {
            return ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                format!("Invalid design format: {e}"),
            )
            .into_response();
        }
    };

    match state.design.save(settings).await {
        Ok(()) => {
            ApiResponse::ok(serde_json::json!({"message": "Design imported"})).into_response()
        }
        Err(e) => {
            warn!("Failed to import design settings: {}", e);
            ApiResponse::<()>::error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to import design")
                .into_response()
        }
    }
}
