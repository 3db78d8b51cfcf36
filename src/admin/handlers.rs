use super::error::AdminError;
use crate::api::{
    ApiResponse, create_signed_cookie, get_cookie_value, signed_cookie_payload,
    verify_signed_cookie,
};
use crate::posts::{Post, PostDraft, PostStatus, PostStats};
use crate::store::{PostsExport, StoreError};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

const AUTH_COOKIE: &str = "admin_auth";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    token: String,
    expires_at: DateTime<Utc>,
    user: AdminUser,
}

#[derive(Serialize)]
struct AdminUser {
    username: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    authorized: bool,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct PostIdRequest {
    pub id: String,
}

#[derive(Serialize)]
pub struct SaveResponse {
    post: Post,
    synced: bool,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
    #[serde(default)]
    confirm_password: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    message: String,
}

/// A request is authorized by a bare `token` query parameter (what API
/// clients store) or by the signed session cookie (what the dashboard
/// uses). Both must name the live, unexpired session.
pub async fn authorize_request(
    state: &AppState,
    headers: &HeaderMap,
    token: Option<&str>,
) -> Result<(), AdminError> {
    if let Some(token) = token
        && state.sessions.verify(token).await
    {
        return Ok(());
    }

    if let Some(signed) = get_cookie_value(headers, AUTH_COOKIE)
        && verify_signed_cookie(state.sessions.session_secret(), &signed)
        && let Some(token) = signed_cookie_payload(&signed)
        && state.sessions.verify(token).await
    {
        return Ok(());
    }

    Err(AdminError::Unauthorized)
}

fn store_error_response(e: StoreError) -> Response {
    let status = match &e {
        StoreError::Validation(_) | StoreError::InvalidImport(_) => StatusCode::BAD_REQUEST,
        StoreError::PostNotFound(_) => StatusCode::NOT_FOUND,
        _ => {
            error!("Store operation failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    ApiResponse::<()>::error(status, e.to_string()).into_response()
}

fn save_message(synced: bool) -> String {
    if synced {
        "Post saved".to_string()
    } else {
        "Post saved locally (remote sync pending)".to_string()
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Result<impl IntoResponse, AdminError> {
    let session = state
        .sessions
        .login(&payload.username, &payload.password)
        .await?;

    let mut headers = HeaderMap::new();
    if let Ok(signed) = create_signed_cookie(state.sessions.session_secret(), &session.token) {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            AUTH_COOKIE,
            signed,
            state.config.admin.session_hours * 3600
        );
        if let Ok(value) = cookie.parse() {
            headers.insert(SET_COOKIE, value);
        }
    }

    let response = LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: AdminUser {
            username: payload.username,
        },
    };
    Ok((headers, ApiResponse::ok(response)))
}

pub async fn logout_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.sessions.logout().await;

    let mut headers = HeaderMap::new();
    let cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", AUTH_COOKIE);
    if let Ok(value) = cookie.parse() {
        headers.insert(SET_COOKIE, value);
    }

    (
        headers,
        ApiResponse::ok(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

pub async fn verify_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> ApiResponse<VerifyResponse> {
    let authorized = authorize_request(&state, &headers, query.token.as_deref())
        .await
        .is_ok();
    ApiResponse::ok(VerifyResponse { authorized })
}

pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<Post>>, AdminError> {
    authorize_request(&state, &headers, query.token.as_deref()).await?;
    Ok(ApiResponse::ok(state.repository.all_posts().await))
}

pub async fn create_post_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<PostDraft>,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }

    match state.repository.save_post(draft).await {
        Ok(outcome) => ApiResponse::ok(SaveResponse {
            message: save_message(outcome.synced),
            post: outcome.post,
            synced: outcome.synced,
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn update_post_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<PostDraft>,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }
    if draft.id.is_none() {
        return ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "post id is required")
            .into_response();
    }

    match state.repository.save_post(draft).await {
        Ok(outcome) => ApiResponse::ok(SaveResponse {
            message: save_message(outcome.synced),
            post: outcome.post,
            synced: outcome.synced,
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn delete_post_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<PostIdRequest>,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }

    match state.repository.delete_post(&request.id).await {
        Ok(synced) => ApiResponse::ok(MessageResponse {
            message: if synced {
                "Post deleted".to_string()
            } else {
                "Post deleted locally (remote sync pending)".to_string()
            },
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

async fn set_status(state: &AppState, id: &str, status: PostStatus) -> Response {
    match state.repository.set_status(id, status).await {
        Ok(outcome) => ApiResponse::ok(SaveResponse {
            message: save_message(outcome.synced),
            post: outcome.post,
            synced: outcome.synced,
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn publish_post_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<PostIdRequest>,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }
    set_status(&state, &request.id, PostStatus::Published).await
}

pub async fn unpublish_post_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<PostIdRequest>,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }
    set_status(&state, &request.id, PostStatus::Draft).await
}

pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Result<ApiResponse<PostStats>, AdminError> {
    authorize_request(&state, &headers, query.token.as_deref()).await?;
    Ok(ApiResponse::ok(state.repository.stats().await))
}

pub async fn get_settings_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Result<ApiResponse<HashMap<String, String>>, AdminError> {
    authorize_request(&state, &headers, query.token.as_deref()).await?;
    Ok(ApiResponse::ok(state.settings.all().await))
}

pub async fn update_settings_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(updates): axum::Json<HashMap<String, String>>,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }

    match state.settings.update(updates).await {
        Ok(synced) => ApiResponse::ok(MessageResponse {
            message: if synced {
                "Settings saved".to_string()
            } else {
                "Settings saved locally (remote sync pending)".to_string()
            },
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn export_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Result<ApiResponse<PostsExport>, AdminError> {
    authorize_request(&state, &headers, query.token.as_deref()).await?;
    Ok(ApiResponse::ok(state.repository.export().await))
}

pub async fn import_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<serde_json::Value>,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }

    // Imports come from user-picked files; reject anything that is not the
    // `{posts: [...]}` interchange shape with a readable message.
    if !payload.get("posts").is_some_and(|p| p.is_array()) {
        return ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Invalid data format")
            .into_response();
    }
    let export: PostsExport = match serde_json::from_value(payload) {
        Ok(export) => export,
        Err(e) => {
            return ApiResponse::<()>::error(
                StatusCode::BAD_REQUEST,
                format!("Invalid data format: {e}"),
            )
            .into_response();
        }
    };

    match state.repository.import(export).await {
        Ok((count, synced)) => ApiResponse::ok(MessageResponse {
            message: if synced {
                format!("Imported {count} posts")
            } else {
                format!("Imported {count} posts locally (remote sync pending)")
            },
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}

pub async fn change_password_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ChangePasswordRequest>,
) -> Result<ApiResponse<MessageResponse>, AdminError> {
    authorize_request(&state, &headers, query.token.as_deref()).await?;

    if let Some(confirm) = &request.confirm_password
        && confirm != &request.new_password
    {
        return Ok(ApiResponse::error(
            StatusCode::BAD_REQUEST,
            "New passwords do not match",
        ));
    }

    state
        .sessions
        .change_password(&request.current_password, &request.new_password)
        .await?;

    Ok(ApiResponse::ok(MessageResponse {
        message: "Password changed".to_string(),
    }))
}

pub async fn refresh_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(e) = authorize_request(&state, &headers, query.token.as_deref()).await {
        return e.into_response();
    }

    match state.repository.refresh_from_remote().await {
        Ok(true) => ApiResponse::ok(MessageResponse {
            message: "Posts refreshed from remote store".to_string(),
        })
        .into_response(),
        Ok(false) => ApiResponse::ok(MessageResponse {
            message: "Remote store has no post data".to_string(),
        })
        .into_response(),
        Err(e) => store_error_response(e),
    }
}
