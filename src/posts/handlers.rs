use super::query;
use super::types::Post;
use crate::AppState;
use crate::api::ApiResponse;
use crate::markdown;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

const RELATED_LIMIT: usize = 3;
const API_DEFAULT_LIMIT: usize = 10;
const API_MAX_LIMIT: usize = 50;
const PAGINATION_WINDOW: usize = 5;

/// Liquid view of a post card, shared by the home page, the blog index,
/// and the related-posts strip.
fn post_card(post: &Post, url_prefix: &str) -> liquid::model::Value {
    liquid::model::Value::Object(liquid::object!({
        "id": post.id.clone(),
        "title": post.title.clone(),
        "excerpt": query::excerpt_of(post),
        "category": post.category.clone(),
        "tags": post.tags.clone(),
        "featured_image": post.featured_image.clone(),
        "url": format!("{}/{}", url_prefix, post.id),
        "date": post.date.to_rfc3339(),
        "date_formatted": post.date.format("%b %-d, %Y").to_string(),
        "reading_time": query::reading_time_minutes(&post.content),
    }))
}

fn settings_object(values: &std::collections::HashMap<String, String>) -> liquid::model::Value {
    let mut object = liquid::Object::new();
    for (key, value) in values {
        object.insert(key.clone().into(), liquid::model::Value::scalar(value.clone()));
    }
    liquid::model::Value::Object(object)
}

/// GET / - the home page with the latest published posts.
pub async fn home_handler(State(state): State<AppState>) -> Response {
    let config = &state.config.blog;
    let latest: Vec<_> = state
        .repository
        .published()
        .await
        .iter()
        .take(config.latest_limit)
        .map(|post| post_card(post, &config.url_prefix))
        .collect();

    let settings = state.settings.all().await;
    let globals = liquid::object!({
        "latest_posts": latest,
        "page_title": state.config.app.name.clone(),
        "settings": settings_object(&settings),
        "url_prefix": config.url_prefix.clone(),
    });

    match state
        .template_engine
        .render_template(&config.home_template, globals)
        .await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct BlogQuery {
    page: Option<usize>,
    category: Option<String>,
    q: Option<String>,
}

/// GET /blog - the paginated, filterable post listing.
pub async fn blog_index_handler(
    State(state): State<AppState>,
    Query(params): Query<BlogQuery>,
) -> Response {
    let config = &state.config.blog;
    let all = state.repository.all_posts().await;

    let category = params.category.unwrap_or_default();
    let search_query = params.q.unwrap_or_default();

    let filtered = if !search_query.is_empty() {
        query::search(&all, &search_query)
    } else {
        query::by_category(&all, &category)
    };

    let page = query::paginate(filtered, params.page.unwrap_or(1), config.posts_per_page);
    let (window_start, window_end) =
        query::page_window(page.page, page.total_pages, PAGINATION_WINDOW);

    let cards: Vec<_> = page
        .items
        .iter()
        .map(|post| post_card(post, &config.url_prefix))
        .collect();
    let pages: Vec<usize> = (window_start..=window_end).collect();

    let globals = liquid::object!({
        "posts": cards,
        "categories": query::categories(&all),
        "current_category": category,
        "search_query": search_query,
        "current_page": page.page,
        "total_pages": page.total_pages,
        "total_posts": page.total_posts,
        "has_prev": page.page > 1,
        "has_next": page.page < page.total_pages,
        "prev_page": page.page.saturating_sub(1).max(1),
        "next_page": (page.page + 1).min(page.total_pages),
        "pages": pages,
        "window_has_leading_gap": window_start > 1,
        "window_has_trailing_gap": window_end < page.total_pages,
        "showing_start": page.start_item,
        "showing_end": page.end_item,
        "page_title": "Blog",
        "meta_description": "Browse blog posts",
        "url_prefix": config.url_prefix.clone(),
    });

    match state
        .template_engine
        .render_template(&config.index_template, globals)
        .await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// GET /blog/{id} - a single published post, rendered from its markdown
/// body, with table of contents entries and related posts.
pub async fn post_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let config = &state.config.blog;

    let Some(post) = state.repository.published_post(&id).await else {
        return (StatusCode::NOT_FOUND, "Post not found").into_response();
    };

    let rendered = markdown::render(&post.content);
    let (html_content, toc) = markdown::build_toc(&rendered);

    let toc_entries: Vec<_> = toc
        .iter()
        .map(|entry| {
            liquid::model::Value::Object(liquid::object!({
                "id": entry.id.clone(),
                "text": entry.text.clone(),
                "level": entry.level as i64,
            }))
        })
        .collect();

    let related: Vec<_> = state
        .repository
        .related(&post, RELATED_LIMIT)
        .await
        .iter()
        .map(|p| post_card(p, &config.url_prefix))
        .collect();

    let base_url = state
        .config
        .app
        .base_url
        .as_deref()
        .unwrap_or("http://localhost:8080");
    let full_url = format!("{}{}/{}", base_url, config.url_prefix, post.id);
    let excerpt = query::excerpt_of(&post);

    let globals = liquid::object!({
        "post": {
            "id": post.id,
            "title": post.title.clone(),
            "category": post.category,
            "tags": post.tags,
            "featured_image": post.featured_image,
            "status": post.status.as_str(),
            "date": post.date.to_rfc3339(),
            "date_formatted": post.date.format("%B %-d, %Y").to_string(),
            "reading_time": query::reading_time_minutes(&post.content),
            "excerpt": excerpt.clone(),
            "html_content": html_content,
        },
        "toc": toc_entries,
        "has_toc": !toc.is_empty(),
        "related_posts": related,
        "url_prefix": config.url_prefix.clone(),
        "page_title": post.title.clone(),
        "meta_description": excerpt.clone(),
        "og_title": post.title,
        "og_description": excerpt,
        "og_url": full_url,
        "og_type": "article",
        "article_published_time": post.date.to_rfc3339(),
    });

    match state
        .template_engine
        .render_template(&config.post_template, globals)
        .await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct PostsApiQuery {
    page: Option<usize>,
    limit: Option<usize>,
    category: Option<String>,
    q: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsPageResponse {
    posts: Vec<Post>,
    page: usize,
    total_pages: usize,
    total: usize,
}

/// GET /api/posts - published posts as JSON, same filters as the page.
pub async fn api_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PostsApiQuery>,
) -> ApiResponse<PostsPageResponse> {
    let all = state.repository.all_posts().await;

    let filtered = match (&params.q, &params.category) {
        (Some(q), _) if !q.is_empty() => query::search(&all, q),
        (_, Some(category)) => query::by_category(&all, category),
        _ => query::published(&all),
    };

    let limit = params
        .limit
        .unwrap_or(API_DEFAULT_LIMIT)
        .min(API_MAX_LIMIT);
    let page = query::paginate(filtered, params.page.unwrap_or(1), limit);

    ApiResponse::ok(PostsPageResponse {
        posts: page.items,
        page: page.page,
        total_pages: page.total_pages,
        total: page.total_posts,
    })
}

/// GET /api/posts/{id} - a single published post as JSON.
pub async fn api_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<Post> {
    match state.repository.published_post(&id).await {
        Some(post) => ApiResponse::ok(post),
        None => ApiResponse::error(StatusCode::NOT_FOUND, "Post not found"),
    }
}
