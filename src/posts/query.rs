use super::types::{Post, PostStatus};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

const EXCERPT_LENGTH: usize = 150;
const WORDS_PER_MINUTE: usize = 200;

/// Published posts, newest first.
pub fn published(posts: &[Post]) -> Vec<Post> {
    let mut out: Vec<Post> = posts
        .iter()
        .filter(|p| p.status == PostStatus::Published)
        .cloned()
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

pub fn by_category(posts: &[Post], category: &str) -> Vec<Post> {
    if category.is_empty() || category == "all" {
        return published(posts);
    }
    published(posts)
        .into_iter()
        .filter(|p| p.category == category)
        .collect()
}

/// Case-insensitive search over title, content, excerpt, and tags.
pub fn search(posts: &[Post], query: &str) -> Vec<Post> {
    let needle = query.to_lowercase();
    published(posts)
        .into_iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.content.to_lowercase().contains(&needle)
                || p.excerpt.to_lowercase().contains(&needle)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect()
}

/// The distinct categories across all posts, sorted.
pub fn categories(posts: &[Post]) -> Vec<String> {
    posts
        .iter()
        .filter(|p| !p.category.is_empty())
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Other published posts in the same category, newest first.
pub fn related(posts: &[Post], current: &Post, limit: usize) -> Vec<Post> {
    published(posts)
        .into_iter()
        .filter(|p| p.id != current.id && p.category == current.category)
        .take(limit)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PostStats {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
    pub categories: usize,
}

pub fn stats(posts: &[Post]) -> PostStats {
    let published_count = posts
        .iter()
        .filter(|p| p.status == PostStatus::Published)
        .count();
    PostStats {
        total: posts.len(),
        published: published_count,
        drafts: posts.len() - published_count,
        categories: categories(posts).len(),
    }
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub items: Vec<Post>,
    /// 1-based page number, clamped into range.
    pub page: usize,
    pub total_pages: usize,
    pub total_posts: usize,
    /// 1-based positions of the first and last item shown.
    pub start_item: usize,
    pub end_item: usize,
}

pub fn paginate(posts: Vec<Post>, page: usize, per_page: usize) -> PageView {
    let per_page = per_page.max(1);
    let total_posts = posts.len();
    let total_pages = total_posts.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_posts);
    let items = posts
        .into_iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect();

    PageView {
        items,
        page,
        total_pages,
        total_posts,
        start_item: if total_posts == 0 { 0 } else { start + 1 },
        end_item: end,
    }
}

/// The range of numbered page links to show around the current page.
pub fn page_window(current: usize, total: usize, max_visible: usize) -> (usize, usize) {
    let start = current.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total);
    let start = if end - start < max_visible - 1 {
        end.saturating_sub(max_visible - 1).max(1)
    } else {
        start
    };
    (start, end)
}

pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

/// The stored excerpt, or one derived from the post body: tags stripped,
/// truncated with an ellipsis.
pub fn excerpt_of(post: &Post) -> String {
    if !post.excerpt.is_empty() {
        return post.excerpt.clone();
    }
    let text = strip_tags(&post.content);
    if text.chars().count() > EXCERPT_LENGTH {
        let truncated: String = text.chars().take(EXCERPT_LENGTH).collect();
        format!("{truncated}...")
    } else {
        text
    }
}

/// Estimated reading time in whole minutes, never zero.
pub fn reading_time_minutes(content: &str) -> usize {
    let words = strip_tags(content).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}
