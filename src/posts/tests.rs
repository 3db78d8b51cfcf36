#[cfg(test)]
mod tests {
    use super::super::*;
    use chrono::{Duration, Utc};

    fn sample_post(id: &str, title: &str, category: &str, status: PostStatus, age_days: i64) -> Post {
        let date = Utc::now() - Duration::days(age_days);
        Post {
            id: id.to_string(),
            title: title.to_string(),
            content: format!("Content of {title}"),
            excerpt: String::new(),
            category: category.to_string(),
            tags: vec!["rust".to_string()],
            featured_image: String::new(),
            status,
            date,
            updated_at: date,
        }
    }

    fn sample_posts() -> Vec<Post> {
        vec![
            sample_post("a", "Oldest", "notes", PostStatus::Published, 30),
            sample_post("b", "Middle", "projects", PostStatus::Published, 10),
            sample_post("c", "Newest", "notes", PostStatus::Published, 1),
            sample_post("d", "Hidden Draft", "notes", PostStatus::Draft, 0),
        ]
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate_post_id();
        let b = generate_post_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_published_sorted_newest_first() {
        let posts = query::published(&sample_posts());
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].title, "Newest");
        assert_eq!(posts[2].title, "Oldest");
    }

    #[test]
    fn test_drafts_excluded_from_published() {
        let posts = query::published(&sample_posts());
        assert!(posts.iter().all(|p| p.status == PostStatus::Published));
    }

    #[test]
    fn test_by_category() {
        let posts = sample_posts();
        assert_eq!(query::by_category(&posts, "notes").len(), 2);
        assert_eq!(query::by_category(&posts, "projects").len(), 1);
        // "all" and empty mean no filter
        assert_eq!(query::by_category(&posts, "all").len(), 3);
        assert_eq!(query::by_category(&posts, "").len(), 3);
    }

    #[test]
    fn test_search_matches_title_and_tags() {
        let posts = sample_posts();
        assert_eq!(query::search(&posts, "newest").len(), 1);
        assert_eq!(query::search(&posts, "RUST").len(), 3);
        assert!(query::search(&posts, "nothing matches this").is_empty());
        // Draft content is never searchable
        assert!(query::search(&posts, "hidden").is_empty());
    }

    #[test]
    fn test_categories_are_sorted_and_distinct() {
        let categories = query::categories(&sample_posts());
        assert_eq!(categories, vec!["notes".to_string(), "projects".to_string()]);
    }

    #[test]
    fn test_related_same_category_excluding_self() {
        let posts = sample_posts();
        let current = posts[2].clone(); // "Newest", category notes
        let related = query::related(&posts, &current, 3);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].title, "Oldest");
    }

    #[test]
    fn test_stats() {
        let stats = query::stats(&sample_posts());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.published, 3);
        assert_eq!(stats.drafts, 1);
        assert_eq!(stats.categories, 2);
    }

    #[test]
    fn test_paginate_windows() {
        let posts: Vec<Post> = (0..25)
            .map(|i| sample_post(&format!("p{i}"), &format!("Post {i}"), "c", PostStatus::Published, i))
            .collect();

        let page1 = query::paginate(posts.clone(), 1, 9);
        assert_eq!(page1.items.len(), 9);
        assert_eq!(page1.total_pages, 3);
        assert_eq!(page1.start_item, 1);
        assert_eq!(page1.end_item, 9);

        let page3 = query::paginate(posts.clone(), 3, 9);
        assert_eq!(page3.items.len(), 7);
        assert_eq!(page3.end_item, 25);

        // Out-of-range pages clamp
        let clamped = query::paginate(posts, 99, 9);
        assert_eq!(clamped.page, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let page = query::paginate(Vec::new(), 1, 9);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.start_item, 0);
        assert_eq!(page.end_item, 0);
    }

    #[test]
    fn test_page_window() {
        assert_eq!(query::page_window(1, 10, 5), (1, 5));
        assert_eq!(query::page_window(5, 10, 5), (3, 7));
        assert_eq!(query::page_window(10, 10, 5), (6, 10));
        assert_eq!(query::page_window(1, 2, 5), (1, 2));
    }

    #[test]
    fn test_excerpt_prefers_stored() {
        let mut post = sample_post("a", "Title", "c", PostStatus::Published, 0);
        post.excerpt = "hand-written".to_string();
        assert_eq!(query::excerpt_of(&post), "hand-written");
    }

    #[test]
    fn test_excerpt_generated_strips_tags_and_truncates() {
        let mut post = sample_post("a", "Title", "c", PostStatus::Published, 0);
        post.excerpt = String::new();
        post.content = format!("<strong>{}</strong>", "word ".repeat(60));
        let excerpt = query::excerpt_of(&post);
        assert!(!excerpt.contains('<'));
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 153);
    }

    #[test]
    fn test_reading_time_floor_is_one_minute() {
        assert_eq!(query::reading_time_minutes("a few words"), 1);
        let long = "word ".repeat(450);
        assert_eq!(query::reading_time_minutes(&long), 3);
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let post = sample_post("a", "Title", "c", PostStatus::Published, 0);
        let json = serde_json::to_string(&post).unwrap();
        assert!(json.contains("\"featuredImage\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"status\":\"published\""));
    }
}
