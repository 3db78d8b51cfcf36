use axum_test::TestServer;
use chrono::{Duration, Utc};
use kiji::posts::{Post, PostStatus};
use kiji::store::PostsBlob;
use kiji::{Config, admin::SessionStore, create_app};
use std::fs;
use tempfile::TempDir;

fn test_config(temp_dir: &TempDir) -> Config {
    let templates_dir = temp_dir.path().join("templates");
    let static_dir = temp_dir.path().join("static");
    let data_dir = temp_dir.path().join("data");

    fs::create_dir_all(&templates_dir).unwrap();
    fs::create_dir_all(&static_dir).unwrap();
    fs::create_dir_all(&data_dir).unwrap();

    let header_content = r#"<!DOCTYPE html>
<html>
<head>
    <title>{% if page_title != "" %}{{ page_title }} - {% endif %}Test Site</title>
</head>
<body>
    <header><h1>Test Site</h1></header>
    <main>"#;
    fs::write(templates_dir.join("_header.html.liquid"), header_content).unwrap();

    let footer_content = r#"    </main>
    <footer><p>&copy; {{ current_year }} Test</p></footer>
</body>
</html>"#;
    fs::write(templates_dir.join("_footer.html.liquid"), footer_content).unwrap();

    let home_content = r#"{{ header }}
<section class="latest">
{% for post in latest_posts %}
    <article><a href="{{ post.url }}">{{ post.title }}</a></article>
{% endfor %}
</section>
{{ footer }}"#;
    fs::write(templates_dir.join("index.html.liquid"), home_content).unwrap();

    let blog_content = r#"{{ header }}
<h1>Blog</h1>
<div class="posts">
{% for post in posts %}
    <article>
        <h2><a href="{{ post.url }}">{{ post.title }}</a></h2>
        <time>{{ post.date_formatted }}</time>
        <span>{{ post.reading_time }} min read</span>
        <p>{{ post.excerpt }}</p>
    </article>
{% endfor %}
</div>
{% if total_pages > 1 %}
<nav class="pagination">
    {% if has_prev %}<a href="?page={{ prev_page }}">Previous</a>{% endif %}
    <span>Page {{ current_page }} of {{ total_pages }}</span>
    {% if has_next %}<a href="?page={{ next_page }}">Next</a>{% endif %}
    <span>Showing {{ showing_start }}-{{ showing_end }} of {{ total_posts }} posts</span>
</nav>
{% endif %}
{{ footer }}"#;
    fs::write(templates_dir.join("blog.html.liquid"), blog_content).unwrap();

    let post_content = r##"{{ header }}
<article>
    <h1>{{ post.title }}</h1>
    <time>{{ post.date_formatted }}</time>
    {% if has_toc %}
    <aside class="toc">
        {% for entry in toc %}<a href="#{{ entry.id }}">{{ entry.text }}</a>{% endfor %}
    </aside>
    {% endif %}
    <div class="content">{{ post.html_content }}</div>
</article>
{% if related_posts.size > 0 %}
<section class="related">
{% for post in related_posts %}<a href="{{ post.url }}">{{ post.title }}</a>{% endfor %}
</section>
{% endif %}
{{ footer }}"##;
    fs::write(templates_dir.join("post.html.liquid"), post_content).unwrap();

    let about_content = r#"{{ header }}
<h1>About me</h1>
{{ footer }}"#;
    fs::write(templates_dir.join("about.html.liquid"), about_content).unwrap();

    let mut config = Config::default();
    config.app.name = "TestServer".to_string();
    config.app.base_url = Some("http://localhost:8080".to_string());
    config.templates.directory = templates_dir;
    config.static_files.directory = static_dir;
    config.store.data_directory = data_dir;
    config.store.refresh_interval_minutes = None;
    config.admin.password_sha256 = SessionStore::hash_password("test-password");
    config
}

fn make_post(id: &str, title: &str, content: &str, category: &str, status: PostStatus, age_days: i64) -> Post {
    let date = Utc::now() - Duration::days(age_days);
    Post {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        excerpt: String::new(),
        category: category.to_string(),
        tags: vec!["testing".to_string()],
        featured_image: String::new(),
        status,
        date,
        updated_at: date,
    }
}

fn seed_posts(config: &Config, posts: Vec<Post>) {
    let blob = PostsBlob {
        posts,
        last_updated: Utc::now(),
    };
    fs::write(
        config.store.data_directory.join("blog_posts.json"),
        serde_json::to_string_pretty(&blob).unwrap(),
    )
    .unwrap();
}

async fn setup_server_with_posts(posts: Vec<Post>) -> (TempDir, TestServer) {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    seed_posts(&config, posts);

    let app = create_app(config).await;
    let server = TestServer::new(app.into_make_service()).unwrap();
    (temp_dir, server)
}

#[tokio::test]
async fn test_blog_index_lists_published_posts() {
    let (_temp_dir, server) = setup_server_with_posts(vec![
        make_post("old", "Older Post", "Some body", "notes", PostStatus::Published, 5),
        make_post("new", "Newer Post", "Some body", "notes", PostStatus::Published, 1),
        make_post("hidden", "Secret Draft", "Some body", "notes", PostStatus::Draft, 0),
    ])
    .await;

    let response = server.get("/blog").await;
    response.assert_status_ok();
    let html = response.text();

    assert!(html.contains("<title>Blog - Test Site</title>"));
    assert!(html.contains("Newer Post"));
    assert!(html.contains("Older Post"));
    assert!(!html.contains("Secret Draft"));

    // Newest first
    let newer = html.find("Newer Post").unwrap();
    let older = html.find("Older Post").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn test_home_page_shows_latest_three() {
    let posts: Vec<Post> = (0..5)
        .map(|i| {
            make_post(
                &format!("p{i}"),
                &format!("Post number {i}"),
                "body",
                "notes",
                PostStatus::Published,
                i,
            )
        })
        .collect();
    let (_temp_dir, server) = setup_server_with_posts(posts).await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();

    assert!(html.contains("Post number 0"));
    assert!(html.contains("Post number 2"));
    assert!(!html.contains("Post number 3"));
}

#[tokio::test]
async fn test_post_detail_renders_markdown() {
    let body = "# Welcome\n\nThis is **bold** and `code`.\n\n- first\n- second";
    let (_temp_dir, server) = setup_server_with_posts(vec![make_post(
        "md-post",
        "Markdown Post",
        body,
        "notes",
        PostStatus::Published,
        1,
    )])
    .await;

    let response = server.get("/blog/md-post").await;
    response.assert_status_ok();
    let html = response.text();

    assert!(html.contains("<title>Markdown Post - Test Site</title>"));
    assert!(html.contains("<h1>Welcome</h1>"));
    assert!(html.contains("<strong>bold</strong>"));
    assert!(html.contains("<code>code</code>"));
    assert!(html.contains("<li>first</li>"));
}

#[tokio::test]
async fn test_post_detail_escapes_raw_html() {
    let (_temp_dir, server) = setup_server_with_posts(vec![make_post(
        "xss",
        "Sneaky Post",
        "hello <script>alert(1)</script>",
        "notes",
        PostStatus::Published,
        1,
    )])
    .await;

    let html = server.get("/blog/xss").await.text();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>alert"));
}

#[tokio::test]
async fn test_post_detail_toc() {
    let body = "intro\n\n## First Section\n\ntext\n\n## Second Section\n\nmore text";
    let (_temp_dir, server) = setup_server_with_posts(vec![make_post(
        "toc-post",
        "Sectioned",
        body,
        "notes",
        PostStatus::Published,
        1,
    )])
    .await;

    let html = server.get("/blog/toc-post").await.text();
    assert!(html.contains(r##"<a href="#first-section-0">First Section</a>"##));
    assert!(html.contains(r#"<h2 id="second-section-1">"#));
}

#[tokio::test]
async fn test_post_detail_skips_toc_for_single_heading() {
    let body = "intro\n\n## Only Section\n\ntext";
    let (_temp_dir, server) = setup_server_with_posts(vec![make_post(
        "no-toc",
        "Flat",
        body,
        "notes",
        PostStatus::Published,
        1,
    )])
    .await;

    let html = server.get("/blog/no-toc").await.text();
    assert!(!html.contains("class=\"toc\""));
    assert!(html.contains("<h2>Only Section</h2>"));
}

#[tokio::test]
async fn test_post_detail_related_posts() {
    let (_temp_dir, server) = setup_server_with_posts(vec![
        make_post("a", "Main Post", "body", "rust", PostStatus::Published, 1),
        make_post("b", "Related Post", "body", "rust", PostStatus::Published, 2),
        make_post("c", "Unrelated Post", "body", "cooking", PostStatus::Published, 3),
    ])
    .await;

    let html = server.get("/blog/a").await.text();
    assert!(html.contains("Related Post"));
    assert!(!html.contains("Unrelated Post"));
}

#[tokio::test]
async fn test_drafts_and_missing_posts_are_404() {
    let (_temp_dir, server) = setup_server_with_posts(vec![make_post(
        "draft",
        "Draft Post",
        "body",
        "notes",
        PostStatus::Draft,
        1,
    )])
    .await;

    server.get("/blog/draft").await.assert_status_not_found();
    server.get("/blog/nope").await.assert_status_not_found();
}

#[tokio::test]
async fn test_blog_pagination() {
    let posts: Vec<Post> = (0..12)
        .map(|i| {
            make_post(
                &format!("p{i}"),
                &format!("Numbered {i}"),
                "body",
                "notes",
                PostStatus::Published,
                i,
            )
        })
        .collect();
    let (_temp_dir, server) = setup_server_with_posts(posts).await;

    let html = server.get("/blog").await.text();
    assert!(html.contains("Page 1 of 2"));
    assert!(html.contains(r#"<a href="?page=2">Next</a>"#));
    assert!(!html.contains("Previous"));
    assert!(html.contains("Showing 1-9 of 12 posts"));

    let html = server.get("/blog").add_query_param("page", 2).await.text();
    assert!(html.contains("Page 2 of 2"));
    assert!(html.contains(r#"<a href="?page=1">Previous</a>"#));
    assert!(!html.contains("Next</a>"));
    assert!(html.contains("Showing 10-12 of 12 posts"));
}

#[tokio::test]
async fn test_blog_category_filter_and_search() {
    let (_temp_dir, server) = setup_server_with_posts(vec![
        make_post("a", "Rust Tricks", "ownership", "rust", PostStatus::Published, 1),
        make_post("b", "Bread Baking", "sourdough", "cooking", PostStatus::Published, 2),
    ])
    .await;

    let html = server
        .get("/blog")
        .add_query_param("category", "rust")
        .await
        .text();
    assert!(html.contains("Rust Tricks"));
    assert!(!html.contains("Bread Baking"));

    let html = server.get("/blog").add_query_param("q", "sourdough").await.text();
    assert!(html.contains("Bread Baking"));
    assert!(!html.contains("Rust Tricks"));
}

#[tokio::test]
async fn test_public_posts_api() {
    let (_temp_dir, server) = setup_server_with_posts(vec![
        make_post("a", "Visible", "body", "notes", PostStatus::Published, 1),
        make_post("b", "Invisible", "body", "notes", PostStatus::Draft, 2),
    ])
    .await;

    let response = server.get("/api/posts").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Visible");
    assert_eq!(posts[0]["status"], "published");

    let response = server.get("/api/posts/b").await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_custom_stylesheet_served() {
    let (_temp_dir, server) = setup_server_with_posts(Vec::new()).await;

    let response = server.get("/custom.css").await;
    response.assert_status_ok();
    let css = response.text();
    assert!(css.contains("--color-primary: #0071e3;"));
}

#[tokio::test]
async fn test_robots_txt() {
    let (_temp_dir, server) = setup_server_with_posts(Vec::new()).await;

    let response = server.get("/robots.txt").await;
    response.assert_status_ok();
    assert!(response.text().contains("User-agent: *"));
}

#[tokio::test]
async fn test_plain_template_page() {
    let (_temp_dir, server) = setup_server_with_posts(Vec::new()).await;

    let response = server.get("/about").await;
    response.assert_status_ok();
    assert!(response.text().contains("About me"));

    server.get("/no-such-page").await.assert_status_not_found();
}
