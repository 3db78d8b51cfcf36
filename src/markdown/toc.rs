use regex::{Captures, Regex};
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h([23])>(.*?)</h[23]>").unwrap());
static TAG_STRIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, serde::Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Scan rendered post HTML for h2/h3 headings and build a table of
/// contents. Headings get a slug id and a trailing anchor link; the entry
/// list is returned in document order for the sidebar template.
///
/// With fewer than 2 headings the HTML is returned untouched and the entry
/// list is empty, which callers use to drop the sidebar entirely.
pub fn build_toc(html: &str) -> (String, Vec<TocEntry>) {
    if HEADING.find_iter(html).count() < 2 {
        return (html.to_string(), Vec::new());
    }

    let mut entries: Vec<TocEntry> = Vec::new();
    let rewritten = HEADING
        .replace_all(html, |caps: &Captures| {
            let level: u8 = if &caps[1] == "3" { 3 } else { 2 };
            let inner = caps[2].to_string();
            let text = TAG_STRIP.replace_all(&inner, "").trim().to_string();
            let id = heading_slug(&text, entries.len());
            let heading = format!(
                "<h{level} id=\"{id}\">{inner}<a class=\"anchor-link\" href=\"#{id}\">#</a></h{level}>"
            );
            entries.push(TocEntry { id, text, level });
            heading
        })
        .into_owned();

    (rewritten, entries)
}

/// Slug derivation: lowercase, strip everything but alphanumerics and
/// spaces, spaces to hyphens, cap at 50 chars, then a positional suffix so
/// duplicate headings still get unique anchors.
fn heading_slug(text: &str, index: usize) -> String {
    let lowered = text.to_lowercase();
    let filtered: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let mut slug = WHITESPACE_RUN
        .replace_all(filtered.trim(), "-")
        .into_owned();
    slug.truncate(50);
    format!("{slug}-{index}")
}
