use regex::{Captures, Regex};
use std::sync::LazyLock;

static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static H6: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{6}\s+(.+)$").unwrap());
static H5: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{5}\s+(.+)$").unwrap());
static H4: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{4}\s+(.+)$").unwrap());
static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^###\s+(.+)$").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##\s+(.+)$").unwrap());
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").unwrap());
static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^&gt;\s*(.+)$").unwrap());
static HORIZONTAL_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^-{3,}$").unwrap());
static BOLD_ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*\*(.+?)\*\*\*").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.+?)_").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static TABLE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"((?:\|[^\n]+\|\n?)+)").unwrap());
static TABLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|[-:|]+\|$").unwrap());
static UNORDERED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)((?:^[-*+]\s.+\n?)+)").unwrap());
static UNORDERED_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*+]\s").unwrap());
static ORDERED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)((?:^\d+\.\s.+\n?)+)").unwrap());
static ORDERED_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s").unwrap());
static PARAGRAPH_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());
static BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(h[1-6]|ul|ol|li|blockquote|pre|table|hr|div|p)").unwrap());

/// Render a restricted markdown dialect to HTML.
///
/// This is a fixed sequence of substitution passes, each running on the
/// output of the previous one. The order is load-bearing: the escape pass
/// runs first so every angle bracket left in the text afterwards was
/// inserted by the renderer itself, fenced code runs before inline code so
/// backticks inside a fence are not treated as inline delimiters, and the
/// longest emphasis/heading markers are consumed before their shorter
/// prefixes. Total function: never fails, empty input yields empty output.
///
/// Re-rendering already-rendered output re-escapes the produced tags; this
/// is not a round-trip transform.
pub fn render(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let mut html = escape_html(markdown);

    html = FENCED_CODE
        .replace_all(&html, |caps: &Captures| {
            let lang = if caps[1].is_empty() { "text" } else { &caps[1] };
            format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                lang,
                caps[2].trim()
            )
        })
        .into_owned();

    html = INLINE_CODE.replace_all(&html, "<code>$1</code>").into_owned();

    html = H6.replace_all(&html, "<h6>$1</h6>").into_owned();
    html = H5.replace_all(&html, "<h5>$1</h5>").into_owned();
    html = H4.replace_all(&html, "<h4>$1</h4>").into_owned();
    html = H3.replace_all(&html, "<h3>$1</h3>").into_owned();
    html = H2.replace_all(&html, "<h2>$1</h2>").into_owned();
    html = H1.replace_all(&html, "<h1>$1</h1>").into_owned();

    html = BLOCKQUOTE
        .replace_all(&html, "<blockquote>$1</blockquote>")
        .into_owned();

    html = HORIZONTAL_RULE.replace_all(&html, "<hr>").into_owned();

    html = BOLD_ITALIC
        .replace_all(&html, "<strong><em>$1</em></strong>")
        .into_owned();
    html = BOLD.replace_all(&html, "<strong>$1</strong>").into_owned();
    html = ITALIC.replace_all(&html, "<em>$1</em>").into_owned();
    html = ITALIC_UNDERSCORE.replace_all(&html, "<em>$1</em>").into_owned();

    // Images before links: the link pattern would otherwise consume the
    // bracketed part of an image and leave a stray bang behind.
    html = IMAGE
        .replace_all(&html, "<img src=\"$2\" alt=\"$1\" loading=\"lazy\">")
        .into_owned();
    html = LINK
        .replace_all(&html, "<a href=\"$2\" rel=\"noopener\">$1</a>")
        .into_owned();

    html = wrap_tables(&html);
    html = wrap_unordered_lists(&html);
    html = wrap_ordered_lists(&html);

    wrap_paragraphs(&html)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn is_table_separator(row: &str) -> bool {
    let stripped: String = row.chars().filter(|c| *c != ' ').collect();
    TABLE_SEPARATOR.is_match(&stripped)
}

fn wrap_tables(html: &str) -> String {
    TABLE_RUN
        .replace_all(html, |caps: &Captures| {
            let block = &caps[1];
            let rows: Vec<&str> = block
                .trim()
                .lines()
                .filter(|row| !row.trim().is_empty())
                .collect();
            if rows.len() < 2 {
                return block.to_string();
            }

            let mut out = String::from("<table>");
            let mut in_body = false;
            for (i, row) in rows.iter().enumerate() {
                if is_table_separator(row) {
                    in_body = true;
                    continue;
                }

                if !in_body && i == 0 {
                    out.push_str("<thead><tr>");
                } else if in_body && i > 0 && is_table_separator(rows[i - 1]) {
                    out.push_str("</thead><tbody><tr>");
                } else {
                    out.push_str("<tr>");
                }

                let parts: Vec<&str> = row.split('|').collect();
                let tag = if in_body { "td" } else { "th" };
                for cell in &parts[1..parts.len().saturating_sub(1)] {
                    out.push_str(&format!("<{tag}>{}</{tag}>", cell.trim()));
                }
                out.push_str("</tr>");
            }
            out.push_str(if in_body { "</tbody>" } else { "</thead>" });
            out.push_str("</table>");
            out
        })
        .into_owned()
}

fn wrap_unordered_lists(html: &str) -> String {
    UNORDERED_RUN
        .replace_all(html, |caps: &Captures| {
            let mut out = String::from("<ul>");
            for line in caps[1].trim().lines().filter(|l| !l.trim().is_empty()) {
                out.push_str("<li>");
                out.push_str(&UNORDERED_MARKER.replace(line, ""));
                out.push_str("</li>");
            }
            out.push_str("</ul>");
            out
        })
        .into_owned()
}

fn wrap_ordered_lists(html: &str) -> String {
    ORDERED_RUN
        .replace_all(html, |caps: &Captures| {
            let mut out = String::from("<ol>");
            for line in caps[1].trim().lines().filter(|l| !l.trim().is_empty()) {
                out.push_str("<li>");
                out.push_str(&ORDERED_MARKER.replace(line, ""));
                out.push_str("</li>");
            }
            out.push_str("</ol>");
            out
        })
        .into_owned()
}

fn wrap_paragraphs(html: &str) -> String {
    PARAGRAPH_SPLIT
        .split(html)
        .filter_map(|block| {
            let block = block.trim();
            if block.is_empty() {
                return None;
            }
            if BLOCK_TAG.is_match(block) {
                Some(block.to_string())
            } else {
                Some(format!("<p>{}</p>", block.replace('\n', "<br>")))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
