#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_heading() {
        let html = render("# Hello");
        assert!(html.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn test_all_heading_levels() {
        let html = render("# One\n\n## Two\n\n### Three\n\n#### Four\n\n##### Five\n\n###### Six");
        assert!(html.contains("<h1>One</h1>"));
        assert!(html.contains("<h2>Two</h2>"));
        assert!(html.contains("<h3>Three</h3>"));
        assert!(html.contains("<h4>Four</h4>"));
        assert!(html.contains("<h5>Five</h5>"));
        assert!(html.contains("<h6>Six</h6>"));
        // The single-# rule must not have partially eaten the longer prefixes
        assert!(!html.contains("<h1>#"));
    }

    #[test]
    fn test_emphasis() {
        let html = render("**bold** and *italic*");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn test_triple_asterisk_consumed_first() {
        let html = render("***both***");
        assert!(html.contains("<strong><em>both</em></strong>"));
    }

    #[test]
    fn test_underscore_italic() {
        let html = render("_quiet_");
        assert!(html.contains("<em>quiet</em>"));
    }

    #[test]
    fn test_unordered_list() {
        let html = render("- a\n- b");
        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);
        let a = html.find("<li>a</li>").unwrap();
        let b = html.find("<li>b</li>").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_list_terminated_by_blank_line() {
        let html = render("- a\n- b\n\n- c");
        assert_eq!(html.matches("<ul>").count(), 2);
    }

    #[test]
    fn test_ordered_list() {
        let html = render("1. first\n2. second");
        assert_eq!(html.matches("<ol>").count(), 1);
        assert!(html.contains("<li>first</li>"));
        assert!(html.contains("<li>second</li>"));
    }

    #[test]
    fn test_table() {
        let html = render("| A | B |\n| - | - |\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<thead><tr><th>A</th><th>B</th></tr>"));
        assert!(html.contains("<tbody><tr><td>1</td><td>2</td></tr>"));
        assert_eq!(html.matches("<th>").count(), 2);
        assert_eq!(html.matches("<td>").count(), 2);
    }

    #[test]
    fn test_single_table_row_left_alone() {
        let html = render("| just one row |");
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_script_is_escaped() {
        let html = render("<script>alert(1)</script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_plain_text_single_paragraph() {
        let html = render("just some text\nwith a soft break");
        assert_eq!(html.matches("<p>").count(), 1);
        assert!(html.contains("with a soft break"));
        assert!(html.contains("<br>"));
    }

    #[test]
    fn test_not_idempotent() {
        let once = render("# Hello");
        let twice = render(&once);
        assert!(twice.contains("&lt;h1&gt;"));
        assert!(!twice.contains("<h1>"));
    }

    #[test]
    fn test_fenced_code_block() {
        let html = render("```rust\nlet x = 1;\n```");
        assert!(html.contains("<pre><code class=\"language-rust\">let x = 1;</code></pre>"));
    }

    #[test]
    fn test_fenced_code_without_language() {
        let html = render("```\nplain\n```");
        assert!(html.contains("class=\"language-text\""));
    }

    #[test]
    fn test_fence_delimiters_not_inline_code() {
        let html = render("```\nplain text\n```");
        // The fence pass consumed the triple backticks before the inline
        // pass could pair them up
        assert_eq!(html.matches("<code").count(), 1);
        assert!(html.contains("<pre><code"));
    }

    #[test]
    fn test_inline_code() {
        let html = render("use `let` here");
        assert!(html.contains("<code>let</code>"));
    }

    #[test]
    fn test_blockquote_lines_are_individual() {
        let html = render("> one\n> two");
        assert_eq!(html.matches("<blockquote>").count(), 2);
    }

    #[test]
    fn test_horizontal_rule() {
        let html = render("above\n\n---\n\nbelow");
        assert!(html.contains("<hr>"));
    }

    #[test]
    fn test_link() {
        let html = render("[site](https://example.com)");
        assert!(html.contains("<a href=\"https://example.com\" rel=\"noopener\">site</a>"));
    }

    #[test]
    fn test_image() {
        let html = render("![alt text](https://example.com/a.png)");
        assert!(
            html.contains("<img src=\"https://example.com/a.png\" alt=\"alt text\" loading=\"lazy\">")
        );
        assert!(!html.contains('!'));
    }

    #[test]
    fn test_ampersand_escaped_once() {
        let html = render("fish & chips");
        assert!(html.contains("fish &amp; chips"));
        assert!(!html.contains("&amp;amp;"));
    }

    #[test]
    fn test_block_elements_not_rewrapped() {
        let html = render("# Title\n\nA paragraph.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(!html.contains("<p><h1>"));
        assert!(html.contains("<p>A paragraph.</p>"));
    }

    #[test]
    fn test_toc_skipped_below_threshold() {
        let html = render("## Only one");
        let (rewritten, entries) = build_toc(&html);
        assert_eq!(rewritten, html);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_toc_entries_and_ids() {
        let html = render("## Intro\n\nsome text\n\n### Deep Dive!\n\nmore text");
        let (rewritten, entries) = build_toc(&html);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "intro-0");
        assert_eq!(entries[0].level, 2);
        assert_eq!(entries[1].id, "deep-dive-1");
        assert_eq!(entries[1].level, 3);
        assert!(rewritten.contains("<h2 id=\"intro-0\">"));
        assert!(rewritten.contains("href=\"#deep-dive-1\""));
    }

    #[test]
    fn test_toc_duplicate_headings_get_unique_ids() {
        let html = render("## Setup\n\ntext\n\n## Setup\n\ntext");
        let (_, entries) = build_toc(&html);
        assert_eq!(entries[0].id, "setup-0");
        assert_eq!(entries[1].id, "setup-1");
    }

    #[test]
    fn test_toc_long_heading_truncated() {
        let long = "## This is an extremely long heading that just keeps going and going forever\n\n## Short";
        let (_, entries) = build_toc(&render(long));
        // 50 chars of slug plus the positional suffix
        assert!(entries[0].id.len() <= 52);
    }
}
