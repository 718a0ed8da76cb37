//! HTML views
//!
//! Pages are plain Rust string templates. Every value that came from a
//! request or an upstream API goes through [`escape_html`] before it is
//! interpolated.

mod pages;

pub use pages::{
    animal_facts, compliments_form, compliments_results, gif_search, home, image_filter,
    GifSearchView,
};

use std::fmt::Write;

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Wrap page content in the shared document shell and navigation
fn layout(title: &str, content: &str) -> String {
    let mut page = String::with_capacity(content.len() + 1024);
    let _ = write!(
        page,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            line-height: 1.6;
            max-width: 760px;
            margin: 0 auto;
            padding: 24px;
            color: #1f2937;
        }}
        nav a {{ margin-right: 12px; color: #4f46e5; text-decoration: none; font-weight: 600; }}
        nav a:hover {{ text-decoration: underline; }}
        form {{ margin: 16px 0; }}
        label {{ display: block; margin: 8px 0 4px; }}
        .error {{ color: #b91c1c; font-weight: 600; }}
        .gifs {{ display: flex; flex-wrap: wrap; gap: 8px; }}
        .gifs img {{ max-width: 220px; border-radius: 6px; }}
    </style>
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/compliments">Compliments</a>
        <a href="/animal_facts">Animal Facts</a>
        <a href="/image_filter">Image Filter</a>
        <a href="/gif_search">GIF Search</a>
    </nav>
    <h1>{title}</h1>
{content}
</body>
</html>"#,
        title = escape_html(title),
    );
    page
}

/// Render an optional error paragraph
fn error_block(error: Option<&str>) -> String {
    error.map_or_else(String::new, |e| {
        format!("    <p class=\"error\">{}</p>\n", escape_html(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_layout_escapes_title() {
        let page = layout("<b>", "<p>body</p>");
        assert!(page.contains("<title>&lt;b&gt;</title>"));
        assert!(page.contains("<p>body</p>"));
        assert!(page.contains(r#"<a href="/gif_search">"#));
    }

    #[test]
    fn test_error_block() {
        assert_eq!(error_block(None), "");
        assert!(error_block(Some("bad <input>")).contains("bad &lt;input&gt;"));
    }
}
