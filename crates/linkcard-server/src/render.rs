//! Server-side rendering of the read-only profile card.
//!
//! All snapshot text is HTML-escaped before it is placed in the page;
//! link URLs are additionally restricted to http(s), mailto and relative
//! targets.

use linkcard_core::{Link, Snapshot};

const STYLE: &str = r#"
body { margin: 0; min-height: 100vh; display: flex; align-items: center; justify-content: center;
       font-family: system-ui, sans-serif; background: linear-gradient(135deg, #46B3E0, #B8E9F6); }
.card { background: rgba(255,255,255,0.9); border-radius: 12px; padding: 24px; width: 100%; max-width: 28rem; }
h1 { text-align: center; color: #1f2937; }
.identity { text-align: center; margin-bottom: 24px; }
.avatar { width: 128px; height: 128px; border-radius: 50%; object-fit: cover; }
.avatar.empty { background: #f3f4f6; display: inline-block; }
.link { display: block; margin: 12px 0; padding: 16px; border-radius: 8px; color: #fff; text-decoration: none;
        background: linear-gradient(90deg, #46B3E0, #B8E9F6); }
.link img { width: 40px; height: 40px; border-radius: 50%; vertical-align: middle; margin-right: 12px; }
.link .comment { font-style: italic; font-size: 0.875rem; margin: 8px 0 0 52px; }
"#;

/// Renders the full public page for `snapshot`.
pub fn render_page(snapshot: &Snapshot) -> String {
    let title = escape(&snapshot.title);
    let profile = &snapshot.profile;
    let avatar = if profile.user_icon.is_empty() {
        r#"<span class="avatar empty"></span>"#.to_string()
    } else {
        format!(
            r#"<img class="avatar" src="{}" alt="user icon">"#,
            escape(&profile.user_icon)
        )
    };
    let links: String = snapshot.links.iter().map(render_link).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<main class="card">
<h1>{title}</h1>
<section class="identity">
{avatar}
<h2>{name}</h2>
<p>{comment}</p>
</section>
<nav class="links">
{links}</nav>
</main>
</body>
</html>
"#,
        name = escape(&profile.user_name),
        comment = escape(&profile.user_comment),
    )
}

fn render_link(link: &Link) -> String {
    let comment = match link.comment.as_deref() {
        Some(text) if !text.is_empty() => format!(r#"<p class="comment">{}</p>"#, escape(text)),
        _ => String::new(),
    };
    format!(
        r#"<a class="link" href="{href}" target="_blank" rel="noopener noreferrer"><img src="{icon}" alt="{name}"><span>{name}</span>{comment}</a>
"#,
        href = escape(safe_href(&link.url)),
        icon = escape(&link.icon),
        name = escape(&link.name),
    )
}

/// Replaces targets such as `javascript:` with `#`.
fn safe_href(url: &str) -> &str {
    let lower = url.trim_start().to_ascii_lowercase();
    match lower.split_once(':') {
        Some((scheme, _))
            if !scheme.contains('/') && !matches!(scheme, "http" | "https" | "mailto") =>
        {
            "#"
        }
        _ => url,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
