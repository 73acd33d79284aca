// ============================================================================
// Page Routes
// ============================================================================
//
// Minimal HTML shells for the three gated paths. The access gate runs in
// front of these handlers, so reaching one means the gate allowed it.
//
// ============================================================================

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
};
use std::fmt::Write;
use std::sync::Arc;

use crate::aggregator::Provider;
use crate::context::AppContext;
use crate::gate::LOGIN_PATH;

/// GET /
///
/// The gate redirects every request for `/`; this is only reached if the
/// gate layer is missing.
pub async fn root() -> impl IntoResponse {
    Redirect::to(LOGIN_PATH)
}

/// GET /login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /summary
pub async fn summary_page(State(app_context): State<Arc<AppContext>>) -> Html<String> {
    let catalog = render_catalog(&app_context.config.upstream.providers);
    Html(SUMMARY_HTML.replace("{{catalog}}", &catalog))
}

/// Nested `<li>` list of providers and their models
fn render_catalog(providers: &[Provider]) -> String {
    let mut catalog = String::new();
    for provider in providers {
        let _ = write!(catalog, "<li>{}<ul>", escape_html(&provider.name));
        for model in &provider.models {
            let _ = write!(catalog, "<li>{}</li>", escape_html(model));
        }
        catalog.push_str("</ul></li>");
    }
    catalog
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<h1>Sign in</h1>
<p>POST your username and password as JSON to <code>/api/login</code>.</p>
</body>
</html>
"#;

const SUMMARY_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Summaries</title></head>
<body>
<h1>Summaries</h1>
<p>Available models:</p>
<ul>{{catalog}}</ul>
<p>Submit text with <code>POST /api/summary</code>, export with <code>POST /api/summary/export</code>.</p>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<gpt & \"4\">"), "&lt;gpt &amp; &quot;4&quot;&gt;");
        assert_eq!(escape_html("plain-model"), "plain-model");
    }

    #[test]
    fn test_render_catalog() {
        let providers = vec![
            Provider {
                name: "openai".to_string(),
                models: vec!["gpt-4".to_string(), "<b>".to_string()],
            },
            Provider {
                name: "claude".to_string(),
                models: vec![],
            },
        ];

        assert_eq!(
            render_catalog(&providers),
            "<li>openai<ul><li>gpt-4</li><li>&lt;b&gt;</li></ul></li><li>claude<ul></ul></li>"
        );
        assert_eq!(render_catalog(&[]), "");
    }
}
