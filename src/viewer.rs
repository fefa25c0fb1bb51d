//! Static Swagger UI page for browsing a generated document.
//!
//! A host serves the page at [`VIEWER_PATH`] and the JSON document at [`SPEC_SUB_PATH`]
//! below the same base path.

/// Where a host serves the viewer page
pub const VIEWER_PATH: &str = "/swagger";

/// Where a host serves the JSON document, relative to its base path
pub const SPEC_SUB_PATH: &str = "/swagger/openapi.json";

const SWAGGER_UI_DIST: &str = "https://unpkg.com/swagger-ui-dist";

/// URL of the JSON document for a host mounted at `base_path` (empty for the root)
pub fn spec_url(base_path: &str) -> String {
    format!("{}{}", base_path.trim_end_matches('/'), SPEC_SUB_PATH)
}

/// Render the viewer page loading the document from `spec_url`.
pub fn render_viewer_page(spec_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Swagger UI</title>
  <link rel="stylesheet" href="{dist}/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="{dist}/swagger-ui-bundle.js"></script>
  <script>
    const ui = SwaggerUIBundle({{
      url: '{url}',
      dom_id: '#swagger-ui',
    }});
  </script>
</body>
</html>
"#,
        dist = SWAGGER_UI_DIST,
        url = escape_js_string(spec_url),
    )
}

/// Escape text for a single-quoted script string inside HTML
fn escape_js_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '<' => escaped.push_str("\\x3C"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
