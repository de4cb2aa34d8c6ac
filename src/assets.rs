use axum::{extract::Path, http::{header, StatusCode}, response::{Html, IntoResponse, Response}};
use include_dir::{include_dir, Dir};

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

pub async fn index() -> Response {
    match STATIC_DIR.get_file("index.html").and_then(|f| f.contents_utf8()) {
        Some(html) => Html(html).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn asset(Path(path): Path<String>) -> Response {
    match STATIC_DIR.get_file(&path) {
        Some(file) => ([(header::CONTENT_TYPE, content_type(&path))], file.contents()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_assets_are_embedded() {
        assert!(STATIC_DIR.get_file("index.html").is_some());
        assert!(STATIC_DIR.get_file("app.js").is_some());
        assert!(STATIC_DIR.get_file("style.css").is_some());
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type("app.js"), "text/javascript; charset=utf-8");
        assert_eq!(content_type("style.css"), "text/css; charset=utf-8");
        assert_eq!(content_type("blob"), "application/octet-stream");
    }
}
