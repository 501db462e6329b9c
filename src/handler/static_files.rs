//! Static file serving module
//!
//! Serves assets (stylesheets, icons, loading splash images) from the
//! configured public directory.

use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve `ctx.path` from `public_dir`, or `None` when there is no such file
pub async fn serve_public(ctx: &RequestContext<'_>, public_dir: &str) -> Option<Response<Full<Bytes>>> {
    let file_path = resolve_public_path(public_dir, ctx.path)?;

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::content_type_for(&file_path);
    Some(http::build_static_response(content, content_type, ctx.is_head))
}

/// Map a request path to a file inside `public_dir`
///
/// Rejects anything that canonicalizes outside the directory and anything
/// that is not a regular file.
pub fn resolve_public_path(public_dir: &str, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(relative).ok()?;
    let file_path = Path::new(public_dir).join(decoded.as_ref());

    let dir_canonical = match Path::new(public_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_debug(&format!(
                "Public directory not found or inaccessible '{public_dir}': {e}"
            ));
            return None;
        }
    };

    // Missing files are the common case, not worth a warning
    let file_canonical = file_path.canonicalize().ok()?;
    if !file_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            file_canonical.display()
        ));
        return None;
    }

    file_canonical.is_file().then_some(file_canonical)
}
