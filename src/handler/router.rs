//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, resolution and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::profile::{self, Rendered, Route};
use crate::render::pages;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Query parameter carrying the account identifier
pub const BIS_PARAM: &str = "BIS";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
}

impl RequestContext<'_> {
    /// Decoded `BIS` query value, first occurrence wins
    pub fn bis(&self) -> Option<String> {
        let query = self.query?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == BIS_PARAM)
            .map(|(_, value)| value.into_owned())
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let uri = req.uri();

    let (mut response, resolution) = if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        (resp, "rejected")
    } else if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        (resp, "rejected")
    } else {
        let ctx = RequestContext {
            path: uri.path(),
            query: uri.query(),
            is_head: *method == Method::HEAD,
        };
        route_request(&ctx, &state).await
    };

    http::apply_common_headers(
        &mut response,
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = http_version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.resolution = Some(resolution);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            _ => None,
        },
    )
}

/// Route request based on path and configuration
///
/// Returns the response and a short label for the access log.
pub async fn route_request(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> (Response<Full<Bytes>>, &'static str) {
    let health = &state.config.health;
    if health.enabled && (ctx.path == health.liveness_path || ctx.path == health.readiness_path) {
        return (http::build_health_response("ok"), "health");
    }

    let route = match ctx.path {
        "/" => Some(Route::Home),
        "/linktree" | "/linktree/" => Some(Route::Linktree),
        _ => None,
    };

    if let Some(route) = route {
        let bis = ctx.bis();
        let rendered = profile::resolve(&state.client, &state.config.pages, route, bis.as_deref()).await;
        return (into_response(rendered, ctx.is_head), resolution_label(route, bis.as_deref()));
    }

    if let Some(response) = static_files::serve_public(ctx, &state.config.pages.public_dir).await {
        return (response, "static");
    }

    (
        http::build_html_response(StatusCode::NOT_FOUND, pages::page_not_found(), ctx.is_head),
        "no_route",
    )
}

/// Convert a resolver result into the HTTP response
fn into_response(rendered: Rendered, is_head: bool) -> Response<Full<Bytes>> {
    let status = rendered.status();
    match rendered {
        Rendered::Redirect(target) => http::build_redirect_response(&target),
        Rendered::Landing(html)
        | Rendered::Prompt(html)
        | Rendered::Profile(html)
        | Rendered::NotFound(html)
        | Rendered::ConfigurationError(html)
        | Rendered::RetryLater(html) => http::build_html_response(status, html, is_head),
    }
}

fn resolution_label(route: Route, bis: Option<&str>) -> &'static str {
    match (route, bis.is_some_and(|b| !b.is_empty())) {
        (_, true) => "lookup",
        (Route::Home, false) => "landing",
        (Route::Linktree, false) => "prompt",
    }
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn http_version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
