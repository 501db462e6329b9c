//! Profile resolution
//!
//! One request in, one [`Rendered`] out:
//! identifier check → upstream lookup → classification → page or redirect.

use hyper::StatusCode;
use tokio::fs;
use url::Url;

use super::client::ProfileClient;
use super::model::{Account, LookupOutcome};
use crate::config::PagesConfig;
use crate::logger;
use crate::render::pages;

/// Which inbound route asked for the resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/` shows the search page when no identifier is given
    Home,
    /// `/linktree` requires an identifier
    Linktree,
}

/// Final response of one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Landing(String),
    Prompt(String),
    Profile(String),
    Redirect(String),
    NotFound(String),
    ConfigurationError(String),
    RetryLater(String),
}

impl Rendered {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Landing(_) | Self::Prompt(_) | Self::Profile(_) => StatusCode::OK,
            Self::Redirect(_) => StatusCode::FOUND,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ConfigurationError(_) | Self::RetryLater(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Resolve an identifier into a page or redirect
///
/// An empty identifier counts as absent.
pub async fn resolve(
    client: &ProfileClient,
    pages_config: &PagesConfig,
    route: Route,
    identifier: Option<&str>,
) -> Rendered {
    let Some(bis) = identifier.filter(|id| !id.is_empty()) else {
        return match route {
            Route::Home => Rendered::Landing(load_landing_page(pages_config).await),
            Route::Linktree => Rendered::Prompt(pages::prompt_page()),
        };
    };

    let outcome = client.lookup(bis).await;
    render_outcome(outcome, bis, pages_config)
}

/// Turn a classified lookup into the response for `bis`
pub fn render_outcome(outcome: LookupOutcome, bis: &str, pages_config: &PagesConfig) -> Rendered {
    match outcome {
        LookupOutcome::Success(account) => {
            if let Some(target) = redirect_target(&account) {
                return Rendered::Redirect(target.into());
            }
            if account.is_redirection_enabled {
                logger::log_warning(&format!(
                    "Ignoring invalid redirection URL for BIS={bis:?}: {:?}",
                    account.redirection_url.as_deref().unwrap_or("")
                ));
            }
            Rendered::Profile(pages::profile_page(
                &account,
                bis,
                &pages_config.loading_image_base,
                &pages_config.site_name,
            ))
        }
        LookupOutcome::NotFound => Rendered::NotFound(pages::not_found_page(bis)),
        LookupOutcome::Unauthorized => Rendered::ConfigurationError(pages::configuration_error_page()),
        LookupOutcome::OtherError(_) | LookupOutcome::TransportFailure(_) => {
            Rendered::RetryLater(pages::retry_later_page())
        }
    }
}

/// Redirect target when redirection is enabled and the URL is usable
///
/// Returns the parsed form: percent-encoded, punycode host, no control
/// characters, so it always fits in a `Location` header.
pub fn redirect_target(account: &Account) -> Option<Url> {
    if !account.is_redirection_enabled {
        return None;
    }
    parse_redirect(account.redirection_url.as_deref()?.trim())
}

/// Absolute `http`/`https` URL with a host
pub fn parse_redirect(target: &str) -> Option<Url> {
    Url::parse(target)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}


async fn load_landing_page(pages_config: &PagesConfig) -> String {
    if let Some(path) = pages_config.landing_file.as_deref() {
        match fs::read_to_string(path).await {
            Ok(html) => return html,
            Err(e) => {
                logger::log_warning(&format!(
                    "Failed to load landing page '{path}': {e}, using built-in page"
                ));
            }
        }
    }
    pages::landing_page(&pages_config.site_name)
}
