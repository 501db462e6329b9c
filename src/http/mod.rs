//! HTTP protocol layer module
//!
//! Response builders and MIME detection, independent of the profile logic.

pub mod mime;
pub mod response;

pub use response::{
    apply_common_headers, build_405_response, build_413_response, build_health_response,
    build_html_response, build_internal_error_response, build_options_response,
    build_redirect_response, build_static_response,
};
