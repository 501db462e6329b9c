//! Request handler module
//!
//! Routes requests to the profile resolver, health probes or the public
//! directory.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
