//! HTML rendering
//!
//! Escaping boundary and the canned pages the resolver can emit.

mod escape;
pub mod pages;

pub use escape::escape_html;
