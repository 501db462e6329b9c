//! HTML escaping
//!
//! Every value that did not originate in this crate (request identifier,
//! anything from the upstream account) goes through [`escape_html`] before it
//! is placed in markup, attribute values included.

/// Escape `& < > " '` as HTML entities
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
