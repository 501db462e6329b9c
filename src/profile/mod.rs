//! Profile lookup and resolution
//!
//! - `model`: account records and the classified lookup outcome
//! - `client`: the upstream call and its status/body classification
//! - `resolver`: identifier → page or redirect

mod client;
mod model;
pub mod resolver;

pub use client::{ClientError, ProfileClient};
pub use model::{Account, Button, LookupOutcome};
pub use resolver::{resolve, Rendered, Route};
