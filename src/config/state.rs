// Application state module
// Read-only state shared by every connection

use super::types::Config;
use crate::profile::{ClientError, ProfileClient};

/// Application state
///
/// Nothing in here changes after startup; requests only read from it.
pub struct AppState {
    pub config: Config,
    pub client: ProfileClient,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = ProfileClient::new(&config.upstream)?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }
}
