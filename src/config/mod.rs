// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use config::builder::DefaultState;
use config::ConfigBuilder;
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, PagesConfig, UpstreamConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, config file,
    /// `LINKPAGE_*` environment variables, then the legacy `PORT` and
    /// `API_BASE_URL` variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse::<i64>().ok());
        let api_base_url = std::env::var("API_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());

        let settings = Self::builder_with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("LINKPAGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", port)?
            .set_override_option("upstream.base_url", api_base_url)?
            .build()?;

        settings.try_deserialize()
    }

    /// Builder pre-populated with every default value
    pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace_secs", 5)?
            .set_default("http.server_name", "linkpage/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("upstream.base_url", "http://localhost:3000")?
            .set_default("upstream.lookup_path", "/api/public/linktree")?
            .set_default("upstream.timeout_secs", 10)?
            .set_default("upstream.accept_invalid_certs", false)?
            .set_default("pages.site_name", "kochi.one")?
            .set_default("pages.public_dir", "public")?
            .set_default("pages.loading_image_base", "/loading")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::builder_with_defaults()
        .and_then(|builder| builder.build())
        .and_then(config::Config::try_deserialize)
        .expect("defaults must deserialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let cfg = test_config();
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.upstream.lookup_path, "/api/public/linktree");
        assert_eq!(cfg.upstream.timeout_secs, 10);
        assert!(!cfg.upstream.accept_invalid_certs);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.health.enabled);
        assert_eq!(cfg.health.liveness_path, "/healthz");
        assert!(cfg.pages.landing_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [server]
            port = 8088

            [upstream]
            base_url = "https://10.0.0.5:8443/"
            accept_invalid_certs = true

            [health]
            enabled = false
        "#;
        let cfg: Config = Config::builder_with_defaults()
            .unwrap()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.server.port, 8088);
        assert!(cfg.upstream.accept_invalid_certs);
        assert!(!cfg.health.enabled);
        assert_eq!(
            cfg.upstream.lookup_url(),
            "https://10.0.0.5:8443/api/public/linktree"
        );
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = test_config();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 3001);
        cfg.server.host = "not an address".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
