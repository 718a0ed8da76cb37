// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, GifSearchConfig, PerformanceConfig};

type SettingsBuilder = config::ConfigBuilder<config::builder::DefaultState>;

/// Environment variable carrying the third-party search API key
pub const API_KEY_ENV: &str = "API_KEY";

/// Default search endpoint (Tenor v2)
pub const DEFAULT_GIF_ENDPOINT: &str = "https://tenor.googleapis.com/v2/search";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .set_override_option("gif_search.api_key", std::env::var(API_KEY_ENV).ok())?
            .build()?;

        settings.try_deserialize()
    }

    /// Builder preloaded with every default value
    fn builder() -> Result<SettingsBuilder, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "form-playground/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("storage.images_dir", "static/images")?
            .set_default("storage.url_prefix", "/static/images")?
            .set_default("storage.max_dimension", 500)?
            .set_default("gif_search.endpoint", DEFAULT_GIF_ENDPOINT)?
            .set_default("gif_search.timeout_secs", 10)
    }

    /// Configuration made of defaults only, ignoring files and environment
    #[cfg(test)]
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
