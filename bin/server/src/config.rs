//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables (`FLOWLINE_LISTEN_ADDR`, `FLOWLINE_NATS_URL`, ...).

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// NATS server URL for status broadcasting. When absent, status events
    /// are logged instead of published.
    #[serde(default)]
    pub nats_url: Option<String>,

    /// Accepted clock skew for Stripe webhook signatures, in seconds.
    #[serde(default = "default_stripe_tolerance_seconds")]
    pub stripe_tolerance_seconds: i64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_stripe_tolerance_seconds() -> i64 {
    flowline_ingress::DEFAULT_TOLERANCE_SECONDS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            nats_url: None,
            stripe_tolerance_seconds: default_stripe_tolerance_seconds(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from `FLOWLINE_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("FLOWLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
