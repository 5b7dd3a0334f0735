use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

/// Production REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.idex.market";
/// Production websocket endpoint.
pub const DEFAULT_WS_URL: &str = "wss://v1.idex.market";

/// Static access key sent with the websocket handshake.
const DEFAULT_WS_KEY: &str = "17paIsICur8sA0OBqG6dH5G1rmrHNMwt4oNk4iX9";

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_url: String,
    pub ws_url: String,
    ws_key: Secret<String>,
}

// Custom Serialize implementation - never expose the access key in serialization
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 3)?;
        state.serialize_field("api_url", &self.api_url)?;
        state.serialize_field("ws_url", &self.ws_url)?;
        state.serialize_field("ws_key", "[REDACTED]")?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ExchangeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ExchangeConfigHelper {
            api_url: Option<String>,
            ws_url: Option<String>,
            ws_key: Option<String>,
        }

        let helper = ExchangeConfigHelper::deserialize(deserializer)?;
        let mut config = Self::new();
        if let Some(api_url) = helper.api_url {
            config.api_url = api_url;
        }
        if let Some(ws_url) = helper.ws_url {
            config.ws_url = ws_url;
        }
        if let Some(ws_key) = helper.ws_key {
            config.ws_key = Secret::new(ws_key);
        }
        Ok(config)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeConfig {
    /// Create a configuration pointing at the production endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            ws_key: Secret::new(DEFAULT_WS_KEY.to_string()),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Recognized environment variables (all optional, defaults apply):
    /// - `IDEX_API_URL`
    /// - `IDEX_WS_URL`
    /// - `IDEX_WS_KEY`
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(api_url) = env::var("IDEX_API_URL") {
            config.api_url = api_url;
        }
        if let Ok(ws_url) = env::var("IDEX_WS_URL") {
            config.ws_url = ws_url;
        }
        if let Ok(ws_key) = env::var("IDEX_WS_KEY") {
            config.ws_key = Secret::new(ws_key);
        }
        config
    }

    /// Create configuration from a .env file and environment variables
    ///
    /// Loads variables from the given file first (a missing file is fine),
    /// then reads the standard `IDEX_*` variables.
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // continue with system env vars
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Ok(Self::from_env())
    }

    /// Set a custom REST endpoint
    #[must_use]
    pub fn api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Set a custom websocket endpoint
    #[must_use]
    pub fn ws_url(mut self, ws_url: String) -> Self {
        self.ws_url = ws_url;
        self
    }

    /// Set the websocket handshake access key
    #[must_use]
    pub fn ws_key(mut self, ws_key: String) -> Self {
        self.ws_key = Secret::new(ws_key);
        self
    }

    /// Get the handshake access key (use carefully - exposes secret)
    pub fn expose_ws_key(&self) -> &str {
        self.ws_key.expose_secret()
    }

    /// Clone the handshake access key without unwrapping it.
    pub(crate) fn ws_key_secret(&self) -> Secret<String> {
        self.ws_key.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
