use crate::core::errors::ExchangeError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{instrument, trace};

/// REST client trait for making HTTP requests.
///
/// The IDEX HTTP API is POST-only: every endpoint takes an optional JSON body
/// and returns JSON. Implementations handle request formatting; the typed
/// wrappers above this trait handle endpoint semantics.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a POST request
    ///
    /// # Arguments
    /// * `endpoint` - The API endpoint name, e.g. `returnTicker`
    /// * `body` - Optional request body; `None` sends an empty body
    ///
    /// # Returns
    /// The response body as a JSON value
    async fn post(&self, endpoint: &str, body: Option<&Value>) -> Result<Value, ExchangeError>;

    /// Make a POST request with strongly-typed response
    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "idex-connector/0.1".to_string(),
        }
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self { config }
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone, Debug)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
}

impl ReqwestRest {
    pub fn new(base_url: String, exchange_name: String) -> Result<Self, ExchangeError> {
        RestClientBuilder::new(RestClientConfig::new(base_url, exchange_name)).build()
    }

    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url, endpoint)
    }

    /// Handle the response and extract JSON
    #[instrument(skip(self, response), fields(exchange = %self.config.exchange_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<Value, ExchangeError> {
        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            ExchangeError::NetworkError(format!("Failed to read response body: {}", e))
        })?;

        trace!("Response body: {}", response_text);

        if status.is_success() {
            Ok(serde_json::from_str(&response_text)?)
        } else {
            Err(ExchangeError::ApiError {
                code: i32::from(status.as_u16()),
                message: response_text,
            })
        }
    }

    #[instrument(skip(self, body), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn make_request(
        &self,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ExchangeError> {
        let url = self.build_url(endpoint);
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            let body_bytes = serde_json::to_vec(body)?;
            request = request.body(body_bytes);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Request failed: {}", e)))?;

        self.handle_response(response).await
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    async fn post(&self, endpoint: &str, body: Option<&Value>) -> Result<Value, ExchangeError> {
        self.make_request(endpoint, body).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, ExchangeError> {
        let value = self.make_request(endpoint, body).await?;
        Ok(serde_json::from_value(value)?)
    }
}
