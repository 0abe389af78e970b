//! Options structures for model and transport configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;

/// Environment variable holding the AI gateway API key.
pub const API_KEY_ENV: &str = "AI_GATEWAY_API_KEY";

/// Environment variable overriding the AI gateway base URL.
pub const BASE_URL_ENV: &str = "AI_GATEWAY_BASE_URL";

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Model behavior parameters for a chat request.
///
/// # Example
/// ```rust
/// use sbke::options::ModelOptions;
///
/// let options = ModelOptions::default()
///     .with_model("google/gemini-2.5-flash".to_string())
///     .with_temperature(0.4);
/// assert_eq!(options.temperature, Some(0.4));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelOptions {
    /// Model identifier; the provider default is used when unset
    pub model: Option<String>,

    /// Replaces the built-in assistant persona in the system prompt
    pub instructions: Option<String>,

    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,

    /// Top-p (nucleus) sampling parameter
    pub top_p: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ModelOptions {
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_instructions(mut self, instructions: String) -> Self {
        self.instructions = Some(instructions);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Transport options: a generic timeout plus provider-specific settings.
///
/// # Example
/// ```rust
/// use sbke::options::{TransportOptions, HttpTransport};
/// use std::time::Duration;
///
/// let options = TransportOptions::new(HttpTransport::new("sk-..."))
///     .with_timeout(Duration::from_secs(60));
/// assert!(options.timeout.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions<T> {
    /// Whole-request timeout, covering the streamed body
    pub timeout: Option<Duration>,

    pub provider: T,
}

impl<T> TransportOptions<T> {
    pub fn new(provider: T) -> Self {
        Self {
            timeout: None,
            provider,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP-specific transport options.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    /// API key sent as a bearer token
    pub api_key: Option<SecretString>,

    /// Base URL of the gateway, without the `/v1/...` path
    pub base_url: Option<String>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl HttpTransport {
    /// Create new HTTP transport options with an API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: None,
            proxy: None,
            extra_headers: None,
        }
    }

    /// Read the API key and optional base URL from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClientError::Config(format!("{} is not configured", API_KEY_ENV)))?;

        let mut transport = Self::new(api_key);
        transport.base_url = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty());
        Ok(transport)
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretString::from("sk-live");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.expose_secret(), "sk-live");
    }

    #[test]
    fn test_from_lookup_requires_key() {
        let err = HttpTransport::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ClientError::Config(msg) if msg.contains(API_KEY_ENV)));

        let blank = HttpTransport::from_lookup(|name| {
            (name == API_KEY_ENV).then(|| "  ".to_string())
        });
        assert!(blank.is_err());
    }

    #[test]
    fn test_from_lookup_reads_base_url() {
        let transport = HttpTransport::from_lookup(|name| match name {
            API_KEY_ENV => Some("key".to_string()),
            BASE_URL_ENV => Some("http://localhost:9000".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(transport.api_key.unwrap().expose_secret(), "key");
        assert_eq!(transport.base_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_with_header_accumulates() {
        let transport = HttpTransport::new("key")
            .with_header("x-client-info".to_string(), "sbke".to_string())
            .with_header("apikey".to_string(), "anon".to_string());

        assert_eq!(transport.extra_headers.map(|h| h.len()), Some(2));
    }
}
