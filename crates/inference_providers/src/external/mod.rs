//! External provider implementations
//!
//! Providers reached over HTTP with an API key. Only the OpenAI chat-completion
//! format is implemented; it covers OpenAI itself and the gateways that mirror
//! it (OpenRouter, Together AI, Groq, Fireworks AI, ...).

pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleProvider;

use std::collections::HashMap;
use std::fmt;

/// Configuration for an external provider connection
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL for the provider API, without the `/chat/completions` suffix
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// TCP connect timeout in seconds
    pub connect_timeout_seconds: u64,
    /// Overall request timeout in seconds; `None` means unbounded
    pub timeout_seconds: Option<u64>,
    /// Additional headers sent with every request (e.g. `HTTP-Referer`, `X-Title`)
    pub extra_headers: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            connect_timeout_seconds: 30,
            timeout_seconds: None,
            extra_headers: HashMap::new(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("extra_headers", &self.extra_headers)
            .finish()
    }
}
