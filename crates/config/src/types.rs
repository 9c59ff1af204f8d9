use crate::{optional, parse_optional, parse_or, required, ConfigError, ConfigSource, EnvSource};
use std::{collections::HashMap, fmt};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub rewrite: RewriteConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource)
    }

    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_source(source)?,
            upstream: UpstreamConfig::from_source(source)?,
            rewrite: RewriteConfig::from_source(source)?,
            export: ExportConfig::from_source(source)?,
            logging: LoggingConfig::from_source(source),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            host: optional(source, "SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(source, "SERVER_PORT", 3000)?,
            cors_allowed_origins: optional(source, "CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Chat-completion API the rewrites are forwarded to
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: i64,
    pub connect_timeout_seconds: u64,
    /// Overall request timeout. `None` leaves the request unbounded.
    pub timeout_seconds: Option<u64>,
    /// Sent as `HTTP-Referer` (OpenRouter app attribution)
    pub referer: Option<String>,
    /// Sent as `X-Title` (OpenRouter app attribution)
    pub title: Option<String>,
}

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_UPSTREAM_MODEL: &str = "anthropic/claude-3.5-sonnet";

impl UpstreamConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let temperature: f32 = parse_or(source, "UPSTREAM_TEMPERATURE", 0.7)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                name: "UPSTREAM_TEMPERATURE".to_string(),
                message: "must be between 0 and 2".to_string(),
            });
        }

        let max_tokens: i64 = parse_or(source, "UPSTREAM_MAX_TOKENS", 1000)?;
        if max_tokens <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "UPSTREAM_MAX_TOKENS".to_string(),
                message: "must be positive".to_string(),
            });
        }

        Ok(Self {
            base_url: optional(source, "UPSTREAM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string()),
            api_key: required(source, "UPSTREAM_API_KEY")?,
            model: optional(source, "UPSTREAM_MODEL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_MODEL.to_string()),
            temperature,
            max_tokens,
            connect_timeout_seconds: parse_or(source, "UPSTREAM_CONNECT_TIMEOUT_SECS", 30)?,
            timeout_seconds: parse_optional(source, "UPSTREAM_TIMEOUT_SECS")?,
            referer: optional(source, "UPSTREAM_REFERER"),
            title: optional(source, "UPSTREAM_TITLE"),
        })
    }
}

// Keep the API key out of logs
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RewriteConfig {
    /// Longest accepted input, in characters
    pub max_text_length: usize,
}

impl RewriteConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        Ok(Self {
            max_text_length: parse_or(source, "REWRITE_MAX_TEXT_LENGTH", 10_000)?,
        })
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_text_length: 10_000,
        }
    }
}

/// Document export settings
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub document_title: String,
    pub file_stem: String,
    /// Directory holding the TrueType file used for PDF output
    pub font_dir: String,
    /// Font name; the file is `<family>-Regular.ttf` or `<family>.ttf`.
    ///
    /// The font must cover every script users write in, CJK included, or those
    /// characters render as blank boxes. genpdf embeds the whole file once per
    /// text style (four times), so each PDF is roughly four times the font size.
    pub font_family: String,
}

impl ExportConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            document_title: optional(source, "EXPORT_DOCUMENT_TITLE")
                .unwrap_or(defaults.document_title),
            file_stem: optional(source, "EXPORT_FILE_STEM").unwrap_or(defaults.file_stem),
            font_dir: optional(source, "EXPORT_FONT_DIR").unwrap_or(defaults.font_dir),
            font_family: optional(source, "EXPORT_FONT_FAMILY").unwrap_or(defaults.font_family),
        })
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            document_title: "AI Rewritten Text".to_string(),
            file_stem: "rewritten-text".to_string(),
            // Debian/Ubuntu `fonts-droid-fallback`: Latin and CJK in one file
            font_dir: "/usr/share/fonts/truetype/droid".to_string(),
            font_family: "DroidSansFallbackFull".to_string(),
        }
    }
}

/// Logging Configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        if let Some(level) = optional(source, "LOG_MODULE_API") {
            modules.insert("api".to_string(), level);
        }
        if let Some(level) = optional(source, "LOG_MODULE_SERVICES") {
            modules.insert("services".to_string(), level);
        }
        if let Some(level) = optional(source, "LOG_MODULE_INFERENCE_PROVIDERS") {
            modules.insert("inference_providers".to_string(), level);
        }

        Self {
            level: optional(source, "LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: optional(source, "LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            modules,
        }
    }

    /// Filter directive for `tracing_subscriber::EnvFilter`
    pub fn filter_directive(&self) -> String {
        let mut filter = self.level.clone();
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        for (module, level) in modules {
            filter.push_str(&format!(",{module}={level}"));
        }
        filter
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            modules: HashMap::new(),
        }
    }
}
