use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Per-provider settings for the analysis chain
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Upload validation and re-encoding settings
    #[serde(default)]
    pub image: ImageConfig,
    /// Advisory rate-limit figures; not enforced in-process
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Provider request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API binds to
    pub bind_addr: String,
    /// When true, error responses carry the underlying error text
    pub development: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            development: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub deepseek: DeepSeekConfig,
}

/// Configuration for the OpenAI vision provider
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key (can also be set via the OPENAI_API_KEY environment variable)
    pub api_key: Option<String>,
    /// Base URL for custom or proxy endpoints
    pub base_url: Option<String>,
    /// Model identifier
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        OpenAiConfig {
            api_key: None,
            base_url: None,
            model: "gpt-4o".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

/// Configuration for the DeepSeek text provider
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeepSeekConfig {
    /// API key (can also be set via the DEEPSEEK_API_KEY environment variable)
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        DeepSeekConfig {
            api_key: None,
            base_url: Some("https://api.deepseek.com".to_string()),
            model: "deepseek-chat".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ImageConfig {
    /// Largest accepted upload in bytes
    pub max_size_bytes: usize,
    /// Longest edge after resizing, in pixels
    pub max_dimension: u32,
    /// Quality for the JPEG re-encode (1-100)
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            max_size_bytes: 10 * 1024 * 1024,
            max_dimension: 2048,
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            requests: 10,
            window_secs: 60,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            providers: ProvidersConfig::default(),
            image: ImageConfig::default(),
            rate_limit: RateLimitConfig::default(),
            timeout: default_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PLATELENS__ prefix
    /// 2. platelens.toml file in the current directory
    /// 3. Default values
    ///
    /// Environment variable format: PLATELENS__PROVIDERS__OPENAI__API_KEY.
    /// The conventional OPENAI_API_KEY / DEEPSEEK_API_KEY variables fill the
    /// credential slots when the config itself carries none; providers never
    /// read the environment themselves.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("platelens").required(false))
            // Use double underscore for nested: PLATELENS__SERVER__BIND_ADDR
            .add_source(
                Environment::with_prefix("PLATELENS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;

        if config.providers.openai.api_key.is_none() {
            config.providers.openai.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.providers.deepseek.api_key.is_none() {
            config.providers.deepseek.api_key = std::env::var("DEEPSEEK_API_KEY").ok();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert!(!config.server.development);
        assert_eq!(config.image.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.image.max_dimension, 2048);
        assert_eq!(config.image.jpeg_quality, 90);
        assert_eq!(config.rate_limit.requests, 10);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn test_provider_defaults() {
        let providers = ProvidersConfig::default();
        assert!(providers.openai.api_key.is_none());
        assert_eq!(providers.openai.model, "gpt-4o");
        assert_eq!(providers.openai.temperature, 0.1);
        assert_eq!(providers.openai.max_tokens, 1000);
        assert_eq!(providers.deepseek.model, "deepseek-chat");
        assert_eq!(
            providers.deepseek.base_url.as_deref(),
            Some("https://api.deepseek.com")
        );
    }

    #[test]
    fn test_env_overrides_and_credential_backfill() {
        std::env::set_var("PLATELENS__SERVER__DEVELOPMENT", "true");
        std::env::set_var("OPENAI_API_KEY", "sk-test");

        let config = AppConfig::load().unwrap();
        assert!(config.server.development);
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test"));

        std::env::remove_var("PLATELENS__SERVER__DEVELOPMENT");
        std::env::remove_var("OPENAI_API_KEY");
    }
}
