use serde::Deserialize;
use std::env;

pub const DEFAULT_VENDOR_BASE_URL: &str = "https://foodpro.ucr.edu/foodpro";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub vendor: VendorConfig,
    pub cache: CacheConfig,
    pub llm: Option<LlmConfig>,
    pub enrichment: EnrichmentConfig,
    pub prewarm: PrewarmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where vendor list and label pages are fetched from
#[derive(Debug, Clone, Deserialize)]
pub struct VendorConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VENDOR_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: concat!("bearbites/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Cache backend selection. `url: None` keeps everything in process memory.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub url: Option<String>,
    pub auth_token: Option<String>,
    pub memory_capacity: usize,
}

/// LLM configuration for the spicy classifier
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Budget for one completion, including rate-limit backoff.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub batch_size: usize,
    /// Upper bound for a single classifier call.
    pub call_timeout_secs: u64,
    /// Upper bound for one whole enrichment run over a menu.
    pub task_timeout_secs: u64,
    pub queue_capacity: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: 5,
            call_timeout_secs: 20,
            task_timeout_secs: 300,
            queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrewarmConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("BEARBITES_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("BEARBITES_PORT", 3000),
            },
            vendor: VendorConfig {
                base_url: env::var("VENDOR_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| DEFAULT_VENDOR_BASE_URL.to_string()),
                timeout_secs: parse_env_or("VENDOR_TIMEOUT_SECS", 30),
                user_agent: env::var("VENDOR_USER_AGENT")
                    .unwrap_or_else(|_| VendorConfig::default().user_agent),
            },
            cache: CacheConfig {
                url: env::var("CACHE_DATABASE_URL").ok().filter(|url| !url.is_empty()),
                auth_token: env::var("CACHE_AUTH_TOKEN").ok(),
                memory_capacity: parse_env_or("CACHE_MEMORY_CAPACITY", 10_000),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
            }),
            enrichment: EnrichmentConfig {
                enabled: parse_env_or("ENRICHMENT_ENABLED", true),
                batch_size: parse_env_opt("ENRICHMENT_BATCH_SIZE")
                    .filter(|size: &usize| *size > 0)
                    .unwrap_or(5),
                call_timeout_secs: parse_env_or("ENRICHMENT_CALL_TIMEOUT_SECS", 20),
                task_timeout_secs: parse_env_or("ENRICHMENT_TASK_TIMEOUT_SECS", 300),
                queue_capacity: parse_env_opt("ENRICHMENT_QUEUE_CAPACITY")
                    .filter(|capacity: &usize| *capacity > 0)
                    .unwrap_or(64),
            },
            prewarm: PrewarmConfig {
                enabled: parse_env_or("PREWARM_ENABLED", true),
                interval_secs: parse_env_or("PREWARM_INTERVAL_SECS", 21_600),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_enrichment_config_defaults() {
        std::env::remove_var("ENRICHMENT_BATCH_SIZE");
        std::env::remove_var("ENRICHMENT_CALL_TIMEOUT_SECS");

        let config = Config::default();
        assert!(config.enrichment.enabled);
        assert_eq!(config.enrichment.batch_size, 5);
        assert_eq!(config.enrichment.call_timeout_secs, 20);
        assert_eq!(config.enrichment.queue_capacity, 64);
    }

    #[test]
    #[serial]
    fn test_zero_batch_size_falls_back_to_default() {
        std::env::set_var("ENRICHMENT_BATCH_SIZE", "0");
        let config = Config::default();
        assert_eq!(config.enrichment.batch_size, 5);
        std::env::remove_var("ENRICHMENT_BATCH_SIZE");
    }

    #[test]
    #[serial]
    fn test_llm_config_only_present_with_model() {
        std::env::remove_var("LLM_MODEL");
        let config = Config::default();
        assert!(config.llm.is_none());

        std::env::set_var("LLM_MODEL", "openai/gpt-4o-mini");
        std::env::set_var("LLM_TIMEOUT", "12");
        let config = Config::default();
        let llm = config.llm.expect("llm config");
        assert_eq!(llm.model, "openai/gpt-4o-mini");
        assert_eq!(llm.timeout_secs, 12);

        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_TIMEOUT");
    }

    #[test]
    #[serial]
    fn test_vendor_base_url_trailing_slash_is_trimmed() {
        std::env::set_var("VENDOR_BASE_URL", "http://localhost:9999/foodpro/");
        let config = Config::default();
        assert_eq!(config.vendor.base_url, "http://localhost:9999/foodpro");
        std::env::remove_var("VENDOR_BASE_URL");

        let config = Config::default();
        assert_eq!(config.vendor.base_url, DEFAULT_VENDOR_BASE_URL);
    }

    #[test]
    #[serial]
    fn test_cache_url_empty_means_memory() {
        std::env::set_var("CACHE_DATABASE_URL", "");
        let config = Config::default();
        assert!(config.cache.url.is_none());
        std::env::remove_var("CACHE_DATABASE_URL");
    }

    #[test]
    #[serial]
    fn test_parse_env_or_invalid_value_uses_default() {
        std::env::set_var("__TEST_PARSE_PORT", "not-a-port");
        let result: u16 = parse_env_or("__TEST_PARSE_PORT", 3000);
        assert_eq!(result, 3000);
        std::env::remove_var("__TEST_PARSE_PORT");
    }

    #[test]
    fn test_parse_llm_provider_model() {
        assert_eq!(
            parse_llm_provider_model("openrouter/meta/llama-3.1-8b"),
            ("openrouter", "meta/llama-3.1-8b")
        );
        assert_eq!(parse_llm_provider_model("llama3"), ("local", "llama3"));
    }
}
