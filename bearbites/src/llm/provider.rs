use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{BearBitesError, Result};
use crate::llm::api::LlmApiClient;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

/// OpenAI-compatible endpoint family, picked from the `provider/` prefix of
/// the model name. Unprefixed models need an explicit base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    Custom { base_url: String },
}

impl LlmBackend {
    pub fn detect(config: &LlmConfig) -> Option<Self> {
        let (provider, _) = parse_llm_provider_model(&config.model);
        match provider.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "openrouter" => Some(Self::OpenRouter),
            "ollama" => Some(Self::Ollama),
            "lmstudio" => Some(Self::LmStudio),
            _ => config.base_url.clone().map(|base_url| Self::Custom { base_url }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
            Self::LmStudio => "lmstudio",
            Self::Custom { .. } => "openai-compatible",
        }
    }

    pub fn default_base_url(&self) -> &str {
        match self {
            Self::OpenAI => OPENAI_BASE_URL,
            Self::OpenRouter => OPENROUTER_BASE_URL,
            Self::Ollama => OLLAMA_BASE_URL,
            Self::LmStudio => LMSTUDIO_BASE_URL,
            Self::Custom { base_url } => base_url,
        }
    }

    /// Hosted services reject anonymous calls; local servers accept them.
    pub fn needs_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::OpenRouter)
    }
}

/// One classification turn: fixed instructions, the item text, and a reply cap.
#[derive(Debug, Clone, Copy)]
pub struct ChatPrompt<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub max_tokens: u32,
}

#[derive(Clone)]
enum ProviderState {
    Ready {
        backend: LlmBackend,
        client: LlmApiClient,
    },
    Unavailable(String),
}

/// Text-generation backend selected from configuration. Without a usable
/// configuration every completion fails with `LlmUnavailable`.
#[derive(Clone)]
pub struct LlmProvider {
    state: ProviderState,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };
        let Some(backend) = LlmBackend::detect(config) else {
            return Self::unavailable(&format!(
                "Model {} has no known provider prefix and no base URL",
                config.model
            ));
        };

        match LlmApiClient::new(&backend, config) {
            Ok(client) => Self {
                state: ProviderState::Ready { backend, client },
            },
            Err(BearBitesError::LlmUnavailable(reason)) => Self::unavailable(&reason),
            Err(e) => Self::unavailable(&e.to_string()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            state: ProviderState::Unavailable(reason.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ProviderState::Ready { .. })
    }

    pub fn backend(&self) -> Option<&LlmBackend> {
        match &self.state {
            ProviderState::Ready { backend, .. } => Some(backend),
            ProviderState::Unavailable(_) => None,
        }
    }

    pub async fn complete(&self, prompt: &ChatPrompt<'_>) -> Result<String> {
        match &self.state {
            ProviderState::Ready { client, .. } => client.complete(prompt).await,
            ProviderState::Unavailable(reason) => Err(BearBitesError::LlmUnavailable(reason.clone())),
        }
    }
}
