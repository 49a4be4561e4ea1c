use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};

use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{BearBitesError, Result};
use crate::llm::provider::{ChatPrompt, LlmBackend};

/// Chat-completions client for one configured model.
///
/// Rate-limited calls are retried with exponential backoff until the
/// configured timeout runs out; every other failure is returned at once and
/// left to the caller, which records the item as unclassified.
#[derive(Clone)]
pub(crate) struct LlmApiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl LlmApiClient {
    pub(crate) fn new(backend: &LlmBackend, config: &LlmConfig) -> Result<Self> {
        if backend.needs_api_key() && config.api_key.is_none() {
            return Err(BearBitesError::LlmUnavailable(format!(
                "{} requires LLM_API_KEY",
                backend.name()
            )));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| backend.default_base_url().to_string());
        let openai_config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(config.api_key.clone().unwrap_or_default());

        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BearBitesError::Llm(format!("Failed to create LLM HTTP client: {e}")))?;
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(timeout),
            ..Default::default()
        };

        Ok(Self {
            client: Client::with_config(openai_config)
                .with_http_client(http_client)
                .with_backoff(backoff),
            model: request_model(config),
        })
    }

    /// The first choice's text, possibly empty. Interpreting it is the
    /// caller's job.
    pub(crate) async fn complete(&self, prompt: &ChatPrompt<'_>) -> Result<String> {
        if prompt.user.trim().is_empty() {
            return Err(BearBitesError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_request(prompt)?;
        let response = self.client.chat().create(request).await.map_err(map_error)?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        tracing::trace!(model = %self.model, reply = %reply, "LLM reply");
        Ok(reply)
    }

    fn build_request(&self, prompt: &ChatPrompt<'_>) -> Result<CreateChatCompletionRequest> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt.system)
            .build()
            .map_err(map_error)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.user)
            .build()
            .map_err(map_error)?;
        let messages: Vec<ChatCompletionRequestMessage> = vec![system.into(), user.into()];

        CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .max_tokens(prompt.max_tokens)
            .build()
            .map_err(map_error)
    }
}

/// Model name as the endpoint expects it: without our provider prefix.
fn request_model(config: &LlmConfig) -> String {
    let (_, model) = parse_llm_provider_model(&config.model);
    model.to_string()
}

fn map_error(error: OpenAIError) -> BearBitesError {
    match error {
        OpenAIError::InvalidArgument(message) => BearBitesError::Validation(message),
        OpenAIError::ApiError(api_error) => BearBitesError::Llm(format!("LLM API error: {api_error}")),
        other => BearBitesError::Llm(format!("LLM request failed: {other}")),
    }
}
