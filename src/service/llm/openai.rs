//! OpenAI-compatible completion client.
//!
//! Any server that speaks the `/v1/completions` dialect works here (vLLM,
//! text-generation-inference, llama.cpp's server, ...), which is how a
//! Hugging Face checkpoint such as the default vicuna model gets served.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{CreateCompletionRequest, CreateCompletionRequestArgs, CreateCompletionResponse},
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{GenerationParams, Res},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_base(config.llm_base_url.clone()).with_api_key(config.llm_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the completion request for a prompt.
    fn build_request(&self, prompt: &str, params: &GenerationParams) -> Res<CreateCompletionRequest> {
        Ok(CreateCompletionRequestArgs::default()
            .model(self.config.llm_model.clone())
            .prompt(prompt.to_string())
            .max_tokens(params.max_tokens)
            .temperature(params.temperature)
            .top_p(params.top_p)
            .build()?)
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::complete", skip_all)]
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Res<String> {
        let request = self.build_request(prompt, params)?;
        let response = self.client.completions().create(request).await?;

        let text = first_choice_text(response)?;
        debug!("Completion returned {} bytes.", text.len());

        Ok(text)
    }
}

/// Pull the text of the first choice out of a completion response.
fn first_choice_text(response: CreateCompletionResponse) -> Res<String> {
    response
        .choices
        .into_iter()
        .min_by_key(|c| c.index)
        .map(|c| c.text)
        .ok_or_else(|| anyhow::anyhow!("Completion response contained no choices."))
}

// Tests.
