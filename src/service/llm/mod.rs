//! Integration with generative language models.
//!
//! The oracle only needs raw prompt completion, so the trait is a single call.
//! The default implementation talks to any OpenAI-compatible completion
//! server; the `local-llm` feature adds an in-process GGUF model.

#[cfg(feature = "local-llm")]
pub mod local;
pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{
    config::{Config, LlmBackend},
    types::{GenerationParams, Res},
};

// Traits.

/// Generic LLM client trait that clients must implement.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Complete the prompt.
    ///
    /// The returned text may or may not repeat the prompt; callers strip it.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Res<String>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }

    /// Build the client selected by `llm_backend`.
    pub async fn from_config(config: &Config) -> Res<Self> {
        match config.llm_backend {
            LlmBackend::OpenAi => Ok(Self::openai(config)),
            #[cfg(feature = "local-llm")]
            LlmBackend::Local => Self::local(config).await,
            #[cfg(not(feature = "local-llm"))]
            LlmBackend::Local => Err(anyhow::anyhow!("The local LLM backend requires the `local-llm` feature.")),
        }
    }
}
