//! In-process GGUF inference using llama-cpp-2.
//!
//! Requires the `local-llm` feature flag and CMake + C++ compiler at build time.

use std::{num::NonZeroU32, path::PathBuf, sync::Arc, time::Instant};

use anyhow::{Context, bail};
use async_trait::async_trait;
use llama_cpp_2::{
    context::params::LlamaContextParams,
    llama_backend::LlamaBackend,
    llama_batch::LlamaBatch,
    model::{AddBos, LlamaModel, params::LlamaModelParams},
    sampling::LlamaSampler,
    token::LlamaToken,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    types::{GenerationParams, Res},
};

use super::{GenericLlmClient, LlmClient};

/// Prompt plus answer never needs more than this.
const CONTEXT_SIZE: u32 = 2048;

/// Tokens decoded per batch while reading the prompt.
const BATCH_SIZE: usize = 512;

/// `LlamaBackend` with `Send + Sync`.
struct SendSyncBackend(LlamaBackend);

// SAFETY: LlamaBackend is an immutable init handle with no thread-local state.
unsafe impl Send for SendSyncBackend {}
unsafe impl Sync for SendSyncBackend {}

// Extra methods on `LlmClient` applied by the local implementation.

impl LlmClient {
    pub async fn local(config: &Config) -> Res<Self> {
        let client = LocalLlmClient::load(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Local GGUF LLM client implementation.
pub struct LocalLlmClient {
    backend: Arc<SendSyncBackend>,
    model: Arc<Mutex<LlamaModel>>,
}

impl LocalLlmClient {
    /// Load the GGUF model named by `llm_model_path`.
    #[instrument(name = "LocalLlmClient::load", skip_all)]
    pub async fn load(config: &Config) -> Res<Self> {
        let path = PathBuf::from(config.llm_model_path.clone().ok_or_else(|| anyhow::anyhow!("`LLM_MODEL_PATH` is not set."))?);

        if !path.exists() {
            bail!("model file not found: {}", path.display());
        }

        let (backend, model) = tokio::task::spawn_blocking(move || -> Res<(LlamaBackend, LlamaModel)> {
            let load_start = Instant::now();
            let backend = LlamaBackend::init().context("initializing llama backend")?;
            let model = LlamaModel::load_from_file(&backend, &path, &LlamaModelParams::default()).map_err(|e| anyhow::anyhow!("failed to load GGUF model: {e}"))?;

            info!("Loaded {} in {:.1}s.", path.display(), load_start.elapsed().as_secs_f64());

            Ok((backend, model))
        })
        .await??;

        Ok(Self {
            backend: Arc::new(SendSyncBackend(backend)),
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait]
impl GenericLlmClient for LocalLlmClient {
    #[instrument(name = "LocalLlmClient::complete", skip_all)]
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Res<String> {
        let backend = self.backend.clone();
        let model = self.model.clone();
        let prompt = prompt.to_string();
        let params = *params;
        let seed = rand::random::<u32>();

        tokio::task::spawn_blocking(move || {
            let model = model.blocking_lock();
            generate(&backend.0, &model, &prompt, &params, seed)
        })
        .await?
    }
}

/// Run one sampled generation; blocks the calling thread.
fn generate(backend: &LlamaBackend, model: &LlamaModel, prompt: &str, params: &GenerationParams, seed: u32) -> Res<String> {
    let ctx_params = LlamaContextParams::default().with_n_ctx(NonZeroU32::new(CONTEXT_SIZE)).with_n_batch(BATCH_SIZE as u32);
    let mut ctx = model.new_context(backend, ctx_params).map_err(|e| anyhow::anyhow!("failed to create llama context: {e}"))?;

    let tokens = model.str_to_token(prompt, AddBos::Always).map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

    if tokens.is_empty() {
        bail!("empty token sequence");
    }

    if tokens.len() + params.max_tokens as usize > CONTEXT_SIZE as usize {
        bail!("prompt of {} tokens does not fit the context", tokens.len());
    }

    // Feed the prompt; only the last token needs logits.
    let mut batch = LlamaBatch::new(BATCH_SIZE, 1);
    for (chunk_idx, chunk) in tokens.chunks(BATCH_SIZE).enumerate() {
        batch.clear();
        let chunk_start = chunk_idx * BATCH_SIZE;
        let is_last_chunk = chunk_start + chunk.len() == tokens.len();

        for (i, &token) in chunk.iter().enumerate() {
            let is_last = is_last_chunk && i == chunk.len() - 1;
            batch.add(token, (chunk_start + i) as i32, &[0], is_last).map_err(|e| anyhow::anyhow!("batch add failed: {e}"))?;
        }

        ctx.decode(&mut batch).map_err(|e| anyhow::anyhow!("prompt decode failed: {e}"))?;
    }

    let mut sampler = sampler_chain(params, seed);

    let mut output_tokens = Vec::new();
    let mut pos = tokens.len() as i32;
    let eos_token = model.token_eos();

    for _ in 0..params.max_tokens {
        let token = sampler.sample(&ctx, batch.n_tokens() - 1);

        if token == eos_token {
            break;
        }

        output_tokens.push(token);
        sampler.accept(token);

        batch.clear();
        batch.add(token, pos, &[0], true).map_err(|e| anyhow::anyhow!("batch add token failed: {e}"))?;
        ctx.decode(&mut batch).map_err(|e| anyhow::anyhow!("token decode failed: {e}"))?;

        pos += 1;
    }

    debug!("Generated {} tokens.", output_tokens.len());

    detokenize(model, &output_tokens)
}

/// One step of the sampler chain.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SamplingStep {
    Temperature(f32),
    TopP(f32),
    Draw,
}

/// Temperature scales the logits before the nucleus is cut.
fn sampling_steps(params: &GenerationParams) -> [SamplingStep; 3] {
    [SamplingStep::Temperature(params.temperature), SamplingStep::TopP(params.top_p), SamplingStep::Draw]
}

fn sampler_chain(params: &GenerationParams, seed: u32) -> LlamaSampler {
    LlamaSampler::chain_simple(sampling_steps(params).map(|step| match step {
        SamplingStep::Temperature(t) => LlamaSampler::temp(t),
        SamplingStep::TopP(p) => LlamaSampler::top_p(p, 1),
        SamplingStep::Draw => LlamaSampler::dist(seed),
    }))
}

/// Detokenize a sequence of tokens into a string.
fn detokenize(model: &LlamaModel, tokens: &[LlamaToken]) -> Res<String> {
    let mut decoder = encoding_rs::UTF_8.new_decoder();
    let mut output = String::new();

    for &token in tokens {
        let piece = model.token_to_piece(token, &mut decoder, true, None).map_err(|e| anyhow::anyhow!("detokenization failed: {e}"))?;
        output.push_str(&piece);
    }

    Ok(output)
}
