//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::{GenerationParams, Res};

/// Default flex channel, used when `FLEX_CHANNEL_ID` is not set.
fn default_flex_channel_id() -> u64 {
    1356627399004913846
}

/// Default chance of a flex comment on an attachment post.
fn default_flex_comment_chance() -> f64 {
    0.5
}

/// Default chance of a reply to a trigger reaction.
fn default_reaction_reply_chance() -> f64 {
    0.5
}

/// Default liveness bind address.
fn default_liveness_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Default base URL of the OpenAI-compatible completion server.
fn default_llm_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

/// Default model name.
fn default_llm_model() -> String {
    "TheBloke/vicuna-1.1-1B-HF".to_string()
}

/// Default max new tokens per answer.
fn default_llm_max_tokens() -> u32 {
    80
}

/// Default sampling temperature.
fn default_llm_temperature() -> f32 {
    0.7
}

/// Default nucleus sampling threshold.
fn default_llm_top_p() -> f32 {
    0.9
}

/// Default persona directive.
fn default_persona_directive() -> String {
    prompts::PERSONA_DIRECTIVE.to_string()
}

/// Which inference backend answers oracle questions.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// An OpenAI-compatible completion server.
    #[default]
    OpenAi,
    /// An in-process GGUF model (requires the `local-llm` feature).
    Local,
}

/// Configuration for the oracle-koala application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Discord bot token (`TOKEN`).
    pub token: String,
    /// Channel whose attachment posts get reactions and comments (`FLEX_CHANNEL_ID`).
    #[serde(default = "default_flex_channel_id")]
    pub flex_channel_id: u64,
    /// Probability of posting a comment on a flex post (`FLEX_COMMENT_CHANCE`).
    #[serde(default = "default_flex_comment_chance")]
    pub flex_comment_chance: f64,
    /// Probability of replying to a trigger reaction (`REACTION_REPLY_CHANCE`).
    #[serde(default = "default_reaction_reply_chance")]
    pub reaction_reply_chance: f64,
    /// Maximum number of remembered triggered messages; `0` keeps them all (`DEDUP_CAPACITY`).
    #[serde(default)]
    pub dedup_capacity: usize,
    /// Address the liveness endpoint binds to (`LIVENESS_BIND`).
    #[serde(default = "default_liveness_bind")]
    pub liveness_bind: String,
    /// Inference backend (`LLM_BACKEND`).
    #[serde(default)]
    pub llm_backend: LlmBackend,
    /// Base URL of the completion server (`LLM_BASE_URL`).
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    /// API key for the completion server, if it wants one (`LLM_API_KEY`).
    #[serde(default)]
    pub llm_api_key: String,
    /// Model name sent to the completion server (`LLM_MODEL`).
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Path to a GGUF file for the local backend (`LLM_MODEL_PATH`).
    #[serde(default)]
    pub llm_model_path: Option<String>,
    /// Max new tokens per answer (`LLM_MAX_TOKENS`).
    #[serde(default = "default_llm_max_tokens")]
    pub llm_max_tokens: u32,
    /// Sampling temperature (`LLM_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,
    /// Nucleus sampling threshold (`LLM_TOP_P`).
    #[serde(default = "default_llm_top_p")]
    pub llm_top_p: f32,
    /// Inference timeout in seconds; `0` waits forever (`LLM_TIMEOUT_SECS`).
    #[serde(default)]
    pub llm_timeout_secs: u64,
    /// Persona preamble placed before every question (`PERSONA_DIRECTIVE`).
    #[serde(default = "default_persona_directive")]
    pub persona_directive: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            token: String::new(),
            flex_channel_id: default_flex_channel_id(),
            flex_comment_chance: default_flex_comment_chance(),
            reaction_reply_chance: default_reaction_reply_chance(),
            dedup_capacity: 0,
            liveness_bind: default_liveness_bind(),
            llm_backend: LlmBackend::default(),
            llm_base_url: default_llm_base_url(),
            llm_api_key: String::new(),
            llm_model: default_llm_model(),
            llm_model_path: None,
            llm_max_tokens: default_llm_max_tokens(),
            llm_temperature: default_llm_temperature(),
            llm_top_p: default_llm_top_p(),
            llm_timeout_secs: 0,
            persona_directive: default_persona_directive(),
        }
    }
}

impl ConfigInner {
    /// The sampling parameters for oracle answers.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.llm_max_tokens,
            temperature: self.llm_temperature,
            top_p: self.llm_top_p,
        }
    }
}

impl Config {
    /// Load from the TOML file (explicit path, else `.hidden/config.toml`), then the process environment.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        Self::load_with_env(explicit_path, config::Environment::default())
    }

    fn load_with_env(explicit_path: Option<&std::path::Path>, env: config::Environment) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        // The environment wins over the file.
        cfg = cfg.add_source(env);

        let inner: ConfigInner = cfg.build()?.try_deserialize()?;
        let result = Config::from(inner);

        result.validate()?;

        Ok(result)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.token.trim().is_empty() {
            return Err(anyhow::anyhow!("Discord token must be set (`TOKEN`)."));
        }

        if !(0.0..=1.0).contains(&self.flex_comment_chance) {
            return Err(anyhow::anyhow!("Flex comment chance must be between 0 and 1."));
        }

        if !(0.0..=1.0).contains(&self.reaction_reply_chance) {
            return Err(anyhow::anyhow!("Reaction reply chance must be between 0 and 1."));
        }

        if self.llm_temperature < 0.0 || self.llm_temperature > 2.0 {
            return Err(anyhow::anyhow!("LLM temperature must be between 0 and 2."));
        }

        if self.llm_top_p <= 0.0 || self.llm_top_p > 1.0 {
            return Err(anyhow::anyhow!("LLM top-p must be greater than 0 and at most 1."));
        }

        if self.llm_max_tokens < 1 || self.llm_max_tokens > 4096 {
            return Err(anyhow::anyhow!("LLM max tokens must be between 1 and 4096."));
        }

        if self.llm_backend == LlmBackend::Local && self.llm_model_path.is_none() {
            return Err(anyhow::anyhow!("The local LLM backend needs `LLM_MODEL_PATH`."));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(f: impl FnOnce(&mut ConfigInner)) -> Config {
        let mut inner = ConfigInner {
            token: "discord-token".to_string(),
            ..Default::default()
        };
        f(&mut inner);
        Config::from(inner)
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<config::Map<String, String>>();
        config::Environment::default().source(Some(source))
    }

    fn toml_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_fills_missing_keys_with_defaults() {
        let (_dir, path) = toml_file("token = \"file-token\"\n");

        let config = Config::load_with_env(Some(&path), env(&[])).unwrap();

        assert_eq!(config.token, "file-token");
        assert_eq!(config.flex_channel_id, 1356627399004913846);
        assert_eq!(config.flex_comment_chance, 0.5);
        assert_eq!(config.dedup_capacity, 0);
        assert_eq!(config.liveness_bind, "0.0.0.0:8080");
        assert_eq!(config.llm_backend, LlmBackend::OpenAi);
        assert_eq!(config.llm_model, "TheBloke/vicuna-1.1-1B-HF");
        assert_eq!(config.llm_max_tokens, 80);
        assert_eq!(config.persona_directive, prompts::PERSONA_DIRECTIVE);
    }

    #[test]
    fn test_env_overrides_the_file() {
        let (_dir, path) = toml_file("token = \"file-token\"\nflex_channel_id = 111\nreaction_reply_chance = 0.25\nllm_model = \"file-model\"\n");

        let config = Config::load_with_env(
            Some(&path),
            env(&[("TOKEN", "env-token"), ("FLEX_CHANNEL_ID", "222"), ("LLM_MAX_TOKENS", "64"), ("LLM_TEMPERATURE", "1.1")]),
        )
        .unwrap();

        assert_eq!(config.token, "env-token");
        assert_eq!(config.flex_channel_id, 222);
        assert_eq!(config.llm_max_tokens, 64);
        assert_eq!(config.llm_temperature, 1.1);
        // Keys the environment leaves alone come from the file.
        assert_eq!(config.reaction_reply_chance, 0.25);
        assert_eq!(config.llm_model, "file-model");
    }

    #[test]
    fn test_load_from_env_alone() {
        let (_dir, path) = toml_file("");

        let config = Config::load_with_env(Some(&path), env(&[("TOKEN", "env-token"), ("LLM_BACKEND", "local"), ("LLM_MODEL_PATH", "/models/koala.gguf")])).unwrap();

        assert_eq!(config.token, "env-token");
        assert_eq!(config.llm_backend, LlmBackend::Local);
        assert_eq!(config.llm_model_path.as_deref(), Some("/models/koala.gguf"));
    }

    #[test]
    fn test_non_numeric_flex_channel_is_rejected() {
        let (_dir, path) = toml_file("");

        let result = Config::load_with_env(Some(&path), env(&[("TOKEN", "env-token"), ("FLEX_CHANNEL_ID", "flex-channel")]));

        assert!(result.is_err());
    }

    #[test]
    fn test_load_without_a_token_fails() {
        let (_dir, path) = toml_file("flex_channel_id = 5\n");

        assert!(Config::load_with_env(Some(&path), env(&[])).is_err());
    }

    #[test]
    fn test_load_validates_ranges() {
        let (_dir, path) = toml_file("token = \"file-token\"\n");

        assert!(Config::load_with_env(Some(&path), env(&[("FLEX_COMMENT_CHANCE", "2")])).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = config_with(|_| {});

        assert_eq!(config.flex_channel_id, 1356627399004913846);
        assert_eq!(config.flex_comment_chance, 0.5);
        assert_eq!(config.reaction_reply_chance, 0.5);
        assert_eq!(config.liveness_bind, "0.0.0.0:8080");
        assert_eq!(
            config.generation_params(),
            GenerationParams {
                max_tokens: 80,
                temperature: 0.7,
                top_p: 0.9
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let config = config_with(|c| c.token = "  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chances_must_be_probabilities() {
        assert!(config_with(|c| c.flex_comment_chance = 1.5).validate().is_err());
        assert!(config_with(|c| c.reaction_reply_chance = -0.1).validate().is_err());
        assert!(config_with(|c| c.reaction_reply_chance = 0.0).validate().is_ok());
        assert!(config_with(|c| c.flex_comment_chance = 1.0).validate().is_ok());
    }

    #[test]
    fn test_sampling_ranges_are_checked() {
        assert!(config_with(|c| c.llm_temperature = 2.5).validate().is_err());
        assert!(config_with(|c| c.llm_top_p = 0.0).validate().is_err());
        assert!(config_with(|c| c.llm_max_tokens = 0).validate().is_err());
    }

    #[test]
    fn test_local_backend_needs_a_model_path() {
        assert!(config_with(|c| c.llm_backend = LlmBackend::Local).validate().is_err());
        assert!(
            config_with(|c| {
                c.llm_backend = LlmBackend::Local;
                c.llm_model_path = Some("/models/koala.gguf".to_string());
            })
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_backend_names_deserialize() {
        let backend: LlmBackend = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(backend, LlmBackend::OpenAi);

        let backend: LlmBackend = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(backend, LlmBackend::Local);
    }
}
