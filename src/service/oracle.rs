//! The oracle: persona prompt in, koala wisdom out.
//!
//! [`Oracle::consult`] reports whether the model answered; [`Oracle::ask`]
//! turns a failed consultation into one of the canned fallback lines, so
//! callers always get something to post.

use std::time::Duration;

use tracing::{instrument, warn};

use crate::{
    base::{
        config::Config,
        phrases::FALLBACK_RESPONSES,
        prompts::{build_prompt, strip_prompt},
        types::OracleOutcome,
    },
    service::{dice::Dice, llm::LlmClient},
};

/// Oracle responder.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Oracle {
    config: Config,
    llm: LlmClient,
    dice: Dice,
}

impl Oracle {
    pub fn new(config: &Config, llm: LlmClient, dice: Dice) -> Self {
        Self { config: config.clone(), llm, dice }
    }

    /// Ask the model once, without falling back.
    #[instrument(skip_all)]
    pub async fn consult(&self, question: &str) -> OracleOutcome {
        let prompt = build_prompt(&self.config.persona_directive, question);
        let params = self.config.generation_params();

        let completion = self.llm.complete(&prompt, &params);

        let result = if self.config.llm_timeout_secs > 0 {
            match tokio::time::timeout(Duration::from_secs(self.config.llm_timeout_secs), completion).await {
                Ok(result) => result,
                Err(_) => return OracleOutcome::Fallback(format!("inference timed out after {}s", self.config.llm_timeout_secs)),
            }
        } else {
            completion.await
        };

        match result {
            Ok(output) => {
                let answer = strip_prompt(&output, &prompt);

                if answer.is_empty() {
                    OracleOutcome::Fallback("model returned nothing beyond the prompt".to_string())
                } else {
                    OracleOutcome::Answer(answer)
                }
            }
            Err(err) => OracleOutcome::Fallback(err.to_string()),
        }
    }

    /// Answer a question; never fails.
    #[instrument(skip_all)]
    pub async fn ask(&self, question: &str) -> String {
        match self.consult(question).await {
            OracleOutcome::Answer(answer) => answer,
            OracleOutcome::Fallback(reason) => {
                warn!("Oracle fell back: {}", reason);
                self.fallback()
            }
        }
    }

    /// One of the canned fallback answers.
    pub fn fallback(&self) -> String {
        self.dice.choose(&FALLBACK_RESPONSES).to_string()
    }
}

// Tests.
