//! Runtime services and shared state for the koala.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{chat::ChatClient, dedup::DedupTracker, dice::Dice, liveness::Readiness, llm::LlmClient, oracle::Oracle},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and every service the handlers use.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The oracle responder.
    pub oracle: Oracle,
    /// Messages that already triggered a reaction reply.
    pub dedup: DedupTracker,
    /// Source of randomness.
    pub dice: Dice,
    /// Readiness reported by the liveness endpoint.
    pub readiness: Readiness,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// The readiness is owned by the already running liveness endpoint.
    #[instrument(skip_all)]
    pub async fn new(config: Config, readiness: Readiness) -> Res<Self> {
        let dice = Dice::thread_rng();
        let dedup = DedupTracker::with_capacity(config.dedup_capacity);

        // Initialize the LLM client.
        let llm = LlmClient::from_config(&config).await?;
        let oracle = Oracle::new(&config, llm, dice.clone());

        // Initialize the discord client.
        let chat = ChatClient::discord(&config, oracle.clone(), dedup.clone(), dice.clone(), readiness.clone()).await?;

        Ok(Self {
            config,
            oracle,
            dedup,
            dice,
            readiness,
            chat,
        })
    }

    /// Run the chat client until shutdown.
    pub async fn start(&self) -> Void {
        info!("Connecting to Discord ...");

        self.chat.start().await
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

