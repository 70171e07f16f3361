//! Library root for `oracle-koala`.
//!
//! Oracle Koala is a cheeky Australian koala living in a Discord server:
//! - Reacts to attachment posts in the flex channel, sometimes with a comment
//! - Answers @-mentions and `/koala` questions with a generative model
//! - Falls back to canned lines when the model is not up to it
//! - Replies, at most once per message, to a few hype reactions
//!
//! The bot integrates with Discord (via serenity) for chat and with any
//! OpenAI-compatible completion server, or an in-process GGUF model, for
//! answers. Each service sits behind a trait so it can be swapped or mocked.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use service::liveness::{self, Readiness};
use tracing::{error, info};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the koala runtime:
/// - Starts the liveness endpoint before anything slow or fallible
/// - Creates the runtime context with the oracle, dedup tracker and chat client
/// - Starts the Discord event loop
///
/// If the bot fails, the liveness endpoint keeps serving until a shutdown
/// signal, and the failure is returned afterwards.
pub async fn start(config: Config) -> Void {
    info!("Starting oracle-koala ...");

    // Start the liveness endpoint.
    let readiness = Readiness::new();
    let listener = liveness::bind(&config.liveness_bind).await?;
    let mut liveness_task = tokio::spawn(liveness::serve(listener, readiness.clone()));

    // Initialize and start the runtime.
    let result = async {
        let runtime = runtime::Runtime::new(config, readiness).await?;
        runtime.start().await
    }
    .await;

    let Err(err) = result else {
        liveness_task.abort();
        return Ok(());
    };

    error!("Koala stopped: {}", err);
    info!("Liveness endpoint stays up until shutdown ...");

    tokio::select! {
        _ = runtime::shutdown_signal() => {}
        served = &mut liveness_task => match served {
            Ok(Err(e)) => error!("Liveness endpoint error: {}", e),
            Err(e) => error!("Liveness endpoint task failed: {}", e),
            Ok(Ok(())) => {}
        },
    }

    Err(err)
}
