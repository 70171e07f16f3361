//! The `/koala` slash command.

use crate::{base::phrases::EMPTY_MENTION_PROMPT, prelude::*};

/// Name of the slash command.
pub const KOALA_COMMAND: &str = "koala";

/// Description shown in the command picker.
pub const KOALA_DESCRIPTION: &str = "Ask Oracle Koala a question";

/// Name of the required string option.
pub const QUESTION_OPTION: &str = "question";

/// Description of the question option.
pub const QUESTION_DESCRIPTION: &str = "What do you want to ask the oracle?";

/// Handles an invoked slash command.
#[instrument(skip_all)]
pub async fn handle_command(command: &SlashCommand, ctx: &BotContext) {
    if command.name != KOALA_COMMAND {
        warn!("Unknown command: {}", command.name);
        return;
    }

    // Process the event.
    let result = handle_koala_command(command, ctx).await;

    // Log any errors.
    if let Err(err) = &result {
        error!("Error while handling /{}: {}", KOALA_COMMAND, err);
    }
}

/// Defer, ask the oracle, and follow up with the answer.
#[instrument(skip_all)]
async fn handle_koala_command(command: &SlashCommand, ctx: &BotContext) -> Void {
    // Inference can outlast the three second interaction window.
    ctx.chat.defer_command(command).await?;

    let answer = match command.question.as_deref().map(str::trim) {
        Some(question) if !question.is_empty() => ctx.oracle.ask(question).await,
        _ => EMPTY_MENTION_PROMPT.to_string(),
    };

    ctx.chat.send_followup(command, &answer).await
}
