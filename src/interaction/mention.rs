//! Answers for messages that @-mention the koala.

use crate::{
    base::phrases::{EMPTY_MENTION_PROMPT, MENTION_APOLOGY},
    prelude::*,
};

/// Remove mentions of the bot (`<@id>` and the nickname form `<@!id>`) and trim.
pub fn question_from_mention(content: &str, bot_user_id: u64) -> String {
    content.replace(&format!("<@{bot_user_id}>"), "").replace(&format!("<@!{bot_user_id}>"), "").trim().to_string()
}

/// Handles a message that mentions the bot.
///
/// Any failure is swapped for an apology in the same channel.
#[instrument(skip_all)]
pub async fn handle_mention(message: &ChatMessage, ctx: &BotContext) {
    // Process the event.
    let result = handle_mention_internal(message, ctx).await;

    // Log any errors, and apologise.
    if let Err(err) = &result {
        error!("Error in mention handling: {}", err);

        if let Err(err) = ctx.chat.send_message(message.channel_id, MENTION_APOLOGY).await {
            error!("Failed to send apology: {}", err);
        }
    }
}

#[instrument(skip_all)]
async fn handle_mention_internal(message: &ChatMessage, ctx: &BotContext) -> Void {
    let question = question_from_mention(&message.content, ctx.chat.bot_user_id());

    if question.is_empty() {
        return ctx.chat.send_message(message.channel_id, EMPTY_MENTION_PROMPT).await;
    }

    info!("Consulting the oracle for message {} ...", message.id);

    let answer = ctx.oracle.ask(&question).await;
    ctx.chat.send_message(message.channel_id, &answer).await
}
