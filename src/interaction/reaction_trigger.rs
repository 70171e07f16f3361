//! One-off replies to trigger reactions outside the flex channel.

use crate::{
    base::phrases::{REACTION_REPLIES, is_reaction_trigger},
    prelude::*,
};

/// Handles a reaction added to a message.
///
/// A message is evaluated at most once: the first trigger emoji marks it,
/// whether or not the roll produces a reply.
#[instrument(skip_all)]
pub async fn handle_reaction(reaction: &ChatReaction, ctx: &BotContext) {
    // Process the event.
    let result = handle_reaction_internal(reaction, ctx).await;

    // Log any errors.
    if let Err(err) = &result {
        error!("Failed to reply to reaction: {}", err);
    }
}

#[instrument(skip_all)]
async fn handle_reaction_internal(reaction: &ChatReaction, ctx: &BotContext) -> Void {
    if reaction.channel_id == ctx.config.flex_channel_id {
        return Ok(());
    }

    if ctx.dedup.contains(reaction.message_id) {
        debug!("Message {} already triggered.", reaction.message_id);
        return Ok(());
    }

    if !is_reaction_trigger(&reaction.emoji) {
        return Ok(());
    }

    // Another task may have marked it since the check above.
    if !ctx.dedup.mark(reaction.message_id) {
        return Ok(());
    }

    if ctx.dice.chance(ctx.config.reaction_reply_chance) {
        let reply = ctx.dice.choose(&REACTION_REPLIES);

        info!("Replying to {} on message {} ...", reaction.emoji, reaction.message_id);
        ctx.chat.send_message(reaction.channel_id, reply).await?;
    }

    Ok(())
}
