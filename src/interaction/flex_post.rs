//! Reactions and comments for attachment posts in the flex channel.

use crate::{
    base::phrases::{FLEX_COMMENTS, FLEX_REACTIONS},
    prelude::*,
};

/// Handles an attachment post in the flex channel.
///
/// Both reactions are always attempted; a comment follows on a lucky roll.
#[instrument(skip_all)]
pub async fn handle_flex_post(message: &ChatMessage, ctx: &BotContext) {
    // Process the event.
    let result = handle_flex_post_internal(message, ctx).await;

    // Log any errors.
    if let Err(err) = &result {
        error!("Flex channel comment error: {}", err);
    }
}

#[instrument(skip_all)]
async fn handle_flex_post_internal(message: &ChatMessage, ctx: &BotContext) -> Void {
    for emoji in FLEX_REACTIONS {
        if let Err(err) = ctx.chat.react_to_message(message.channel_id, message.id, emoji).await {
            warn!("Flex channel reaction error ({}): {}", emoji, err);
        }
    }

    if ctx.dice.chance(ctx.config.flex_comment_chance) {
        let comment = ctx.dice.choose(&FLEX_COMMENTS);

        info!("Commenting on flex post {} ...", message.id);
        ctx.chat.send_message(message.channel_id, comment).await?;
    }

    Ok(())
}
