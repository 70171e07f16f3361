//! Event handling and user interactions for the koala.
//!
//! The chat service turns platform events into [`ChatMessage`],
//! [`ChatReaction`] and [`SlashCommand`] values and hands them to the
//! dispatchers here, together with a [`BotContext`]:
//! - Attachment posts in the flex channel get reactions and maybe a comment
//! - Mentions and `/koala` get an answer from the oracle
//! - Trigger reactions elsewhere get at most one reply per message

pub mod flex_post;
pub mod mention;
pub mod reaction_trigger;
pub mod slash_command;

use tracing::{debug, instrument};

use crate::{
    base::{
        config::Config,
        types::{ChatMessage, ChatReaction, SlashCommand},
    },
    service::{chat::ChatClient, dedup::DedupTracker, dice::Dice, oracle::Oracle},
};

/// Everything a handler needs, passed explicitly.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct BotContext {
    pub config: Config,
    pub oracle: Oracle,
    pub dedup: DedupTracker,
    pub dice: Dice,
    pub chat: ChatClient,
}

/// Route a new message.
///
/// A message can be both a flex post and a mention; both handlers run.
#[instrument(skip_all, fields(message_id = message.id, channel_id = message.channel_id))]
pub async fn dispatch_message(message: &ChatMessage, ctx: &BotContext) {
    if message.author_is_bot {
        debug!("Ignoring message from a bot.");
        return;
    }

    if message.channel_id == ctx.config.flex_channel_id && message.has_attachments() {
        flex_post::handle_flex_post(message, ctx).await;
    }

    if message.mentions_bot {
        mention::handle_mention(message, ctx).await;
    }
}

/// Route an added reaction.
#[instrument(skip_all, fields(message_id = reaction.message_id, channel_id = reaction.channel_id))]
pub async fn dispatch_reaction(reaction: &ChatReaction, ctx: &BotContext) {
    if reaction.user_id == Some(ctx.chat.bot_user_id()) {
        debug!("Ignoring our own reaction.");
        return;
    }

    reaction_trigger::handle_reaction(reaction, ctx).await;
}

/// Route an invoked slash command.
#[instrument(skip_all, fields(command = %command.name))]
pub async fn dispatch_command(command: &SlashCommand, ctx: &BotContext) {
    slash_command::handle_command(command, ctx).await;
}
