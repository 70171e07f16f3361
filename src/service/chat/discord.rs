//! Discord integration for the koala.
//!
//! This module provides the serenity-backed implementation of
//! `GenericChatClient`:
//! - Receiving gateway events and converting them for the dispatchers
//! - Sending messages, reactions and slash command follow-ups
//! - Registering the `/koala` command once the session is ready

use std::sync::Arc;

use async_trait::async_trait;
use serenity::{
    builder::{CreateCommand, CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage},
    http::Http,
    model::{
        application::{Command, CommandInteraction, CommandOptionType, Interaction},
        channel::{Message, Reaction, ReactionType},
        gateway::{GatewayIntents, Ready},
        id::{ChannelId, InteractionId, MessageId},
    },
    gateway::{ConnectionStage, ShardStageUpdateEvent},
    prelude::{Context, EventHandler},
};
use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{ChatMessage, ChatReaction, Res, SlashCommand, Void},
    },
    interaction::{
        self, BotContext,
        slash_command::{KOALA_COMMAND, KOALA_DESCRIPTION, QUESTION_DESCRIPTION, QUESTION_OPTION},
    },
    runtime::shutdown_signal,
    service::{dedup::DedupTracker, dice::Dice, liveness::Readiness, oracle::Oracle},
};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the discord implementation.

impl ChatClient {
    /// Creates a new Discord chat client.
    pub async fn discord(config: &Config, oracle: Oracle, dedup: DedupTracker, dice: Dice, readiness: Readiness) -> Res<Self> {
        let client = DiscordChatClient::new(config, oracle, dedup, dice, readiness).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<DiscordChatClient> for ChatClient {
    fn from(client: DiscordChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// Discord client implementation.
#[derive(Clone)]
struct DiscordChatClient {
    pub config: Config,
    pub http: Arc<Http>,
    pub bot_user_id: u64,
    pub oracle: Oracle,
    pub dedup: DedupTracker,
    pub dice: Dice,
    pub readiness: Readiness,
}

impl DiscordChatClient {
    /// Create a new Discord chat client.
    #[instrument(name = "DiscordChatClient::new", skip_all)]
    pub async fn new(config: &Config, oracle: Oracle, dedup: DedupTracker, dice: Dice, readiness: Readiness) -> Res<Self> {
        let http = Arc::new(Http::new(&config.token));

        // Get the bot's user ID.

        let bot_user = http.get_current_user().await.map_err(|e| anyhow::anyhow!("Failed to log in to Discord: {}", e))?;
        let bot_user_id = bot_user.id.get();

        info!("Discord bot user ID: {}", bot_user_id);

        Ok(Self {
            config: config.clone(),
            http,
            bot_user_id,
            oracle,
            dedup,
            dice,
            readiness,
        })
    }
}

#[async_trait]
impl GenericChatClient for DiscordChatClient {
    fn bot_user_id(&self) -> u64 {
        self.bot_user_id
    }

    async fn start(&self) -> Void {
        let handler = DiscordHandler {
            context: BotContext {
                config: self.config.clone(),
                oracle: self.oracle.clone(),
                dedup: self.dedup.clone(),
                dice: self.dice.clone(),
                chat: ChatClient::from(self.clone()),
            },
            readiness: self.readiness.clone(),
        };

        let mut client = serenity::Client::builder(&self.config.token, gateway_intents())
            .event_handler(handler)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

        // Close all shards on SIGTERM or Ctrl+C.
        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, stopping Discord client ...");
            shard_manager.shutdown_all().await;
        });

        info!("Starting Discord gateway connection ...");

        client.start().await.map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

        info!("Discord bot stopped.");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: u64, text: &str) -> Void {
        let builder = CreateMessage::new().content(text);

        ChannelId::new(channel_id)
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn react_to_message(&self, channel_id: u64, message_id: u64, emoji: &str) -> Void {
        let reaction = ReactionType::Unicode(emoji.to_string());

        self.http
            .create_reaction(ChannelId::new(channel_id), MessageId::new(message_id), &reaction)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to react to message: {}", e))?;

        Ok(())
    }

    #[instrument(skip_all)]
    async fn defer_command(&self, command: &SlashCommand) -> Void {
        let response = CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new());

        self.http
            .create_interaction_response(InteractionId::new(command.interaction_id), &command.token, &response, Vec::new())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to defer interaction {}: {}", command.interaction_id, e))?;

        Ok(())
    }

    #[instrument(skip_all)]
    async fn send_followup(&self, command: &SlashCommand, text: &str) -> Void {
        let builder = CreateInteractionResponseFollowup::new().content(text);

        self.http
            .create_followup_message(&command.token, &builder, Vec::new())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send follow-up for interaction {}: {}", command.interaction_id, e))?;

        Ok(())
    }
}

// Gateway event handler.

/// Serenity event handler that feeds the dispatchers.
struct DiscordHandler {
    context: BotContext,
    readiness: Readiness,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.name);

        self.readiness.set_ready(ready.user.name.clone()).await;

        if let Err(e) = Command::set_global_commands(&ctx.http, vec![koala_command()]).await {
            error!("Failed to register slash commands: {}", e);
        }
    }

    async fn shard_stage_update(&self, _ctx: Context, event: ShardStageUpdateEvent) {
        info!("Shard {:?} moved from {:?} to {:?}", event.shard_id, event.old, event.new);

        self.readiness.set_connected(is_connected(event.new));
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let message = to_chat_message(&msg, self.context.chat.bot_user_id());
        interaction::dispatch_message(&message, &self.context).await;
    }

    async fn reaction_add(&self, _ctx: Context, add_reaction: Reaction) {
        let reaction = to_chat_reaction(&add_reaction);
        interaction::dispatch_reaction(&reaction, &self.context).await;
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(cmd) => {
                let command = to_slash_command(&cmd);
                interaction::dispatch_command(&command, &self.context).await;
            }
            _ => {
                warn!("Received unhandled interaction.");
            }
        }
    }
}

// Helpers.

/// Intents for messages, their content, and reactions.
fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
}

fn is_connected(stage: ConnectionStage) -> bool {
    matches!(stage, ConnectionStage::Connected)
}

/// The `/koala question:<text>` command definition.
fn koala_command() -> CreateCommand {
    CreateCommand::new(KOALA_COMMAND)
        .description(KOALA_DESCRIPTION)
        .add_option(CreateCommandOption::new(CommandOptionType::String, QUESTION_OPTION, QUESTION_DESCRIPTION).required(true))
}

fn to_chat_message(msg: &Message, bot_user_id: u64) -> ChatMessage {
    ChatMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
        attachment_count: msg.attachments.len(),
        mentions_bot: msg.mentions.iter().any(|u| u.id.get() == bot_user_id),
    }
}

fn to_chat_reaction(reaction: &Reaction) -> ChatReaction {
    ChatReaction {
        channel_id: reaction.channel_id.get(),
        message_id: reaction.message_id.get(),
        user_id: reaction.user_id.map(|u| u.get()),
        emoji: reaction.emoji.to_string(),
    }
}

fn to_slash_command(cmd: &CommandInteraction) -> SlashCommand {
    SlashCommand {
        interaction_id: cmd.id.get(),
        token: cmd.token.clone(),
        name: cmd.data.name.clone(),
        question: cmd.data.options.iter().find(|o| o.name == QUESTION_OPTION).and_then(|o| o.value.as_str()).map(str::to_string),
    }
}

// Tests.
