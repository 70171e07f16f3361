pub mod discord;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{SlashCommand, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Discord. Implementing this trait allows different chat services to be used
/// with the koala.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to strip mentions of the bot from questions.
    fn bot_user_id(&self) -> u64;

    /// Start the chat client listener.
    ///
    /// This connects to the platform and dispatches incoming events until shutdown.
    async fn start(&self) -> Void;

    /// Send a plain text message to a channel.
    async fn send_message(&self, channel_id: u64, text: &str) -> Void;

    /// React to a message with an emoji.
    async fn react_to_message(&self, channel_id: u64, message_id: u64, emoji: &str) -> Void;

    /// Acknowledge a slash command now and promise a follow-up.
    async fn defer_command(&self, command: &SlashCommand) -> Void;

    /// Send the follow-up for a deferred slash command.
    async fn send_followup(&self, command: &SlashCommand, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
