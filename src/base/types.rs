pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Sampling parameters handed to every generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Outcome of a single consultation of the oracle model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleOutcome {
    /// The model produced usable text.
    Answer(String),
    /// The model could not answer; carries the reason for the logs.
    Fallback(String),
}

/// A chat message, reduced to what the handlers look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub channel_id: u64,
    pub author_is_bot: bool,
    pub content: String,
    pub attachment_count: usize,
    pub mentions_bot: bool,
}

impl ChatMessage {
    pub fn has_attachments(&self) -> bool {
        self.attachment_count > 0
    }
}

/// A reaction added to some message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReaction {
    pub channel_id: u64,
    pub message_id: u64,
    pub user_id: Option<u64>,
    pub emoji: String,
}

/// An invoked slash command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashCommand {
    pub interaction_id: u64,
    pub token: String,
    pub name: String,
    pub question: Option<String>,
}
