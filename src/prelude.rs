pub use crate::base::{
    config::Config,
    types::{ChatMessage, ChatReaction, Err, Res, SlashCommand, Void},
};
pub use crate::interaction::BotContext;
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
