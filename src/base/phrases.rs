//! Fixed emoji and canned lines the koala uses.

/// Reactions added to every attachment post in the flex channel, in order.
pub const FLEX_REACTIONS: [&str; 2] = ["🐨", "🔥"];

/// Emoji that can trigger a reaction reply outside the flex channel.
pub const REACTION_TRIGGERS: [&str; 3] = ["💪", "🔥", "😎"];

/// Comments the koala may leave on a flex post.
pub const FLEX_COMMENTS: [&str; 3] = ["Now that’s proper fire, mate 🔥🐨", "Flex certified by the Oracle 🌿", "Looks like a drop bear wouldn’t stand a chance 💪🐨"];

/// Replies to a trigger reaction.
pub const REACTION_REPLIES: [&str; 4] = [
    "Oi mate, I see ya flexin’ 💪🐨",
    "That’s fire, mate 🔥🐨",
    "Cool as a gumtree in the breeze 😎🌿",
    "The oracle approves, mate 🐨✨",
];

/// Answers used when the model cannot.
pub const FALLBACK_RESPONSES: [&str; 3] = ["Oi mate, ask me something else! 🐨", "The oracle is pondering… try again 🌿", "G’day, give me a proper question! 🔥🐨"];

/// Sent when the bot is mentioned without a question.
pub const EMPTY_MENTION_PROMPT: &str = "G’day mate, what’s the question? 🐨";

/// Sent when handling a mention goes wrong.
pub const MENTION_APOLOGY: &str = "Oi mate, something went wonky";

/// Body of the liveness endpoint.
pub const LIVENESS_MESSAGE: &str = "Oracle Koala is running!";

/// Whether an emoji is one of the reaction triggers.
pub fn is_reaction_trigger(emoji: &str) -> bool {
    REACTION_TRIGGERS.contains(&emoji)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_triggers() {
        assert!(is_reaction_trigger("💪"));
        assert!(is_reaction_trigger("🔥"));
        assert!(is_reaction_trigger("😎"));
        assert!(!is_reaction_trigger("🐨"));
        assert!(!is_reaction_trigger("<:flex:123456789>"));
    }
}
