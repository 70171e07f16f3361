//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by the koala:
//! - Chat services (e.g., Discord)
//! - LLM services (e.g., an OpenAI-compatible server)
//! - The oracle, dedup tracker, dice and liveness endpoint built on top
//!
//! Each external service module defines both a generic trait and concrete
//! implementations, allowing for extensibility and easy testing.

pub mod chat;
pub mod dedup;
pub mod dice;
pub mod liveness;
pub mod llm;
pub mod oracle;
