//! Core components, types, and utilities for the koala.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The persona prompt and the fixed phrase pools.
//! - Common types and result handling.

pub mod config;
pub mod phrases;
pub mod prompts;
pub mod types;
