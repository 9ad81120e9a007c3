//! npmup - keeps npm and globally installed AI assistant CLIs current
//!
//! This library provides the core functionality for checking and updating
//! global npm installations:
//! - npm itself
//! - Gemini CLI (@google/gemini-cli)
//! - OpenAI Codex CLI (@openai/codex)

pub mod checker;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod npm;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod prompt;
