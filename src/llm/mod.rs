//! LLM boundary
//!
//! Producers only see [`LanguageModel`]; the concrete client is picked from
//! the `llm` section of the workspace config.

use crate::domain::LlmConfig;
use crate::errors::{CrevError, CrevResult};
use anyhow::Result;

pub mod anthropic;

pub use anthropic::ClaudeClient;

/// A text-in, text-out model call. Failures become stage failures.
pub trait LanguageModel {
    fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Build the client for the configured provider.
///
/// Unknown providers and missing credentials are configuration errors, so the
/// invocation aborts before any unit is processed.
pub fn build_client(config: &LlmConfig) -> CrevResult<Box<dyn LanguageModel>> {
    match config.provider.to_ascii_lowercase().as_str() {
        "claude" | "anthropic" => Ok(Box::new(ClaudeClient::from_env(config)?)),
        other => Err(CrevError::Configuration(format!(
            "Unsupported LLM provider: {other}. Currently supported: claude"
        ))),
    }
}
