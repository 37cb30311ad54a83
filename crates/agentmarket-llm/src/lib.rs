//! AgentMarket LLM - Prompt Execution Service
//!
//! Turns `(agent type, prompt)` into model output:
//!
//! - Each agent type has a fixed system prompt ([`templates`])
//! - The composed prompt goes to a [`LLMProvider`] (Google Gemini in production)
//! - [`AgentExecutor`] never fails: provider errors come back as an
//!   [`ExecutionResult`] with `success == false`
//!
//! ## Providers
//! - Gemini: API key, model (default `gemini-pro`) and base URL via [`GeminiConfig`]
//! - Static: canned reply or canned failure, for offline runs and tests

pub mod executor;
pub mod providers;
pub mod templates;
pub mod types;

pub use executor::*;
pub use providers::*;
pub use types::*;
