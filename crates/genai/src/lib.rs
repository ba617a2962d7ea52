//! Generative-AI integration.
//!
//! - [`backend`] -- the two model calls every flow is built from.
//! - [`client`] -- REST client for a Gemini-style `generateContent` API.
//! - [`flows`] -- story analysis, storyboard and scene generation.
//! - [`prompts`] -- prompt templates used by the flows.

pub mod backend;
pub mod client;
pub mod error;
pub mod flows;
pub mod prompts;

pub use backend::{GenerationBackend, ImagePrompt};
pub use client::{GeminiClient, GeminiConfig};
pub use error::GenerationError;
