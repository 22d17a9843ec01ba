//! Chat completion outbound adapters.
//!
//! This module provides an HTTP implementation of the `ChatCompletion` port
//! for OpenAI-compatible providers.

mod dto;
mod http_client;

pub use http_client::{OpenAiChatClient, OpenAiChatSettings};
