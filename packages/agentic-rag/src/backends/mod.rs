//! Collaborator implementations.
//!
//! [`HttpSearchBackend`] talks to the retrieval service over JSON/HTTP.
//! [`ChatGenerator`] (feature `openai`) drives any OpenAI-compatible chat
//! completions endpoint. Tests use the doubles in [`crate::testing`].

mod http;
pub use http::{HttpSearchBackend, DEFAULT_COLLECTION, DEFAULT_RETRIEVAL_URL};

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::ChatGenerator;
