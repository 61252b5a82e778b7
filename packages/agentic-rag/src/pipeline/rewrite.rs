//! Query rewriting.

use tracing::{debug, warn};

use super::prompts::rewrite_messages;
use crate::traits::generator::Generator;

/// Sharpens a query for retrieval, keeping its meaning.
pub struct QueryRewriter<'a, G: Generator + ?Sized> {
    generator: &'a G,
}

impl<'a, G: Generator + ?Sized> QueryRewriter<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    /// Rewrite `original`, optionally informed by what earlier iterations
    /// learned. Returns `original` unchanged when the backend gives nothing.
    pub async fn rewrite(&self, original: &str, context: Option<&str>) -> String {
        let reply = self
            .generator
            .complete(&rewrite_messages(original, context))
            .await;

        match reply.as_deref().map(str::trim) {
            Some(rewritten) if !rewritten.is_empty() => {
                debug!(original, rewritten, "query rewritten");
                rewritten.to_string()
            }
            _ => {
                warn!("query rewrite unavailable, keeping original query");
                original.to_string()
            }
        }
    }
}
