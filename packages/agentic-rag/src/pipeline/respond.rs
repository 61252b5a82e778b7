//! Final answer generation.

use tracing::{info, warn};

use super::prompts::answer_messages;
use crate::traits::generator::Generator;

/// Returned when the backend produces no answer.
pub const APOLOGY_TEXT: &str = "Sorry, unable to generate a response.";

/// Answers a query strictly from evidence.
pub struct ResponseGenerator<'a, G: Generator + ?Sized> {
    generator: &'a G,
}

impl<'a, G: Generator + ?Sized> ResponseGenerator<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    pub async fn generate(&self, query: &str, evidence: &str) -> String {
        let reply = self
            .generator
            .complete(&answer_messages(query, evidence))
            .await;

        match reply.as_deref().map(str::trim) {
            Some(answer) if !answer.is_empty() => {
                info!(chars = answer.chars().count(), "answer generated");
                answer.to_string()
            }
            _ => {
                warn!("answer generation failed, returning apology");
                APOLOGY_TEXT.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prompts::PromptKind;
    use crate::testing::MockGenerator;

    #[tokio::test]
    async fn test_generate_returns_answer() {
        let generator = MockGenerator::new().with_reply(PromptKind::Answer, "Paris.");

        let answer = ResponseGenerator::new(&generator)
            .generate("capital of France?", "Paris is the capital of France.")
            .await;

        assert_eq!(answer, "Paris.");
        let call = &generator.calls()[0];
        assert!(call.messages[1].content.contains("Paris is the capital of France."));
    }

    #[tokio::test]
    async fn test_generate_apologises_on_failure() {
        for generator in [
            MockGenerator::new(),
            MockGenerator::new().with_reply(PromptKind::Answer, ""),
        ] {
            let answer = ResponseGenerator::new(&generator).generate("q", "e").await;
            assert_eq!(answer, APOLOGY_TEXT);
        }
    }
}
