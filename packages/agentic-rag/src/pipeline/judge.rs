//! Sufficiency judgment.
//!
//! The judge leans toward "sufficient": an unreachable backend or an
//! unrecognised verdict both end the loop with an answer instead of another
//! round of retrieval.

use tracing::{debug, warn};

use super::prompts::judge_messages;
use crate::traits::generator::Generator;
use crate::types::config::JudgeMarkers;

/// Decides whether evidence is enough to answer a query.
pub struct SufficiencyJudge<'a, G: Generator + ?Sized> {
    generator: &'a G,
    markers: &'a JudgeMarkers,
}

impl<'a, G: Generator + ?Sized> SufficiencyJudge<'a, G> {
    pub fn new(generator: &'a G, markers: &'a JudgeMarkers) -> Self {
        Self { generator, markers }
    }

    pub async fn is_sufficient(&self, query: &str, evidence: &str) -> bool {
        if evidence.trim().is_empty() {
            debug!("no evidence, judging insufficient without a backend call");
            return false;
        }

        let Some(reply) = self
            .generator
            .complete(&judge_messages(query, evidence))
            .await
        else {
            warn!("judge unavailable, assuming sufficient");
            return true;
        };

        match self.verdict(&reply) {
            Some(sufficient) => {
                debug!(sufficient, "judge verdict");
                sufficient
            }
            None => {
                warn!(reply = %reply.trim(), "ambiguous judge verdict, assuming sufficient");
                true
            }
        }
    }

    /// Parse a verdict. The English sufficiency marker is a substring of its
    /// negation, so insufficiency is checked first.
    fn verdict(&self, reply: &str) -> Option<bool> {
        let reply = reply.trim().to_lowercase();
        let contains = |markers: &[String]| {
            markers
                .iter()
                .any(|m| !m.is_empty() && reply.contains(&m.to_lowercase()))
        };

        if contains(&self.markers.insufficient) {
            Some(false)
        } else if contains(&self.markers.sufficient) {
            Some(true)
        } else {
            None
        }
    }
}
