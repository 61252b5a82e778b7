//! `rag search`: run one retrieval strategy directly.

use anyhow::{Context, Result};
use clap::Args;

use agentic_rag::{MetadataFilter, SearchBackend, SearchOptions, SearchRequest, SearchStrategy};

use super::search_backend;
use crate::config::Settings;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// hybrid, semantic, keyword, fulltext, text_match or phrase_match
    strategy: SearchStrategy,

    query: String,

    #[arg(long, default_value_t = 10)]
    top_k: usize,

    /// Re-rank candidates (semantic, hybrid)
    #[arg(long)]
    rerank: Option<bool>,

    /// Minimum similarity in [0, 1] (semantic, hybrid)
    #[arg(long)]
    similarity_threshold: Option<f32>,

    /// Weight of the vector side (hybrid)
    #[arg(long)]
    semantic_weight: Option<f32>,

    /// Weight of the lexical side (hybrid)
    #[arg(long)]
    keyword_weight: Option<f32>,

    /// Minimum matched keywords (keyword, fulltext)
    #[arg(long)]
    min_match_count: Option<u32>,

    /// `or` or `and` (fulltext)
    #[arg(long)]
    match_mode: Option<String>,

    /// `exact` or `fuzzy` (text_match)
    #[arg(long)]
    match_type: Option<String>,

    /// Case-sensitive matching (text_match, phrase_match)
    #[arg(long)]
    case_sensitive: Option<bool>,

    /// Allow partial phrase matches (phrase_match)
    #[arg(long)]
    allow_partial: Option<bool>,

    /// Include the full source text
    #[arg(long)]
    return_original_text: Option<bool>,

    /// Include the parent chunk
    #[arg(long)]
    return_parent_chunk: Option<bool>,
}

impl SearchArgs {
    fn to_request(&self, filter: &MetadataFilter) -> SearchRequest {
        SearchRequest::new(self.strategy, self.query.as_str(), self.top_k)
            .with_filter(filter.build())
            .with_options(SearchOptions {
                rerank_enabled: self.rerank,
                similarity_threshold: self.similarity_threshold,
                semantic_weight: self.semantic_weight,
                keyword_weight: self.keyword_weight,
                min_match_count: self.min_match_count,
                match_mode: self.match_mode.clone(),
                match_type: self.match_type.clone(),
                case_sensitive: self.case_sensitive,
                allow_partial: self.allow_partial,
                return_original_text: self.return_original_text,
                return_parent_chunk: self.return_parent_chunk,
            })
    }
}

pub async fn run(settings: &Settings, filter: &MetadataFilter, args: &SearchArgs) -> Result<()> {
    let request = args.to_request(filter);
    let results = search_backend(settings)
        .search(&request)
        .await
        .with_context(|| format!("{} search against {}", request.strategy, settings.retrieval_base_url))?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SearchArgs,
    }

    #[test]
    fn test_parses_strategy_and_options() {
        let harness = Harness::parse_from([
            "rag",
            "text-match",
            "graph neural networks",
            "--top-k",
            "5",
            "--case-sensitive",
            "true",
        ]);
        let request = harness
            .args
            .to_request(&MetadataFilter::new().with_title("GNN"));

        assert_eq!(request.strategy, SearchStrategy::TextMatch);
        assert_eq!(request.query, "graph neural networks");
        assert_eq!(request.top_k, 5);
        assert_eq!(request.options.case_sensitive, Some(true));
        assert_eq!(request.options.rerank_enabled, None);
        assert_eq!(request.filter_expression.as_deref(), Some(r#"title like "%GNN%""#));
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        assert!(Harness::try_parse_from(["rag", "vector", "q"]).is_err());
    }
}
