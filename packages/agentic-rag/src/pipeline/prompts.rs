//! LLM prompts for the RAG pipeline.
//!
//! Each call site sends one system prompt and one user message built from a
//! template. The system prompts double as identifiers: [`PromptKind::of`]
//! tells which call site produced a conversation.

use crate::types::message::{Message, Role};

/// System prompt for query rewriting.
pub const REWRITE_SYSTEM_PROMPT: &str = "You are a query understanding and rewriting assistant. \
Analyze the intent of the user's query and rewrite it into a form better suited to document retrieval. \
If context from earlier attempts is provided, use it to understand what the user really needs. \
The rewritten query must keep the original intent while being clearer and more specific. \
Reply with the rewritten query only.";

/// User template for query rewriting.
pub const REWRITE_USER_TEMPLATE: &str = "Original query: {query}{context}\nRewritten query:";

/// System prompt for evidence fusion.
pub const FUSION_SYSTEM_PROMPT: &str = "You are an information analysis assistant. \
Read the user's query and the retrieved passages, then:\n\
1. Extract every piece of information directly relevant to the query\n\
2. Ignore unrelated content\n\
3. Merge the relevant information into one coherent text\n\
4. Do not add anything that is not present in the passages\n\
5. If nothing is relevant, reply exactly: No relevant information";

/// User template for evidence fusion.
pub const FUSION_USER_TEMPLATE: &str = "Query: {query}\n\n\
Retrieved passages to merge:\n{context}\n\n\
Merged information:";

/// System prompt for the sufficiency judgment.
pub const JUDGE_SYSTEM_PROMPT: &str = "You are an evidence assessment expert. \
Compare the user's query with the available information:\n\
1. Regardless of its length, if the information contains what is needed to form a complete and accurate answer, reply 'sufficient'\n\
2. If key content is missing and the question cannot be answered, reply 'insufficient', even when the information is long\n\
3. Some answers are naturally short (yes/no, a specific date or year); these still count as 'sufficient'\n\
4. Reply with exactly one word, 'sufficient' or 'insufficient', and nothing else";

/// User template for the sufficiency judgment.
pub const JUDGE_USER_TEMPLATE: &str = "Query: {query}\n\n\
Available information:\n{evidence}\n\n\
Verdict:";

/// System prompt for the final answer.
pub const ANSWER_SYSTEM_PROMPT: &str = "You are a question answering assistant. \
Answer the user's question using only the provided information. \
Be accurate, complete and clear, and do not add outside content. \
If the information is insufficient, say that you cannot answer.";

/// User template for the final answer.
pub const ANSWER_USER_TEMPLATE: &str = "Query: {query}\n\n\
Available information:\n{evidence}\n\n\
Answer the question based on the information above:";

/// Single prompt for one-shot answering over a knowledge base.
pub const SINGLE_PASS_PROMPT: &str = r#"# Role
You are a knowledge base engine that presents knowledge clearly, rigorously and in a structured way.

# Core rule: relevance
First decide whether the knowledge base content is related to the user's question.
- Use scenario three only when every document is unrelated to the question.
- Otherwise build the answer on the knowledge base and pick scenario one or two by how complete it is.

# Scenarios (pick one)

## Scenario one: highly relevant and sufficient
Integrate, distill and structure the knowledge base into a coherent, complete answer.

## Scenario two: relevant but limited
1. Summarize the core information from the knowledge base accurately.
2. Explain and extend it with general expert knowledge.
End with: "Note: the core of this answer comes from the provided knowledge base; [extended parts] are supplemented from general knowledge."

## Scenario three: unrelated
1. State: "The knowledge base contains nothing directly related to '[restated question]'."
2. Then add: "Based on general knowledge, '[restated question]' can usually be understood as follows:" and give a brief general answer.

# Output
- Professional, rigorous, objective and concise.
- Use Markdown.
- Use LaTeX for formulas.

# Knowledge base
{knowledge}

# User question
{query}"#;

/// Which call site a conversation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Rewrite,
    Fusion,
    Judge,
    Answer,
    SinglePass,
    Other,
}

impl PromptKind {
    /// Classify a conversation by its system prompt.
    pub fn of(messages: &[Message]) -> Self {
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str());

        match system {
            Some(REWRITE_SYSTEM_PROMPT) => Self::Rewrite,
            Some(FUSION_SYSTEM_PROMPT) => Self::Fusion,
            Some(JUDGE_SYSTEM_PROMPT) => Self::Judge,
            Some(ANSWER_SYSTEM_PROMPT) => Self::Answer,
            None if messages
                .first()
                .is_some_and(|m| m.content.starts_with("# Role")) =>
            {
                Self::SinglePass
            }
            _ => Self::Other,
        }
    }
}

/// Messages for query rewriting.
pub fn rewrite_messages(query: &str, context: Option<&str>) -> Vec<Message> {
    let context = context
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("\nContext: {}", c))
        .unwrap_or_default();

    vec![
        Message::system(REWRITE_SYSTEM_PROMPT),
        Message::user(
            fill(
                REWRITE_USER_TEMPLATE,
                &[("{query}", query), ("{context}", context.as_str())],
            ),
        ),
    ]
}

/// Messages for evidence fusion.
pub fn fusion_messages(query: &str, context: &str) -> Vec<Message> {
    vec![
        Message::system(FUSION_SYSTEM_PROMPT),
        Message::user(
            fill(
                FUSION_USER_TEMPLATE,
                &[("{query}", query), ("{context}", context)],
            ),
        ),
    ]
}

/// Messages for the sufficiency judgment.
pub fn judge_messages(query: &str, evidence: &str) -> Vec<Message> {
    vec![
        Message::system(JUDGE_SYSTEM_PROMPT),
        Message::user(
            fill(
                JUDGE_USER_TEMPLATE,
                &[("{query}", query), ("{evidence}", evidence)],
            ),
        ),
    ]
}

/// Messages for the final answer.
pub fn answer_messages(query: &str, evidence: &str) -> Vec<Message> {
    vec![
        Message::system(ANSWER_SYSTEM_PROMPT),
        Message::user(
            fill(
                ANSWER_USER_TEMPLATE,
                &[("{query}", query), ("{evidence}", evidence)],
            ),
        ),
    ]
}

/// The single user message for one-shot answering.
pub fn single_pass_messages(query: &str, knowledge: &[&str]) -> Vec<Message> {
    let knowledge = knowledge
        .iter()
        .enumerate()
        .map(|(i, k)| format!("[{}] {}", i + 1, k))
        .collect::<Vec<_>>()
        .join("\n\n");

    vec![Message::user(fill(
        SINGLE_PASS_PROMPT,
        &[("{knowledge}", knowledge.as_str()), ("{query}", query)],
    ))]
}

/// Substitute placeholders in one left-to-right pass. Inserted values are
/// never scanned again, so text that looks like a placeholder stays literal.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        filled.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(placeholder, _)| tail.starts_with(placeholder)) {
            Some((placeholder, value)) => {
                filled.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                filled.push('{');
                rest = &tail[1..];
            }
        }
    }

    filled.push_str(rest);
    filled
}
