//! Metadata filter expressions for the search backend.
//!
//! Fuzzy-match criteria become `field like "%value%"` predicates joined with
//! `and`. Every criterion goes through [`escape_literal`] before it is
//! embedded, so it cannot close the literal it sits in.

use serde::{Deserialize, Serialize};

/// Field holding the paper's keywords.
pub const KEYWORDS_FIELD: &str = "keywords_text";

/// Field holding the paper's authors.
pub const AUTHORS_FIELD: &str = "authors";

/// Field holding the paper's title.
pub const TITLE_FIELD: &str = "title";

/// Optional fuzzy-match criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub keyword_text: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
}

impl MetadataFilter {
    /// A filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match documents whose keywords contain `keyword_text`.
    pub fn with_keyword_text(mut self, keyword_text: impl Into<String>) -> Self {
        self.keyword_text = Some(keyword_text.into());
        self
    }

    /// Match documents whose authors contain `author`.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Match documents whose title contains `title`.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Compile into a filter expression, or `None` when every criterion is
    /// absent or blank.
    pub fn build(&self) -> Option<String> {
        let predicates: Vec<String> = [
            (KEYWORDS_FIELD, &self.keyword_text),
            (AUTHORS_FIELD, &self.author),
            (TITLE_FIELD, &self.title),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            let value = value.as_deref()?.trim();
            if value.is_empty() {
                return None;
            }
            Some(format!(r#"{} like "%{}%""#, field, escape_literal(value)))
        })
        .collect();

        if predicates.is_empty() {
            None
        } else {
            Some(predicates.join(" and "))
        }
    }
}

/// Escape backslashes and double every quote character so the value cannot
/// close the literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("''"),
            '"' => escaped.push_str("\"\""),
            other => escaped.push(other),
        }
    }
    escaped
}
