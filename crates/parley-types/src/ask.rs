//! Result of a single "ask the assistant" exchange.

use serde::{Deserialize, Serialize};

/// The assistant's raw answer paired with its rewritten form.
///
/// `rewritten` is `None` when the rewrite step was unavailable; callers
/// fall back to `original` in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResult {
    pub original: String,
    pub rewritten: Option<String>,
}

impl AskResult {
    /// The best text to show a reader: the rewrite when present, else the original.
    pub fn display_text(&self) -> &str {
        self.rewritten.as_deref().unwrap_or(&self.original)
    }
}
