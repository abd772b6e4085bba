use crate::error::{FaqError, Result};
use serde::{Deserialize, Serialize};

/// A named unit of knowledge: one answer, many paraphrased reference questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub answer: String,
    pub references: Vec<String>,
}

impl Topic {
    /// Validate ingest input. Names and answers are trimmed; reference lines
    /// are trimmed and blank ones dropped.
    pub fn new(name: &str, answer: &str, references: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FaqError::InvalidInput("topic name is empty".into()));
        }
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(FaqError::InvalidInput(format!("topic {name:?} has no answer")));
        }
        let references = references
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        Ok(Self { name: name.to_string(), answer: answer.to_string(), references })
    }
}
