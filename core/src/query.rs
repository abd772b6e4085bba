use crate::error::Result;
use crate::index::{ReferenceId, Snapshot};
use crate::scoring::{round3, ScoringStrategy};
use crate::tokenizer::{lemmatize_text, Lemmatizer};
use serde::Serialize;
use std::collections::BTreeSet;

pub const FALLBACK_REPLY: &str =
    "Δεν καταλαβαίνω την ερώτηση. Παρακαλώ δοκιμάστε ξανά με διαφορετική διατύπωση.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub reply: String,
    /// Best score rounded to 3 decimals; 0.0 for the fallback reply.
    pub score: f64,
    /// The prompt's lemma sequence.
    pub lemmas: Vec<String>,
    /// Accepted reference, if any.
    pub matched: Option<ReferenceId>,
    /// Version of the snapshot that answered.
    pub version: u64,
}

impl Snapshot {
    /// References sharing at least one lemma with the prompt, in ascending id
    /// order. Anything outside this set has an empty intersection with the
    /// prompt and cannot score above zero.
    pub fn candidates<'a>(&'a self, prompt_set: &BTreeSet<String>) -> BTreeSet<&'a ReferenceId> {
        prompt_set
            .iter()
            .filter_map(|lemma| self.index.get(lemma))
            .flatten()
            .collect()
    }

    pub fn answer(&self, prompt: &str, lemmatizer: &dyn Lemmatizer, strategy: ScoringStrategy) -> Result<Answer> {
        let lemmas = lemmatize_text(lemmatizer, prompt)?;
        let prompt_set: BTreeSet<String> = lemmas.iter().cloned().collect();
        let prompt_joined = lemmas.join(" ");

        let mut best: Option<&ReferenceId> = None;
        let mut best_score = 0.0f64;
        let candidates = self.candidates(&prompt_set);
        for id in &candidates {
            let Some(meta) = self.metadata.get(*id) else { continue };
            let score = strategy.score(&prompt_set, &prompt_joined, &meta.set, &meta.joined);
            // strictly greater: on a tie the earlier id stays
            if score > best_score {
                best_score = score;
                best = Some(*id);
            }
        }

        tracing::debug!(
            candidates = candidates.len(),
            best_score,
            %strategy,
            version = self.version,
            "scored prompt"
        );

        match best {
            Some(id) if strategy.accepts(best_score) => Ok(Answer {
                reply: self.metadata[id].answer.clone(),
                score: round3(best_score),
                lemmas,
                matched: Some(id.clone()),
                version: self.version,
            }),
            _ => Ok(Answer { reply: FALLBACK_REPLY.to_string(), score: 0.0, lemmas, matched: None, version: self.version }),
        }
    }
}
