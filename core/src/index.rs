use crate::error::Result;
use crate::tokenizer::{lemmatize_text, Lemmatizer};
use crate::topic::Topic;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A reference question is addressed by its topic and its position in the
/// topic's reference list. Ordering (topic, then index) is the candidate
/// visiting order, so it decides ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferenceId {
    pub topic: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMeta {
    pub lemmas: Vec<String>,
    pub set: BTreeSet<String>,
    /// Lemmas joined with single spaces, for the sequence scorer.
    pub joined: String,
    /// Owning topic's answer, copied at build time.
    pub answer: String,
}

/// Immutable inverted index plus metadata table. A new snapshot is built
/// from scratch on every change and never mutated after publication.
#[derive(Debug)]
pub struct Snapshot {
    pub version: u64,
    pub model: String,
    pub topic_count: usize,
    /// lemma -> references containing it
    pub index: HashMap<String, Vec<ReferenceId>>,
    pub metadata: HashMap<ReferenceId, ReferenceMeta>,
}

impl Snapshot {
    pub fn reference_count(&self) -> usize { self.metadata.len() }

    pub fn lemma_count(&self) -> usize { self.index.len() }
}

/// Lemmatize every reference question and build the index. Topics are
/// expected in ascending name order (what [`TopicStore::topics`] returns) so
/// bucket order is reproducible.
///
/// [`TopicStore::topics`]: crate::persist::TopicStore::topics
pub fn build_snapshot(topics: &[Topic], lemmatizer: &dyn Lemmatizer, version: u64) -> Result<Snapshot> {
    let mut index: HashMap<String, Vec<ReferenceId>> = HashMap::new();
    let mut metadata: HashMap<ReferenceId, ReferenceMeta> = HashMap::new();

    for topic in topics {
        for (i, reference) in topic.references.iter().enumerate() {
            let lemmas = lemmatize_text(lemmatizer, reference)?;
            let set: BTreeSet<String> = lemmas.iter().cloned().collect();
            let joined = lemmas.join(" ");
            let id = ReferenceId { topic: topic.name.clone(), index: i };

            for lemma in &set {
                index.entry(lemma.clone()).or_default().push(id.clone());
            }
            metadata.insert(id, ReferenceMeta { lemmas, set, joined, answer: topic.answer.clone() });
        }
    }

    Ok(Snapshot { version, model: lemmatizer.model().to_string(), topic_count: topics.len(), index, metadata })
}
