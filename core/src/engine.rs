use crate::error::{FaqError, Result};
use crate::index::{build_snapshot, Snapshot};
use crate::persist::TopicStore;
use crate::query::Answer;
use crate::scoring::ScoringStrategy;
use crate::tokenizer::{lemmatizer_for, Lemmatizer};
use crate::topic::Topic;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub strategy: ScoringStrategy,
    /// Snowball language name, or `none` for whitespace lemmas.
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { strategy: ScoringStrategy::SetOverlap, language: "greek".into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub version: u64,
    pub model: String,
    pub strategy: ScoringStrategy,
    pub topics: usize,
    pub references: usize,
    pub lemmas: usize,
}

/// The snapshot and the lemmatizer that built it are published together, so a
/// query never lemmatizes with a different model than its index.
#[derive(Clone)]
struct Published {
    snapshot: Arc<Snapshot>,
    lemmatizer: Arc<dyn Lemmatizer>,
}

/// Owns the topic store and the currently published index snapshot.
///
/// Queries clone the current `Arc` and run without holding any lock. Writers
/// are serialized by `write_lock`, build a complete new snapshot and only
/// then swap it in, so readers see either the old index or the new one.
pub struct Engine {
    store: Box<dyn TopicStore>,
    strategy: ScoringStrategy,
    current: RwLock<Published>,
    write_lock: Mutex<()>,
}

impl Engine {
    /// Build the initial index. Fails if the lemmatizer cannot process the
    /// stored references, since no index could be served.
    pub fn new(store: Box<dyn TopicStore>, lemmatizer: Box<dyn Lemmatizer>, strategy: ScoringStrategy) -> Result<Self> {
        let lemmatizer: Arc<dyn Lemmatizer> = Arc::from(lemmatizer);
        let topics = store.topics()?;
        let snapshot = build_snapshot(&topics, lemmatizer.as_ref(), 1)?;
        log_published(&snapshot);
        Ok(Self {
            store,
            strategy,
            current: RwLock::new(Published { snapshot: Arc::new(snapshot), lemmatizer }),
            write_lock: Mutex::new(()),
        })
    }

    pub fn from_config(store: Box<dyn TopicStore>, config: &EngineConfig) -> Result<Self> {
        let lemmatizer = lemmatizer_for(&config.language)?;
        Self::new(store, lemmatizer, config.strategy)
    }

    pub fn strategy(&self) -> ScoringStrategy { self.strategy }

    /// The index currently served. Holding the handle keeps that version alive
    /// even if a rebuild publishes a newer one.
    pub fn snapshot(&self) -> Arc<Snapshot> { self.current.read().snapshot.clone() }

    pub fn answer(&self, prompt: &str) -> Result<Answer> {
        let Published { snapshot, lemmatizer } = self.current.read().clone();
        snapshot.answer(prompt, lemmatizer.as_ref(), self.strategy)
    }

    /// Insert or replace a topic with its whole reference set, then rebuild.
    /// The store is written only once the new index has been built, so a
    /// topic the lemmatizer rejects is never persisted. Returns the version
    /// of the newly published index.
    pub fn upsert_topic<S: AsRef<str>>(&self, name: &str, answer: &str, references: &[S]) -> Result<u64> {
        let topic = Topic::new(name, answer, references)?;
        let _guard = self.write_lock.lock();
        let lemmatizer = self.current.read().lemmatizer.clone();
        let version = self.rebuild_locked(lemmatizer, Some(&topic))?;
        tracing::info!(topic = %topic.name, references = topic.references.len(), version, "topic upserted");
        Ok(version)
    }

    /// Like [`upsert_topic`](Self::upsert_topic) but only for a topic stored
    /// under exactly `name`.
    pub fn edit_topic<S: AsRef<str>>(&self, name: &str, answer: &str, references: &[S]) -> Result<u64> {
        let topic = Topic::new(name, answer, references)?;
        let _guard = self.write_lock.lock();
        if topic.name != name || self.store.get_topic(name)?.is_none() {
            return Err(FaqError::NotFound(name.to_string()));
        }
        let lemmatizer = self.current.read().lemmatizer.clone();
        let version = self.rebuild_locked(lemmatizer, Some(&topic))?;
        tracing::info!(topic = %topic.name, references = topic.references.len(), version, "topic edited");
        Ok(version)
    }

    pub fn topic(&self, name: &str) -> Result<Topic> {
        self.store.get_topic(name)?.ok_or_else(|| FaqError::NotFound(name.to_string()))
    }

    pub fn topic_names(&self) -> Result<Vec<String>> {
        Ok(self.store.topics()?.into_iter().map(|t| t.name).collect())
    }

    /// Re-read every topic and publish a fresh index.
    pub fn rebuild(&self) -> Result<u64> {
        let _guard = self.write_lock.lock();
        let lemmatizer = self.current.read().lemmatizer.clone();
        self.rebuild_locked(lemmatizer, None)
    }

    /// Swap the lemmatization model. Every reference is lemmatized again; if
    /// that fails the old model and index stay in service.
    pub fn replace_lemmatizer(&self, lemmatizer: Box<dyn Lemmatizer>) -> Result<u64> {
        let _guard = self.write_lock.lock();
        self.rebuild_locked(Arc::from(lemmatizer), None)
    }

    pub fn stats(&self) -> Stats {
        let snap = self.snapshot();
        Stats {
            version: snap.version,
            model: snap.model.clone(),
            strategy: self.strategy(),
            topics: snap.topic_count,
            references: snap.reference_count(),
            lemmas: snap.lemma_count(),
        }
    }

    /// Build from the stored topics with `pending` laid over them, persist
    /// `pending` once the build succeeded, then publish.
    fn rebuild_locked(&self, lemmatizer: Arc<dyn Lemmatizer>, pending: Option<&Topic>) -> Result<u64> {
        let version = self.current.read().snapshot.version + 1;
        let built = self.store.topics().and_then(|mut topics| {
            if let Some(topic) = pending {
                merge_topic(&mut topics, topic.clone());
            }
            build_snapshot(&topics, lemmatizer.as_ref(), version)
        });
        let snapshot = match built {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(error = %err, version, "rebuild aborted, keeping previous index");
                return Err(err);
            }
        };
        if let Some(topic) = pending {
            self.store.replace_topic(topic)?;
        }
        log_published(&snapshot);
        *self.current.write() = Published { snapshot: Arc::new(snapshot), lemmatizer };
        Ok(version)
    }
}

/// Insert or replace `topic` in a name-sorted list, keeping it sorted.
fn merge_topic(topics: &mut Vec<Topic>, topic: Topic) {
    match topics.binary_search_by(|t| t.name.as_str().cmp(topic.name.as_str())) {
        Ok(i) => topics[i] = topic,
        Err(i) => topics.insert(i, topic),
    }
}

fn log_published(snapshot: &Snapshot) {
    tracing::info!(
        version = snapshot.version,
        model = %snapshot.model,
        topics = snapshot.topic_count,
        references = snapshot.reference_count(),
        lemmas = snapshot.lemma_count(),
        "index published"
    );
}
