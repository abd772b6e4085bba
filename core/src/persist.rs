use crate::error::Result;
use crate::topic::Topic;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;

/// Durable storage of topics keyed by name.
pub trait TopicStore: Send + Sync {
    /// Insert or fully replace a topic, answer and reference set together.
    fn replace_topic(&self, topic: &Topic) -> Result<()>;

    fn get_topic(&self, name: &str) -> Result<Option<Topic>>;

    /// Every stored topic, ascending by name.
    fn topics(&self) -> Result<Vec<Topic>>;
}

/// sled-backed store. One tree entry per topic (key: name, value: bincode
/// `Topic`), so a topic's references are always replaced as a whole.
pub struct SledTopicStore {
    tree: sled::Tree,
}

impl SledTopicStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let tree = db.open_tree("topics")?;
        Ok(Self { tree })
    }
}

impl TopicStore for SledTopicStore {
    fn replace_topic(&self, topic: &Topic) -> Result<()> {
        let bytes = bincode::serialize(topic)?;
        self.tree.insert(topic.name.as_bytes(), bytes)?;
        self.tree.flush()?;
        Ok(())
    }

    fn get_topic(&self, name: &str) -> Result<Option<Topic>> {
        match self.tree.get(name.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn topics(&self) -> Result<Vec<Topic>> {
        // sled iterates keys in byte order, which for UTF-8 is code point order
        let mut out = Vec::with_capacity(self.tree.len());
        for entry in self.tree.iter() {
            let (_key, bytes) = entry?;
            out.push(bincode::deserialize(&bytes)?);
        }
        Ok(out)
    }
}

/// Volatile store for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryTopicStore {
    topics: RwLock<BTreeMap<String, Topic>>,
}

impl MemoryTopicStore {
    pub fn new() -> Self { Self::default() }
}

impl TopicStore for MemoryTopicStore {
    fn replace_topic(&self, topic: &Topic) -> Result<()> {
        self.topics.write().insert(topic.name.clone(), topic.clone());
        Ok(())
    }

    fn get_topic(&self, name: &str) -> Result<Option<Topic>> {
        Ok(self.topics.read().get(name).cloned())
    }

    fn topics(&self) -> Result<Vec<Topic>> {
        Ok(self.topics.read().values().cloned().collect())
    }
}
