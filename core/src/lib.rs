pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod scoring;
pub mod tokenizer;
pub mod topic;

pub use engine::{Engine, EngineConfig, Stats};
pub use error::{FaqError, Result};
pub use index::{build_snapshot, ReferenceId, ReferenceMeta, Snapshot};
pub use persist::{MemoryTopicStore, SledTopicStore, TopicStore};
pub use query::{Answer, FALLBACK_REPLY};
pub use scoring::ScoringStrategy;
pub use topic::Topic;
