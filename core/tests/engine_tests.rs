use faq_core::tokenizer::{Lemmatizer, SnowballLemmatizer, WhitespaceLemmatizer};
use faq_core::{
    Engine, EngineConfig, FaqError, MemoryTopicStore, ScoringStrategy, SledTopicStore, Topic, TopicStore,
    FALLBACK_REPLY,
};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn greek_engine() -> Engine {
    Engine::from_config(Box::new(MemoryTopicStore::new()), &EngineConfig::default()).unwrap()
}

fn whitespace_engine() -> Engine {
    Engine::new(Box::new(MemoryTopicStore::new()), Box::new(WhitespaceLemmatizer), ScoringStrategy::SetOverlap).unwrap()
}

/// Fails on any text containing `word`.
struct FailOn(&'static str);

impl Lemmatizer for FailOn {
    fn lemmatize(&self, normalized: &str) -> faq_core::Result<Vec<String>> {
        if normalized.contains(self.0) {
            return Err(FaqError::Lemmatizer(format!("cannot analyse {normalized:?}")));
        }
        Ok(normalized.split_whitespace().map(str::to_string).collect())
    }

    fn model(&self) -> &str { "fail-on" }
}

#[test]
fn unaccented_greek_prompt_matches() {
    let engine = greek_engine();
    engine.upsert_topic("greeting", "Καλημέρα!", &["καλημέρα"]).unwrap();
    let ans = engine.answer("καλημερα").unwrap();
    assert_eq!(ans.reply, "Καλημέρα!");
    assert!(ans.score >= 0.6);
    assert_eq!(ans.lemmas.len(), 1);
}

#[test]
fn prompt_without_overlap_gets_fallback() {
    let engine = greek_engine();
    engine.upsert_topic("greeting", "Καλημέρα!", &["καλημέρα"]).unwrap();
    let ans = engine.answer("ποιο είναι το τηλέφωνο").unwrap();
    assert_eq!(ans.reply, FALLBACK_REPLY);
    assert_eq!(ans.score, 0.0);
    assert!(ans.matched.is_none());
}

#[test]
fn upsert_replaces_old_references() {
    let engine = whitespace_engine();
    engine.upsert_topic("office", "Main street 1", &["where is the office"]).unwrap();
    assert_eq!(engine.answer("where is the office").unwrap().reply, "Main street 1");

    engine.upsert_topic("office", "Main street 1", &["store location"]).unwrap();
    let ans = engine.answer("where is the office").unwrap();
    assert_eq!(ans.reply, FALLBACK_REPLY);
    assert_eq!(engine.answer("store location").unwrap().reply, "Main street 1");
    assert_eq!(engine.topic("office").unwrap().references, vec!["store location"]);
}

#[test]
fn answer_update_reaches_every_reference() {
    let engine = whitespace_engine();
    engine.upsert_topic("hours", "9-5", &["opening hours", "when do you open"]).unwrap();
    engine.upsert_topic("hours", "10-6", &["opening hours", "when do you open"]).unwrap();
    let snap = engine.snapshot();
    assert!(snap.metadata.values().all(|m| m.answer == "10-6"));
}

#[test]
fn rebuild_is_idempotent() {
    let engine = greek_engine();
    engine
        .upsert_topic(
            "decentralized_administration",
            "Η Αποκεντρωμένη Διοίκηση είναι ενδιάμεσο επίπεδο διοίκησης.",
            &["Πες μου για την Αποκεντρωμένη Διοίκηση", "Τι ξέρεις για τις Αποκεντρωμένες Διοικήσεις"],
        )
        .unwrap();
    engine.upsert_topic("greeting", "Καλημέρα!", &["καλημέρα", "γεια σου"]).unwrap();

    let first = engine.snapshot();
    engine.rebuild().unwrap();
    let second = engine.snapshot();
    assert_eq!(second.version, first.version + 1);
    assert_eq!(first.index, second.index);
    assert_eq!(first.metadata, second.metadata);
}

#[test]
fn invalid_input_leaves_store_untouched() {
    let engine = whitespace_engine();
    assert!(matches!(engine.upsert_topic("", "answer", &["q"]), Err(FaqError::InvalidInput(_))));
    assert!(matches!(engine.upsert_topic("t", "  ", &["q"]), Err(FaqError::InvalidInput(_))));
    assert!(engine.topic_names().unwrap().is_empty());
    assert_eq!(engine.stats().version, 1);
}

#[test]
fn editing_unknown_topic_is_not_found() {
    let engine = whitespace_engine();
    let err = engine.edit_topic("ghost", "boo", &["who is there"]).unwrap_err();
    assert!(matches!(err, FaqError::NotFound(name) if name == "ghost"));
    assert!(engine.topic_names().unwrap().is_empty());

    engine.upsert_topic("ghost", "boo", &["who is there"]).unwrap();
    let err = engine.edit_topic(" ghost", "BOO", &["who is there"]).unwrap_err();
    assert!(matches!(err, FaqError::NotFound(name) if name == " ghost"));
    assert_eq!(engine.topic("ghost").unwrap().answer, "boo");

    engine.edit_topic("ghost", "BOO", &["who is there"]).unwrap();
    assert_eq!(engine.answer("who is there").unwrap().reply, "BOO");
}

#[test]
fn failed_rebuild_keeps_previous_index() {
    let engine = Engine::new(Box::new(MemoryTopicStore::new()), Box::new(FailOn("boom")), ScoringStrategy::SetOverlap)
        .unwrap();
    engine.upsert_topic("ok", "fine", &["all good"]).unwrap();
    let before = engine.snapshot();

    let err = engine.upsert_topic("bad", "nope", &["boom goes the index"]).unwrap_err();
    assert!(matches!(err, FaqError::Lemmatizer(_)));
    let after = engine.snapshot();
    assert_eq!(after.version, before.version);
    assert_eq!(engine.answer("all good").unwrap().reply, "fine");
}

#[test]
fn rejected_topic_is_not_stored_and_later_writes_succeed() {
    let engine = Engine::new(Box::new(MemoryTopicStore::new()), Box::new(FailOn("boom")), ScoringStrategy::SetOverlap)
        .unwrap();
    engine.upsert_topic("ok", "fine", &["all good"]).unwrap();
    assert!(engine.upsert_topic("bad", "nope", &["boom goes the index"]).is_err());

    assert!(matches!(engine.topic("bad"), Err(FaqError::NotFound(_))));
    let version = engine.upsert_topic("hours", "9-5", &["opening hours"]).unwrap();
    assert_eq!(engine.stats().version, version);
    assert_eq!(engine.answer("opening hours").unwrap().reply, "9-5");
    assert_eq!(engine.topic_names().unwrap(), vec!["hours", "ok"]);
}

#[test]
fn failed_edit_keeps_stored_topic() {
    let engine = Engine::new(Box::new(MemoryTopicStore::new()), Box::new(FailOn("boom")), ScoringStrategy::SetOverlap)
        .unwrap();
    engine.upsert_topic("ok", "fine", &["all good"]).unwrap();
    assert!(engine.edit_topic("ok", "changed", &["boom"]).is_err());
    let stored = engine.topic("ok").unwrap();
    assert_eq!(stored.answer, "fine");
    assert_eq!(stored.references, vec!["all good"]);
}

#[test]
fn lemmatizer_failure_at_query_time_is_an_error() {
    let engine = Engine::new(Box::new(MemoryTopicStore::new()), Box::new(FailOn("boom")), ScoringStrategy::SetOverlap)
        .unwrap();
    assert!(matches!(engine.answer("boom"), Err(FaqError::Lemmatizer(_))));
}

#[test]
fn startup_fails_when_lemmatizer_cannot_index() {
    let store = MemoryTopicStore::new();
    store.replace_topic(&Topic::new("t", "a", ["boom"]).unwrap()).unwrap();
    let res = Engine::new(Box::new(store), Box::new(FailOn("boom")), ScoringStrategy::SetOverlap);
    assert!(matches!(res, Err(FaqError::Lemmatizer(_))));
}

#[test]
fn unknown_language_is_fatal() {
    let config = EngineConfig { language: "elvish".into(), ..EngineConfig::default() };
    let res = Engine::from_config(Box::new(MemoryTopicStore::new()), &config);
    assert!(matches!(res, Err(FaqError::Config(_))));
}

#[test]
fn replacing_the_lemmatizer_rebuilds() {
    let engine = whitespace_engine();
    engine.upsert_topic("sport", "Go jogging", &["running fast"]).unwrap();
    assert_eq!(engine.answer("runs fast").unwrap().reply, FALLBACK_REPLY);

    let version = engine.replace_lemmatizer(Box::new(SnowballLemmatizer::new("english").unwrap())).unwrap();
    assert_eq!(engine.stats().version, version);
    assert_eq!(engine.stats().model, "snowball-english");
    let ans = engine.answer("runs fast").unwrap();
    assert_eq!(ans.reply, "Go jogging");
    assert_eq!(ans.score, 1.0);
}

#[test]
fn sequence_ratio_engine() {
    let engine =
        Engine::new(Box::new(MemoryTopicStore::new()), Box::new(WhitespaceLemmatizer), ScoringStrategy::SequenceRatio)
            .unwrap();
    engine.upsert_topic("hours", "9-5", &["opening hours"]).unwrap();
    assert_eq!(engine.answer("opening hour").unwrap().reply, "9-5");
    assert_eq!(engine.answer("hours").unwrap().reply, FALLBACK_REPLY);
}

#[test]
fn concurrent_queries_see_whole_snapshots() {
    let engine = Arc::new(whitespace_engine());
    engine.upsert_topic("t", "answer 0", &["alpha beta", "alpha gamma"]).unwrap();
    let base = engine.stats().version;

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..500 {
                    let ans = engine.answer("alpha beta").unwrap();
                    let expected = format!("answer {}", ans.version - base);
                    assert_eq!(ans.reply, expected);

                    let snap = engine.snapshot();
                    let bucket_entries: usize = snap.index.values().map(Vec::len).sum();
                    let lemma_entries: usize = snap.metadata.values().map(|m| m.set.len()).sum();
                    assert_eq!(bucket_entries, lemma_entries);
                    assert!(snap.metadata.values().all(|m| m.answer == format!("answer {}", snap.version - base)));
                }
            })
        })
        .collect();

    for i in 1..=50 {
        engine.upsert_topic("t", &format!("answer {i}"), &["alpha beta", "alpha gamma"]).unwrap();
    }
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(engine.stats().version, base + 50);
}

#[test]
fn sled_backed_engine_lists_topics() {
    let dir = tempdir().unwrap();
    let store = SledTopicStore::open(dir.path()).unwrap();
    let engine = Engine::new(Box::new(store), Box::new(WhitespaceLemmatizer), ScoringStrategy::SetOverlap).unwrap();
    engine.upsert_topic("b", "B", &["bee"]).unwrap();
    engine.upsert_topic("a", "A", &["ay"]).unwrap();
    assert_eq!(engine.topic_names().unwrap(), vec!["a", "b"]);
    assert_eq!(engine.answer("bee").unwrap().reply, "B");
    assert_eq!(engine.stats().topics, 2);
}
