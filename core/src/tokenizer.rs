use crate::error::{FaqError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
}

/// Lowercase, decompose (NFD) and drop every combining mark, so that
/// "Καλημέρα" and "καλημερα" normalize to the same string.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Normalize raw bytes. Invalid UTF-8 sequences become U+FFFD and pass through.
pub fn normalize_bytes(bytes: &[u8]) -> String {
    normalize(&String::from_utf8_lossy(bytes))
}

/// Turns normalized text into an ordered sequence of base word forms.
///
/// Implementations keep stop words and must be deterministic for a given
/// input and [`model`](Lemmatizer::model). Swapping the model means every
/// stored reference has to be lemmatized again.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, normalized: &str) -> Result<Vec<String>>;

    /// Name of the underlying language model, for logs and stats.
    fn model(&self) -> &str;
}

/// Word splitter backed by a Snowball stemmer.
pub struct SnowballLemmatizer {
    stemmer: Stemmer,
    model: String,
}

impl SnowballLemmatizer {
    pub fn new(language: &str) -> Result<Self> {
        let algorithm = algorithm_for(language)?;
        Ok(Self { stemmer: Stemmer::create(algorithm), model: format!("snowball-{}", language.to_lowercase()) })
    }
}

impl Lemmatizer for SnowballLemmatizer {
    fn lemmatize(&self, normalized: &str) -> Result<Vec<String>> {
        Ok(WORD
            .find_iter(normalized)
            .map(|m| self.stemmer.stem(m.as_str()).into_owned())
            .collect())
    }

    fn model(&self) -> &str { &self.model }
}

/// Identity lemmatizer: every whitespace-separated word is its own lemma.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceLemmatizer;

impl Lemmatizer for WhitespaceLemmatizer {
    fn lemmatize(&self, normalized: &str) -> Result<Vec<String>> {
        Ok(normalized.split_whitespace().map(str::to_string).collect())
    }

    fn model(&self) -> &str { "whitespace" }
}

fn algorithm_for(language: &str) -> Result<Algorithm> {
    let algorithm = match language.to_lowercase().as_str() {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        other => return Err(FaqError::Config(format!("unsupported language: {other}"))),
    };
    Ok(algorithm)
}

/// Build the lemmatizer for a configured language name. `none` selects
/// [`WhitespaceLemmatizer`].
pub fn lemmatizer_for(language: &str) -> Result<Box<dyn Lemmatizer>> {
    match language.to_lowercase().as_str() {
        "none" | "whitespace" => Ok(Box::new(WhitespaceLemmatizer)),
        _ => Ok(Box::new(SnowballLemmatizer::new(language)?)),
    }
}

/// Normalize then lemmatize.
pub fn lemmatize_text(lemmatizer: &dyn Lemmatizer, text: &str) -> Result<Vec<String>> {
    lemmatizer.lemmatize(&normalize(text))
}
