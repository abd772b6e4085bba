use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faq_core::{Engine, EngineConfig, ScoringStrategy, SledTopicStore, Topic, TopicStore};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputTopic {
    topic: String,
    answer: String,
    #[serde(default)]
    references: Vec<String>,
}

#[derive(Parser)]
#[command(name = "faq-indexer")]
#[command(about = "Load FAQ topics into the store and query the index", long_about = None)]
struct Cli {
    /// sled database directory
    #[arg(long, global = true, default_value = "./faqs.db")]
    db: String,
    /// Stemmer language, or `none` for plain whitespace tokens
    #[arg(long, global = true, default_value = "greek")]
    language: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upsert topics from JSON/JSONL files or a directory of them
    Import {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
    },
    /// Print stored topic names
    List,
    /// Answer a single prompt against the stored topics
    Ask {
        #[arg(long, default_value = "set-overlap")]
        scoring: ScoringStrategy,
        prompt: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let store = SledTopicStore::open(&cli.db).with_context(|| format!("opening {}", cli.db))?;

    match cli.command {
        Commands::Import { input } => import(store, &input, &cli.language).map(|_| ()),
        Commands::List => {
            for topic in store.topics()? {
                println!("{}\t{} references", topic.name, topic.references.len());
            }
            Ok(())
        }
        Commands::Ask { scoring, prompt } => {
            let config = EngineConfig { strategy: scoring, language: cli.language };
            let engine = Engine::from_config(Box::new(store), &config)?;
            let answer = engine.answer(&prompt.join(" "))?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
            Ok(())
        }
    }
}

fn import(store: SledTopicStore, input: &str, language: &str) -> Result<Engine> {
    let files = input_files(Path::new(input));
    if files.is_empty() {
        anyhow::bail!("no .json or .jsonl files under {input}");
    }

    let mut imported = 0usize;
    for file in files {
        let topics = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for raw in topics {
            let topic = Topic::new(&raw.topic, &raw.answer, &raw.references)
                .with_context(|| format!("{}: topic {:?}", file.display(), raw.topic))?;
            store.replace_topic(&topic)?;
            imported += 1;
        }
        tracing::info!(file = %file.display(), "imported");
    }

    // One build over everything so a lemmatizer problem shows up now, not at server start.
    let config = EngineConfig { strategy: ScoringStrategy::default(), language: language.to_string() };
    let engine = Engine::from_config(Box::new(store), &config)?;
    let stats = engine.stats();
    tracing::info!(imported, topics = stats.topics, references = stats.references, lemmas = stats.lemmas, "import complete");
    Ok(engine)
}

fn input_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

fn read_jsonl(file: &Path) -> Result<Vec<InputTopic>> {
    let reader = BufReader::new(File::open(file)?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        out.push(serde_json::from_str(&line)?);
    }
    Ok(out)
}

fn read_json(file: &Path) -> Result<Vec<InputTopic>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => Ok(arr.into_iter().map(serde_json::from_value).collect::<Result<_, _>>()?),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(json)?]),
        _ => Ok(Vec::new()),
    }
}
