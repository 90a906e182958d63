use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use resume_match_core::{
    CharacterNgramEmbedder, CorpusManager, Embedder, MatchResult, DEFAULT_TOP_K,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const NO_MATCH_MESSAGE: &str = "I'm not sure - I couldn't find any candidates that are a good match \
for your requirements. Try adjusting your query or using different keywords. Our database includes \
skills like React, Python, Java, Node.js, Machine Learning, and more.";

#[derive(Parser)]
#[command(name = "resume-match", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Folder holding one resume PDF per file (not searched recursively).
    #[arg(long, env = "RESUME_DIR", default_value = "resumes")]
    resumes_dir: PathBuf,

    /// Embedding engine used for both indexing and queries.
    #[arg(long, env = "RESUME_EMBEDDER", value_enum, default_value_t = EmbedderKind::Sentence)]
    embedder: EmbedderKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EmbedderKind {
    /// Pretrained all-MiniLM-L6-v2.
    Sentence,
    /// Deterministic character-trigram vectors for offline runs; no model download.
    Hashed,
}

#[derive(Subcommand)]
enum Command {
    /// Index the resume folder and report what was picked up.
    Index,
    /// Index the resume folder, then rank candidates for a natural-language query.
    Search {
        /// What you are looking for, e.g. "senior react engineer with fintech experience".
        #[arg(long)]
        query: String,
        /// Maximum number of candidates to return.
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        /// Print results as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        embedder = ?cli.embedder,
        "resume-match boot"
    );

    if let Command::Search { query, .. } = &cli.command {
        if query.trim().is_empty() {
            bail!("Query cannot be empty");
        }
    }

    match cli.embedder {
        EmbedderKind::Hashed => run(cli, CharacterNgramEmbedder::default()).await,
        EmbedderKind::Sentence => run_sentence(cli).await,
    }
}

#[cfg(feature = "fastembed")]
async fn run_sentence(cli: Cli) -> anyhow::Result<()> {
    let embedder = tokio::task::spawn_blocking(resume_match_core::SentenceEmbedder::try_new)
        .await
        .context("joining model load task")?
        .context("loading sentence embedding model")?;
    run(cli, embedder).await
}

#[cfg(not(feature = "fastembed"))]
async fn run_sentence(_cli: Cli) -> anyhow::Result<()> {
    bail!("this build has no sentence model; rebuild with the `fastembed` feature or pass `--embedder hashed`")
}

async fn run<E>(cli: Cli, embedder: E) -> anyhow::Result<()>
where
    E: Embedder + Send + Sync + 'static,
{
    let manager = Arc::new(CorpusManager::new(embedder)?);

    let outcome = {
        let manager = Arc::clone(&manager);
        let folder = cli.resumes_dir.clone();
        tokio::task::spawn_blocking(move || manager.index_with_report(&folder))
            .await
            .context("joining indexing task")?
            .with_context(|| format!("indexing {}", cli.resumes_dir.display()))?
    };

    if !outcome.skipped_files.is_empty() {
        warn!(
            "skipped_files={} for folder={}",
            outcome.skipped_files.len(),
            cli.resumes_dir.display()
        );
    }

    match cli.command {
        Command::Index => {
            let status = manager.status();
            println!(
                "{} resumes indexed from {} (model={}, built_at={})",
                status.candidate_count,
                cli.resumes_dir.display(),
                status.model_name,
                status
                    .built_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string())
            );
            for skipped in &outcome.skipped_files {
                println!("  skipped {}: {}", skipped.path.display(), skipped.reason);
            }
        }
        Command::Search { query, top_k, json } => {
            if manager.corpus_size() == 0 {
                bail!(
                    "No resumes indexed. Add resume PDFs to {} and try again.",
                    cli.resumes_dir.display()
                );
            }

            let results = manager.search(&query, top_k)?;
            info!(query = %query, matches = results.len(), "search finished");

            if json {
                let message = results.is_empty().then_some(NO_MATCH_MESSAGE);
                let payload = json!({ "candidates": results, "message": message });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_results(&query, &results);
            }
        }
    }

    Ok(())
}

fn print_results(query: &str, results: &[MatchResult]) {
    println!("query: {query}");
    if results.is_empty() {
        println!("{NO_MATCH_MESSAGE}");
        return;
    }

    for (rank, result) in results.iter().enumerate() {
        println!(
            "[{}] score={:.3} id={} name={}",
            rank + 1,
            result.score,
            result.id,
            result.name
        );
        println!("  path={}", result.path);
        if !result.skills.is_empty() {
            println!("  skills={}", result.skills.join(", "));
        }
        println!("  experience={}", result.experience_summary);
        println!("  why={}", result.explanation);
    }
}
