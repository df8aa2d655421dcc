use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use docq_cli::{display_banner, handle_input_with_history, print_help, render_transcript};
use docq_core::{CorpusLoader, Error, RagConfig};
use docq_rag::{chunker, ConversationStore, DirectoryLoader, IndexCache, QueryPipeline, VectorIndex};
use docq_watsonx::WatsonxClient;

#[derive(Parser)]
#[command(name = "docq")]
#[command(about = "Ask questions about a local document corpus", long_about = None)]
struct Cli {
    /// Corpus folder (defaults to DOCQ_CORPUS_DIR or ./docs)
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// Glob pattern for corpus files
    #[arg(short, long)]
    pattern: Option<String>,

    /// Ask a single question and exit
    #[arg(short, long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RagConfig::from_env()?;
    if let Some(corpus) = cli.corpus {
        config.corpus_dir = corpus;
    }
    if let Some(pattern) = cli.pattern {
        config.glob_pattern = pattern;
    }
    config.validate()?;

    // Connect the watsonx collaborator
    let mut watsonx = WatsonxClient::from_env()?
        .with_embedding_model(config.embedding_model.clone())
        .with_generation_model(config.generation_model.clone());
    watsonx.connect().await?;
    let watsonx = Arc::new(watsonx);

    // Load the corpus
    let loader = DirectoryLoader::new(config.corpus_dir.clone(), config.glob_pattern.clone());
    let documents = match loader.load().await {
        Ok(documents) => documents,
        Err(e @ Error::CorpusNotFound(_)) => {
            println!("{} {}", "⚠️".yellow(), e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Processing {} documents and building vector index...",
        "🔄".blue(),
        documents.len()
    );

    let chunks = chunker::split(&documents, config.chunk_size, config.chunk_overlap)?;
    let fingerprint = loader.fingerprint()?;

    let cache = IndexCache::new();
    let index = match cache
        .get_or_build(&fingerprint, || {
            let embedder = watsonx.clone();
            async move { VectorIndex::build(chunks, embedder.as_ref()).await }
        })
        .await
    {
        Ok(index) => index,
        Err(e @ Error::EmptyCorpus(_)) => {
            println!("{} {}", "⚠️".yellow(), e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Index ready: {} chunks from {} documents",
        "✅".green(),
        index.len(),
        documents.len()
    );

    let pipeline =
        QueryPipeline::new(index, watsonx.clone(), watsonx.clone()).with_top_k(config.top_k);
    let session = ConversationStore::new();

    // One-shot mode
    if let Some(question) = cli.question {
        let answer = pipeline.ask(&session, &question).await?;
        println!("{}", answer);
        return Ok(());
    }

    // Interactive mode
    display_banner();

    let mut history = Vec::new();

    loop {
        let Some(input) = handle_input_with_history(&mut history).await? else {
            break;
        };

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            "history" => {
                render_transcript(&session.all()?);
                continue;
            }
            "clear" => {
                session.clear()?;
                println!("{}", "🧹 Conversation cleared.".green());
                continue;
            }
            _ => {}
        }

        match pipeline.ask(&session, &input).await {
            Ok(answer) => println!("{} {}", "docq>".blue().bold(), answer),
            Err(e) => println!("{} Error during generation: {}", "❌".red(), e),
        }
    }

    Ok(())
}
