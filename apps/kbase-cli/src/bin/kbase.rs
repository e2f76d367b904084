use std::env;
use std::path::PathBuf;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use kbase_chunk::{Chunker, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use kbase_core::config::{
    expand_path, Config, DEFAULT_COLLECTION, DEFAULT_EMBEDDING_MODEL, DEFAULT_UPLOAD_DOCS_DIR,
    DEFAULT_VECTOR_STORE_DIR,
};
use kbase_core::types::{DocumentHit, InfoResponse, QueryResponse, ToolFailure};
use kbase_extract::extract_dir;
use kbase_vector::DocumentStore;

struct Settings {
    store_dir: PathBuf,
    upload_dir: PathBuf,
    collection: String,
    model: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Settings {
    fn load() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self {
            store_dir: expand_path(
                config.get_or("data.vector_store_dir", DEFAULT_VECTOR_STORE_DIR.to_string()),
            ),
            upload_dir: expand_path(
                config.get_or("data.upload_docs_dir", DEFAULT_UPLOAD_DOCS_DIR.to_string()),
            ),
            collection: config.get_or("store.collection", DEFAULT_COLLECTION.to_string()),
            model: config.get_or("embedding.model", DEFAULT_EMBEDDING_MODEL.to_string()),
            chunk_size: config.get_or("chunking.chunk_size", DEFAULT_CHUNK_SIZE),
            chunk_overlap: config.get_or("chunking.chunk_overlap", DEFAULT_CHUNK_OVERLAP),
        })
    }

    async fn open_store(&self) -> Result<DocumentStore> {
        DocumentStore::open(&self.store_dir, &self.collection, &self.model).await
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <command> [args]");
    eprintln!("  ingest [dir]              index documents (default: configured upload dir)");
    eprintln!("  query <text> [--limit N]  semantic search, prints JSON");
    eprintln!("  info                      collection snapshot, prints JSON");
    eprintln!("  reset                     drop and recreate the collection");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("kbase");
    let Some(command) = args.get(1) else {
        usage(program);
    };

    let settings = Settings::load()?;
    match command.as_str() {
        "ingest" => ingest(&settings, args.get(2).map(PathBuf::from)).await,
        "query" => {
            let Some(text) = args.get(2) else {
                usage(program);
            };
            let mut limit = 5usize;
            let mut i = 3;
            while i < args.len() {
                if args[i] == "--limit" {
                    match args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                        Some(l) => {
                            limit = l;
                            i += 1;
                        }
                        None => {
                            eprintln!("Error: --limit requires a number");
                            std::process::exit(1);
                        }
                    }
                }
                i += 1;
            }
            query(&settings, text, limit).await
        }
        "info" => info(&settings).await,
        "reset" => reset(&settings).await,
        _ => usage(program),
    }
}

async fn ingest(settings: &Settings, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| settings.upload_dir.clone());
    println!("Ingesting documents from: {}", dir.display());

    let records = extract_dir(&dir)?;
    if records.is_empty() {
        println!("No supported documents found");
        return Ok(());
    }
    let chunker = Chunker::with_limits(settings.chunk_size, settings.chunk_overlap)?;
    let chunks = chunker.chunk(&records);
    println!(
        "Extracted {} records -> {} chunks",
        records.len(),
        chunks.len()
    );

    let store = settings.open_store().await?;
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks {msg}")?
            .progress_chars("#>-"),
    );
    for batch in chunks.chunks(64) {
        store.add(batch).await?;
        pb.inc(batch.len() as u64);
    }
    pb.finish_with_message("done");

    let snapshot = store.info().await?;
    println!(
        "Collection '{}' now holds {} chunks",
        snapshot.collection_name, snapshot.document_count
    );
    Ok(())
}

async fn query(settings: &Settings, text: &str, limit: usize) -> Result<()> {
    let out = match run_query(settings, text, limit).await {
        Ok(response) => serde_json::to_string_pretty(&response)?,
        Err(e) => serde_json::to_string_pretty(&ToolFailure::new(e))?,
    };
    println!("{out}");
    Ok(())
}

async fn run_query(settings: &Settings, text: &str, limit: usize) -> Result<QueryResponse> {
    let store = settings.open_store().await?;
    let hits = store.search_with_scores(text, limit).await?;
    let documents = hits
        .into_iter()
        .map(|(record, score)| DocumentHit {
            source: record.metadata.source.clone(),
            page: record
                .metadata
                .page_number
                .or(record.metadata.slide_number)
                .unwrap_or(0),
            content: record.content,
            score,
        })
        .collect();
    Ok(QueryResponse::from_hits(text, documents))
}

async fn info(settings: &Settings) -> Result<()> {
    let out = match run_info(settings).await {
        Ok(response) => serde_json::to_string_pretty(&response)?,
        Err(e) => serde_json::to_string_pretty(&ToolFailure::new(e))?,
    };
    println!("{out}");
    Ok(())
}

async fn run_info(settings: &Settings) -> Result<InfoResponse> {
    let store = settings.open_store().await?;
    let snapshot = store.info().await?;
    Ok(InfoResponse {
        success: true,
        document_count: snapshot.document_count,
        vector_store_path: settings.store_dir.to_string_lossy().to_string(),
        embedding_model: snapshot.embedding_model,
        database: "lancedb".to_string(),
        collection_name: snapshot.collection_name,
    })
}

async fn reset(settings: &Settings) -> Result<()> {
    let store = settings.open_store().await?;
    if let Err(e) = store.reset().await {
        warn!("reset failed: {e:#}");
    }
    info(settings).await
}
