use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scour::index::{build_index, preprocess_collection};
use scour::{DocumentStore, NormalizerConfig, SearchConfig, SearchEngine, TextNormalizer};
use tracing::info;

#[derive(Parser)]
#[command(name = "scour")]
#[command(about = "TF-IDF full-text search over flat document collections", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a raw collection into the preprocessed file
    Preprocess {
        /// Raw collection file
        #[arg(short, long, env = "SCOUR_DOCUMENTS", default_value = "documents.txt")]
        input: PathBuf,

        /// Output file of normalized lines
        #[arg(short, long, env = "SCOUR_PROCESSED", default_value = "documents.processed")]
        output: PathBuf,
    },

    /// Build dictionary, postings and docids files from a collection
    Index {
        /// Raw collection file
        #[arg(short, long, default_value = "documents.txt")]
        documents: PathBuf,

        /// Preprocessed collection file (from the preprocess step)
        #[arg(short, long, default_value = "documents.processed")]
        processed: PathBuf,

        /// Output dictionary file
        #[arg(long, default_value = "dictionary.txt")]
        dictionary: PathBuf,

        /// Output postings file
        #[arg(long, default_value = "postings.txt")]
        postings: PathBuf,

        /// Output document directory file
        #[arg(long, default_value = "docids.txt")]
        docids: PathBuf,
    },

    /// Run a query against a built index
    Search {
        /// The free-text query
        query: String,

        /// Dictionary file
        #[arg(short = 't', long, default_value = "dictionary.txt")]
        dictionary: PathBuf,

        /// Postings file
        #[arg(short, long, default_value = "postings.txt")]
        postings: PathBuf,

        /// Document directory file
        #[arg(short = 'i', long, default_value = "docids.txt")]
        docids: PathBuf,

        /// Raw collection file (for --show)
        #[arg(short = 'm', long, default_value = "documents.txt")]
        documents: PathBuf,

        /// Apply cosine score normalization
        #[arg(short, long)]
        normalize_scores: bool,

        /// Number of results to print
        #[arg(short = 'k', long, default_value = "10")]
        top: usize,

        /// Also print the body of the best-scoring document
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Preprocess { input, output } => {
            let normalizer = TextNormalizer::new(&NormalizerConfig::default());
            let reader = BufReader::new(File::open(&input)?);
            let mut writer = BufWriter::new(File::create(&output)?);
            let lines = preprocess_collection(&normalizer, reader, &mut writer)?;
            info!(lines, output = %output.display(), "preprocessing completed");
        }

        Command::Index {
            documents,
            processed,
            dictionary,
            postings,
            docids,
        } => {
            let paths = scour::IndexPaths {
                documents,
                processed,
                dictionary,
                postings,
                docids,
            };
            let summary = build_index(&paths)?;
            info!(
                documents = summary.num_documents,
                terms = summary.num_terms,
                postings = summary.num_postings,
                "indexing completed"
            );
        }

        Command::Search {
            query,
            dictionary,
            postings,
            docids,
            documents,
            normalize_scores,
            top,
            show,
        } => {
            let normalizer = TextNormalizer::new(&NormalizerConfig::default());
            let config = SearchConfig { normalize_scores };
            let engine = SearchEngine::from_files(&dictionary, &postings, normalizer, &config)?;
            let mut store = DocumentStore::open(&docids, &documents)?;

            let results = engine.retrieve(&query)?;
            for (rank, (doc_index, score)) in results.iter().take(top).enumerate() {
                let (doc_id, title) = store.resolve(*doc_index)?;
                println!(
                    "{:2}. {:.6}  {}  {}",
                    rank + 1,
                    score,
                    doc_id,
                    title.replace('\n', " ")
                );
            }

            if show {
                if let Some((doc_index, _)) = results.first() {
                    let (doc_id, _) = store.resolve(*doc_index)?;
                    let doc_id = doc_id.to_string();
                    println!("\n{}", store.fetch_text(&doc_id)?);
                }
            }
        }
    }

    Ok(())
}
