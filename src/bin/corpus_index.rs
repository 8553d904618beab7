use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use corpus_index::core::config::{IndexConfig, SearchConfig, TokenizerConfig};
use corpus_index::core::error::Result;
use corpus_index::core::types::{CacheMode, IndexKind, RankingMode};
use corpus_index::corpus::reader::{read_queries, CorpusReader};
use corpus_index::eval::evaluator;
use corpus_index::index::writer::build_index;
use corpus_index::query::executor::QueryExecutor;
use corpus_index::storage::layout::IndexLayout;

#[derive(Parser)]
#[command(name = "corpus-index", about = "Builds and searches an inverted index over titles and abstracts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an index from a line-delimited JSON (optionally gzipped) corpus.
    Index {
        collection: PathBuf,
        output_path: PathBuf,
        #[arg(long, value_enum, default_value = "non-positional")]
        index_kind: CliIndexKind,
        #[arg(long, value_enum, default_value = "none")]
        cache: CliCacheMode,
        #[arg(long, default_value_t = 1.2)]
        bm25_k1: f64,
        #[arg(long, default_value_t = 0.75)]
        bm25_b: f64,
        #[arg(long, default_value = "lnc.ltc")]
        tfidf_smart: String,
        #[arg(long, default_value = "[a-zA-Z0-9]{3,}")]
        regex: String,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        lowercase: bool,
        #[arg(long, default_value_t = 3)]
        min_len: usize,
        #[arg(long)]
        stopwords: Option<PathBuf>,
        #[arg(long, action = clap::ArgAction::SetTrue)]
        stemmer: bool,
        #[arg(long)]
        memory_fraction: Option<f64>,
        #[arg(long, default_value_t = 10_000)]
        probe_batch_size: usize,
    },
    /// Rank documents for a batch (or interactive stream) of queries.
    Search {
        index_folder: PathBuf,
        questions: PathBuf,
        output_file: PathBuf,
        #[arg(value_enum)]
        ranking_mode: CliRankingMode,
        #[arg(long, default_value_t = 10)]
        top_k: usize,
        #[arg(long, default_value_t = 1.2)]
        bm25_k1: f64,
        #[arg(long, default_value_t = 0.75)]
        bm25_b: f64,
        #[arg(long, default_value = "lnc.ltc")]
        tfidf_smart: String,
        #[arg(long, action = clap::ArgAction::SetTrue)]
        interactive: bool,
    },
    /// Compare a run file against a gold standard file.
    Eval {
        gold_file: PathBuf,
        run_file: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum CliIndexKind {
    NonPositional,
    Positional,
}

impl From<CliIndexKind> for IndexKind {
    fn from(kind: CliIndexKind) -> Self {
        match kind {
            CliIndexKind::NonPositional => IndexKind::NonPositional,
            CliIndexKind::Positional => IndexKind::Positional,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum CliCacheMode {
    None,
    Bm25,
    TfIdf,
}

impl From<CliCacheMode> for CacheMode {
    fn from(mode: CliCacheMode) -> Self {
        match mode {
            CliCacheMode::None => CacheMode::None,
            CliCacheMode::Bm25 => CacheMode::Bm25,
            CliCacheMode::TfIdf => CacheMode::TfIdf,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum CliRankingMode {
    Bm25,
    TfIdf,
}

impl From<CliRankingMode> for RankingMode {
    fn from(mode: CliRankingMode) -> Self {
        match mode {
            CliRankingMode::Bm25 => RankingMode::Bm25,
            CliRankingMode::TfIdf => RankingMode::TfIdf,
        }
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Index {
            collection,
            output_path,
            index_kind,
            cache,
            bm25_k1,
            bm25_b,
            tfidf_smart,
            regex,
            lowercase,
            min_len,
            stopwords,
            stemmer,
            memory_fraction,
            probe_batch_size,
        } => {
            let config = IndexConfig {
                tokenizer: TokenizerConfig {
                    regex,
                    lowercase,
                    min_len,
                    stopwords_path: stopwords.map(|path| path.to_string_lossy().to_string()),
                    stemmer,
                },
                index_kind: index_kind.into(),
                cache_mode: cache.into(),
                bm25_k1,
                bm25_b,
                tfidf_smart,
                memory_budget_fraction: memory_fraction,
                probe_batch_size,
            };
            let records = CorpusReader::open(&collection)?;
            let metadata = build_index(records, &config, output_path)?;
            log::info!("indexed {} documents", metadata.document_count);
        }
        Command::Search {
            index_folder,
            questions,
            output_file,
            ranking_mode,
            top_k,
            bm25_k1,
            bm25_b,
            tfidf_smart,
            interactive,
        } => {
            let search_config = SearchConfig { top_k, bm25_k1, bm25_b, tfidf_smart };
            search_config.validate()?;
            let layout = IndexLayout::new(&index_folder)?;
            let executor = QueryExecutor::open(&layout)?;
            let mode: RankingMode = ranking_mode.into();

            if interactive {
                run_interactive(&executor, mode, &search_config)?;
            } else {
                let queries = read_queries(&questions)?;
                let runs = executor.search_batch(&queries, mode, &search_config)?;
                let mut out = File::create(&output_file)?;
                for run in &runs {
                    writeln!(out, "{}", serde_json::to_string(run)?)?;
                }
                log::info!("wrote {} results to {}", runs.len(), output_file.display());
            }
        }
        Command::Eval { gold_file, run_file, output } => {
            let report = evaluator::evaluate_files(&gold_file, &run_file)?;
            let output_path = output.unwrap_or_else(|| PathBuf::from(format!("{}_eval.json", report.query_file_name)));
            serde_json::to_writer_pretty(File::create(&output_path)?, &report.to_json())?;
            println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        }
    }
    Ok(())
}

fn run_interactive(executor: &QueryExecutor, mode: RankingMode, config: &SearchConfig) -> Result<()> {
    let stdin = io::stdin();
    println!("Enter a query (blank line to quit):");
    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            break;
        }
        let ranked = executor.search(query, mode, config)?;
        for (pmid, score) in ranked {
            println!("{pmid}\t{score:.4}");
        }
    }
    Ok(())
}
