use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use cooccurrence_cluster_analyzer::{
    cluster::{cluster_vocabulary, ClusterForm},
    config::Config,
    counts::Vocabulary,
    data,
    graph::build_matrix,
    storage::{self, CacheFormat, CacheSettings, CorpusSource},
};

#[derive(Parser, Debug)]
#[clap(
    name = "cooccurrence-cluster-analyzer",
    about = "Cluster vocabulary items by powers of a co-occurrence adjacency matrix"
)]
struct Cli {
    /// Vocabulary file, one token per line
    #[clap(long, required_unless_present = "dictionary", conflicts_with = "dictionary")]
    vocabulary: Option<PathBuf>,

    /// Bilingual dictionary file of `source target` pairs; its words form the vocabulary
    #[clap(long)]
    dictionary: Option<PathBuf>,

    /// Text corpus, one document per line
    #[clap(long, required_unless_present = "parquet", conflicts_with = "parquet")]
    documents: Option<PathBuf>,

    /// Parquet corpus
    #[clap(long)]
    parquet: Option<String>,

    /// Column holding document text in the Parquet corpus
    #[clap(long, default_value = "text")]
    text_column: String,

    /// Language tag used to key the count cache
    #[clap(long, default_value = "default")]
    language: String,

    /// Directory for cached unigram/bigram counts
    #[clap(long)]
    cache_dir: Option<PathBuf>,

    /// Store the count cache as bincode instead of JSON
    #[clap(long)]
    binary_cache: bool,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: PathBuf,

    /// Weight threshold a matrix-power entry must exceed
    #[clap(long, default_value = "0.4", allow_negative_numbers = true)]
    theta: f64,

    /// Highest matrix power to examine (0 or less skips clustering)
    #[clap(long, default_value = "1", allow_negative_numbers = true)]
    depth: i64,

    /// Write plain partner lists instead of partner -> marker maps
    #[clap(long)]
    partners_only: bool,

    /// Only use the first N documents
    #[clap(long)]
    max_documents: Option<usize>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn load_vocabulary(args: &Cli) -> Result<Vocabulary> {
    match (&args.vocabulary, &args.dictionary) {
        (Some(path), _) => data::corpus::load_vocabulary(path),
        (None, Some(path)) => data::dictionary::load_dictionary_vocabulary(path),
        (None, None) => Err(anyhow!("either --vocabulary or --dictionary is required")),
    }
}

fn load_documents(args: &Cli, config: &Config) -> Result<Vec<String>> {
    let documents = match (&args.documents, &args.parquet) {
        (Some(path), _) => data::corpus::load_documents(path)?,
        (None, Some(path)) => data::parquet::load_documents(path, &args.text_column)?,
        (None, None) => return Err(anyhow!("either --documents or --parquet is required")),
    };

    let documents = data::preprocessing::drop_blank_documents(documents);
    Ok(data::preprocessing::limit_documents(documents, config.max_documents))
}

/// Identify the corpus for cache validation
fn corpus_source(args: &Cli, config: &Config) -> CorpusSource {
    let location = match (&args.documents, &args.parquet) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) => format!("{}#{}", path, args.text_column),
        (None, None) => String::new(),
    };
    CorpusSource {
        location,
        max_documents: config.max_documents,
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = Config::new(
        args.theta,
        args.depth,
        !args.partners_only,
        args.max_documents,
        args.threads,
    );
    config.validate()?;

    let num_threads = config.worker_threads();
    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting co-occurrence cluster analysis");
    log::info!("Output: {}", args.output_dir.display());

    // 1. Vocabulary
    let vocabulary = load_vocabulary(&args)?;

    // 2. Unigram and bigram counts
    let settings = CacheSettings {
        cache_dir: args.cache_dir.as_deref(),
        language: &args.language,
        format: if args.binary_cache {
            CacheFormat::Bincode
        } else {
            CacheFormat::Json
        },
    };
    let corpus = corpus_source(&args, &config);
    let counts = storage::load_or_count(&settings, &corpus, &vocabulary, || {
        load_documents(&args, &config)
    })?;

    // 3. Adjacency matrix
    let matrix = build_matrix(&vocabulary, &counts.unigrams, &counts.bigrams)?;

    // 4. Clusters
    let form = ClusterForm::from(config.dictionary_form);
    let Some(result) = cluster_vocabulary(&vocabulary, &matrix, config.theta, config.depth, form)?
    else {
        log::info!("Depth {} requests no clustering; nothing to save", config.depth);
        return Ok(());
    };

    // 5. Save results
    let stats = storage::save_results(&result, &vocabulary, &config, &args.output_dir)?;

    log::info!(
        "Analysis complete: {} of {} tokens have partners. Results saved to {}",
        stats.linked_nodes,
        stats.node_count,
        args.output_dir.display()
    );

    Ok(())
}
