//! Count caching and results persistence

use anyhow::{anyhow, Context, Result};
use crate::cluster::{ClusterResult, ClusterStats};
use crate::config::Config;
use crate::counts::{count_bigrams, count_unigrams, BigramTable, UnigramTable, Vocabulary};
use serde::{Deserialize, Serialize};
use serde_json::{json, to_string_pretty, Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk encoding of a count cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFormat {
    Json,
    Bincode,
}

impl CacheFormat {
    pub fn extension(self) -> &'static str {
        match self {
            CacheFormat::Json => "json",
            CacheFormat::Bincode => "bin",
        }
    }

    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(CacheFormat::Json),
            Some("bin") => Ok(CacheFormat::Bincode),
            _ => Err(anyhow!("unknown cache format for {}", path.display())),
        }
    }
}

/// Identity of the corpus a count cache was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSource {
    /// Where the documents were read from (file path, plus column for Parquet)
    pub location: String,

    /// Document limit applied before counting
    pub max_documents: Option<usize>,
}

/// Unigram and bigram tables for one language's vocabulary and corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountCache {
    pub language: String,
    pub corpus: CorpusSource,
    pub vocabulary: Vec<String>,
    pub unigrams: UnigramTable,
    pub bigrams: BigramTable,
}

impl CountCache {
    /// Count `documents` over `vocabulary`
    pub fn count<S>(
        language: &str,
        corpus: CorpusSource,
        vocabulary: &Vocabulary,
        documents: &[S],
    ) -> Self
    where
        S: AsRef<str> + Sync,
    {
        Self {
            language: language.to_string(),
            corpus,
            vocabulary: vocabulary.tokens().to_vec(),
            unigrams: count_unigrams(vocabulary, documents),
            bigrams: count_bigrams(vocabulary, documents),
        }
    }

    /// Whether this cache was counted over `vocabulary` and `corpus`
    pub fn matches(&self, vocabulary: &Vocabulary, corpus: &CorpusSource) -> bool {
        self.vocabulary.as_slice() == vocabulary.tokens() && &self.corpus == corpus
    }
}

/// Where and how counts are cached
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings<'a> {
    /// No caching when `None`
    pub cache_dir: Option<&'a Path>,
    pub language: &'a str,
    pub format: CacheFormat,
}

impl CacheSettings<'_> {
    pub fn path(&self) -> Option<PathBuf> {
        self.cache_dir
            .map(|dir| cache_path(dir, self.language, self.format))
    }
}

/// Load counts from the cache when it was built for the same vocabulary and
/// corpus; otherwise load the documents, count them and rewrite the cache.
pub fn load_or_count<F>(
    settings: &CacheSettings<'_>,
    corpus: &CorpusSource,
    vocabulary: &Vocabulary,
    load_documents: F,
) -> Result<CountCache>
where
    F: FnOnce() -> Result<Vec<String>>,
{
    let cache_file = settings.path();

    if let Some(path) = cache_file.as_ref().filter(|path| path.exists()) {
        match load_counts(path) {
            Ok(cache) if cache.matches(vocabulary, corpus) => {
                log::info!("Reusing counts for {} from {}", corpus.location, path.display());
                return Ok(cache);
            }
            Ok(_) => log::warn!(
                "Cached counts in {} were built for a different vocabulary or corpus; recounting",
                path.display()
            ),
            Err(e) => log::warn!("Unreadable count cache {}: {}; recounting", path.display(), e),
        }
    }

    let documents = load_documents()?;
    let cache = CountCache::count(settings.language, corpus.clone(), vocabulary, &documents);

    if let Some(path) = cache_file {
        save_counts(&path, &cache)?;
    }

    Ok(cache)
}

/// Cache file location for a language
pub fn cache_path(cache_dir: &Path, language: &str, format: CacheFormat) -> PathBuf {
    cache_dir.join(format!("counts_{}.{}", language, format.extension()))
}

/// Write a count cache, encoding chosen by the file extension
pub fn save_counts(path: &Path, cache: &CountCache) -> Result<()> {
    log::info!("Saving counts for {} to {}", cache.language, path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create cache file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match CacheFormat::from_path(path)? {
        CacheFormat::Json => serde_json::to_writer(&mut writer, cache)?,
        CacheFormat::Bincode => bincode::serialize_into(&mut writer, cache)?,
    }
    writer.flush()?;

    Ok(())
}

/// Read a count cache written by [`save_counts`]
pub fn load_counts(path: &Path) -> Result<CountCache> {
    log::info!("Loading cached counts from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("failed to open cache file {}", path.display()))?;
    let reader = BufReader::new(file);

    let cache: CountCache = match CacheFormat::from_path(path)? {
        CacheFormat::Json => serde_json::from_reader(reader)
            .with_context(|| format!("corrupt cache file {}", path.display()))?,
        CacheFormat::Bincode => bincode::deserialize_from(reader)
            .with_context(|| format!("corrupt cache file {}", path.display()))?,
    };

    Ok(cache)
}

/// Save clustering results to the specified directory
pub fn save_results(
    result: &ClusterResult,
    vocabulary: &Vocabulary,
    config: &Config,
    output_dir: &Path,
) -> Result<ClusterStats> {
    log::info!("Saving clustering results to {}", output_dir.display());

    fs::create_dir_all(output_dir)?;

    let mapping = result.to_mapping();
    let stats = ClusterStats::from_mapping(&mapping);

    save_summary(&stats, config, output_dir)?;
    save_clusters(result, vocabulary, output_dir)?;

    log::info!("Results saved successfully");

    Ok(stats)
}

/// Save run parameters and summary statistics
fn save_summary(stats: &ClusterStats, config: &Config, output_dir: &Path) -> Result<()> {
    let path = output_dir.join("summary.json");
    let mut file = File::create(path)?;

    let summary = json!({
        "parameters": {
            "theta": config.theta,
            "depth": config.depth,
            "dictionary_form": config.dictionary_form,
        },
        "cluster_stats": stats,
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save each token's partners, keyed by token string
fn save_clusters(result: &ClusterResult, vocabulary: &Vocabulary, output_dir: &Path) -> Result<()> {
    let path = output_dir.join("clusters.json");
    let mut file = File::create(path)?;

    let by_token = result.to_mapping().to_tokens(vocabulary)?;

    let clusters: Map<String, Value> = match result {
        ClusterResult::Dictionary(_) => by_token
            .into_iter()
            .map(|(token, partners)| {
                let markers: BTreeMap<String, u8> = partners
                    .into_iter()
                    .map(|p| (p, crate::cluster::PARTNER_MARKER))
                    .collect();
                (token, json!(markers))
            })
            .collect(),
        ClusterResult::Partners(_) => by_token
            .into_iter()
            .map(|(token, partners)| (token, json!(partners)))
            .collect(),
    };

    file.write_all(to_string_pretty(&Value::Object(clusters))?.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{cluster_graph, ClusterForm};
    use crate::graph::AdjacencyMatrix;
    use ndarray::array;

    fn corpus(location: &str, max_documents: Option<usize>) -> CorpusSource {
        CorpusSource {
            location: location.to_string(),
            max_documents,
        }
    }

    fn documents() -> Vec<String> {
        vec!["red car".to_string(), "car red car".to_string()]
    }

    fn sample_cache() -> CountCache {
        let mut bigrams = BigramTable::new();
        bigrams.insert(0, 1, 2).unwrap();
        bigrams.insert(1, 0, 0).unwrap();

        CountCache {
            language: "de".to_string(),
            corpus: corpus("de.txt", None),
            vocabulary: vec!["hund".to_string(), "katze".to_string()],
            unigrams: UnigramTable::from_counts(vec![3, 1]),
            bigrams,
        }
    }

    #[test]
    fn test_cache_path() {
        let path = cache_path(Path::new("cache"), "en", CacheFormat::Bincode);
        assert_eq!(path, Path::new("cache/counts_en.bin"));
    }

    #[test]
    fn test_json_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "de", CacheFormat::Json);

        save_counts(&path, &sample_cache()).unwrap();
        assert_eq!(load_counts(&path).unwrap(), sample_cache());
    }

    #[test]
    fn test_bincode_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path(), "de", CacheFormat::Bincode);

        save_counts(&path, &sample_cache()).unwrap();
        assert_eq!(load_counts(&path).unwrap(), sample_cache());
    }

    #[test]
    fn test_cache_matches_vocabulary_and_corpus() {
        let cache = sample_cache();
        let vocabulary = Vocabulary::new(["hund", "katze"]).unwrap();

        assert!(cache.matches(&vocabulary, &corpus("de.txt", None)));
        assert!(!cache.matches(&Vocabulary::new(["katze", "hund"]).unwrap(), &corpus("de.txt", None)));
        assert!(!cache.matches(&vocabulary, &corpus("other.txt", None)));
        assert!(!cache.matches(&vocabulary, &corpus("de.txt", Some(1))));
    }

    #[test]
    fn test_load_or_count_reuses_matching_cache() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings {
            cache_dir: Some(dir.path()),
            language: "en",
            format: CacheFormat::Json,
        };
        let vocabulary = Vocabulary::new(["red", "car"]).unwrap();
        let source = corpus("en.txt", None);

        let first = load_or_count(&settings, &source, &vocabulary, || Ok(documents())).unwrap();
        assert!(settings.path().unwrap().exists());
        assert_eq!(first.unigrams.get(1), 3);

        let second = load_or_count(&settings, &source, &vocabulary, || {
            Err(anyhow!("documents must not be reloaded"))
        })
        .unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn test_load_or_count_recounts_for_new_vocabulary() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings {
            cache_dir: Some(dir.path()),
            language: "en",
            format: CacheFormat::Bincode,
        };
        let source = corpus("en.txt", None);

        let old_vocabulary = Vocabulary::new(["red", "car"]).unwrap();
        load_or_count(&settings, &source, &old_vocabulary, || Ok(documents())).unwrap();

        let new_vocabulary = Vocabulary::new(["car", "red"]).unwrap();
        let mut loads = 0;
        let recounted = load_or_count(&settings, &source, &new_vocabulary, || {
            loads += 1;
            Ok(documents())
        })
        .unwrap();

        assert_eq!(loads, 1);
        assert_eq!(recounted.vocabulary, vec!["car", "red"]);
        assert_eq!(recounted.unigrams.get(0), 3);

        let rewritten = load_counts(&settings.path().unwrap()).unwrap();
        assert_eq!(rewritten, recounted);
    }

    #[test]
    fn test_load_or_count_recounts_for_new_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings {
            cache_dir: Some(dir.path()),
            language: "en",
            format: CacheFormat::Json,
        };
        let vocabulary = Vocabulary::new(["red", "car"]).unwrap();

        load_or_count(&settings, &corpus("en.txt", None), &vocabulary, || Ok(documents())).unwrap();

        let limited = corpus("en.txt", Some(1));
        let mut loads = 0;
        let recounted = load_or_count(&settings, &limited, &vocabulary, || {
            loads += 1;
            Ok(vec!["red car".to_string()])
        })
        .unwrap();

        assert_eq!(loads, 1);
        assert_eq!(recounted.corpus, limited);
        assert_eq!(recounted.unigrams.get(1), 1);
        assert_eq!(load_counts(&settings.path().unwrap()).unwrap().corpus, limited);
    }

    #[test]
    fn test_load_or_count_replaces_unreadable_cache() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings {
            cache_dir: Some(dir.path()),
            language: "en",
            format: CacheFormat::Json,
        };
        let path = settings.path().unwrap();
        // written before counts recorded their corpus
        fs::write(&path, r#"{"language":"en","vocabulary":["red","car"]}"#).unwrap();

        let vocab = Vocabulary::new(["red", "car"]).unwrap();
        let corpus = corpus("de.txt", None);
        let result = load_or_count(&settings, &corpus, &vocab, || Ok(documents())).unwrap();

        assert_eq!(result.unigrams.get(1), 3);
        assert_eq!(load_counts(&path).unwrap(), result);
    }

    #[test]
    fn test_load_or_count_without_cache_dir_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings {
            cache_dir: None,
            language: "en",
            format: CacheFormat::Json,
        };
        let vocabulary = Vocabulary::new(["red", "car"]).unwrap();

        let counts =
            load_or_count(&settings, &corpus("en.txt", None), &vocabulary, || Ok(documents()))
                .unwrap();

        assert_eq!(counts.bigrams.get(0, 1), 2);
        assert!(settings.path().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        assert!(save_counts(&path, &sample_cache()).is_err());
    }

    #[test]
    fn test_save_results() {
        let dir = tempfile::tempdir().unwrap();
        let vocabulary = Vocabulary::new(["dog", "hund"]).unwrap();
        let matrix = AdjacencyMatrix::from_array(array![[1.0, 0.5], [0.3, 1.0]]).unwrap();
        let result = cluster_graph(&matrix, 0.4, 1, ClusterForm::Partners).unwrap();

        let stats = save_results(&result, &vocabulary, &Config::default(), dir.path()).unwrap();
        assert_eq!(stats.relationships, 1);

        let clusters: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("clusters.json")).unwrap())
                .unwrap();
        assert_eq!(clusters, json!({ "dog": ["hund"], "hund": [] }));

        let summary: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["cluster_stats"]["linked_nodes"], json!(1));
    }

    #[test]
    fn test_save_results_dictionary_form() {
        let dir = tempfile::tempdir().unwrap();
        let vocabulary = Vocabulary::new(["dog", "hund"]).unwrap();
        let matrix = AdjacencyMatrix::from_array(array![[1.0, 0.5], [0.3, 1.0]]).unwrap();
        let result = cluster_graph(&matrix, 0.4, 1, ClusterForm::Dictionary).unwrap();

        save_results(&result, &vocabulary, &Config::default(), dir.path()).unwrap();

        let clusters: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("clusters.json")).unwrap())
                .unwrap();
        assert_eq!(clusters, json!({ "dog": { "hund": 1 }, "hund": {} }));
    }
}
