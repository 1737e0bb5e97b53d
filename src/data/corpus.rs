//! Plain-text vocabulary and document files

use anyhow::{Context, Result};
use crate::counts::Vocabulary;
use std::fs;
use std::path::Path;

/// Read a vocabulary file with one token per line. Blank lines are skipped.
pub fn load_vocabulary<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
    let path = path.as_ref();
    log::info!("Reading vocabulary: {}", path.display());

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read vocabulary file {}", path.display()))?;

    let vocabulary = parse_vocabulary(&text)
        .with_context(|| format!("invalid vocabulary in {}", path.display()))?;

    log::info!("Loaded {} vocabulary tokens", vocabulary.len());
    Ok(vocabulary)
}

/// Parse newline-separated tokens
pub fn parse_vocabulary(text: &str) -> Result<Vocabulary> {
    let tokens = text.lines().map(str::trim).filter(|line| !line.is_empty());
    Ok(Vocabulary::new(tokens)?)
}

/// Read a document file, one document per line
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    log::info!("Reading documents: {}", path.display());

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read document file {}", path.display()))?;

    let documents: Vec<String> = text.lines().map(str::to_string).collect();

    log::info!("Loaded {} documents", documents.len());
    Ok(documents)
}
