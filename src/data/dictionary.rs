//! Bilingual dictionary files

use anyhow::{anyhow, Context, Result};
use crate::counts::Vocabulary;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Word pairs from a bilingual dictionary, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    pub pairs: Vec<(String, String)>,
}

impl Dictionary {
    /// Parse whitespace-separated `source target` lines. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut pairs = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let (source, target) = match (fields.next(), fields.next(), fields.next()) {
                (None, _, _) => continue,
                (Some(source), Some(target), None) => (source, target),
                _ => {
                    return Err(anyhow!(
                        "line {}: expected two words, got {:?}",
                        line_no + 1,
                        line
                    ))
                }
            };
            pairs.push((source.to_string(), target.to_string()));
        }

        Ok(Self { pairs })
    }

    /// Distinct words from both sides, in first-seen order
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        let mut seen = HashSet::new();
        let tokens: Vec<&str> = self
            .pairs
            .iter()
            .flat_map(|(source, target)| [source.as_str(), target.as_str()])
            .filter(|token| seen.insert(*token))
            .collect();

        Ok(Vocabulary::new(tokens)?)
    }
}

/// Read a dictionary file and derive its vocabulary
pub fn load_dictionary_vocabulary<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
    let path = path.as_ref();
    log::info!("Reading bilingual dictionary: {}", path.display());

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read dictionary file {}", path.display()))?;
    let dictionary = Dictionary::parse(&text)
        .with_context(|| format!("invalid dictionary file {}", path.display()))?;

    let vocabulary = dictionary.vocabulary()?;
    log::info!(
        "Loaded {} word pairs covering {} tokens",
        dictionary.pairs.len(),
        vocabulary.len()
    );

    Ok(vocabulary)
}
