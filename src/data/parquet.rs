//! Parquet file handling for corpus documents

use anyhow::{anyhow, Result};
use polars::prelude::*;

/// Load the text column of a Parquet corpus as a document list.
///
/// Null cells are skipped.
pub fn load_documents(path: &str, text_column: &str) -> Result<Vec<String>> {
    log::info!("Reading parquet file: {}", path);

    if !std::path::Path::new(path).exists() {
        return Err(anyhow!("File not found: {}", path));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?
        .select([col(text_column)])
        .collect()?;

    log::debug!("File schema: {:?}", df.schema());

    let texts = df.column(text_column)?.str()?;
    let documents: Vec<String> = texts
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    let nulls = df.height() - documents.len();
    if nulls > 0 {
        log::debug!("Skipped {} null documents", nulls);
    }
    log::info!("Loaded {} documents from column {}", documents.len(), text_column);

    Ok(documents)
}
