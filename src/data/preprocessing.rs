//! Document preprocessing applied before counting

/// Keep at most `max_documents` documents, in order. `None` keeps everything.
pub fn limit_documents(mut documents: Vec<String>, max_documents: Option<usize>) -> Vec<String> {
    if let Some(max) = max_documents {
        if documents.len() > max {
            log::info!("Limiting corpus from {} to {} documents", documents.len(), max);
            documents.truncate(max);
        }
    }
    documents
}

/// Remove documents that contain only whitespace
pub fn drop_blank_documents(documents: Vec<String>) -> Vec<String> {
    let before = documents.len();
    let kept: Vec<String> = documents
        .into_iter()
        .filter(|doc| !doc.trim().is_empty())
        .collect();

    if kept.len() < before {
        log::debug!("Dropped {} blank documents", before - kept.len());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit_documents(docs(&["a", "b", "c"]), Some(2)), docs(&["a", "b"]));
        assert_eq!(limit_documents(docs(&["a"]), Some(5)), docs(&["a"]));
        assert_eq!(limit_documents(docs(&["a", "b"]), None), docs(&["a", "b"]));
    }

    #[test]
    fn test_drop_blank() {
        assert_eq!(drop_blank_documents(docs(&["a", " ", "", "b"])), docs(&["a", "b"]));
    }
}
