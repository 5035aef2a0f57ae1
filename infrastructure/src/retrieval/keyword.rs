//! Keyword retriever over local documents
//!
//! Documents are loaded once from either a directory of `.md` / `.txt`
//! files or a JSON file holding an array of `{text, metadata}` objects.
//! A document's score is the number of occurrences of the query's terms
//! in its lowercased text; the `top_k` best documents with a non-zero
//! score are returned, ties kept in load order.

use async_trait::async_trait;
use docent_application::ports::retriever::{Retriever, RetrieverError};
use docent_domain::RetrievedDocument;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DOCUMENT_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Minimum term length that counts towards a score
const MIN_TERM_LEN: usize = 2;

/// Retriever that scores an in-memory corpus by keyword frequency
#[derive(Debug, Clone)]
pub struct FileKeywordRetriever {
    source: PathBuf,
    documents: Vec<RetrievedDocument>,
    /// Lowercased copies of the document texts, same order as `documents`
    haystacks: Vec<String>,
    top_k: usize,
}

impl FileKeywordRetriever {
    /// Load the corpus at `path`.
    pub fn load(path: impl AsRef<Path>, top_k: usize) -> Result<Self, RetrieverError> {
        let path = path.as_ref();
        let documents = if path.is_dir() {
            load_directory(path)?
        } else {
            load_json(path)?
        };
        debug!(
            "Loaded {} retrieval document(s) from {}",
            documents.len(),
            path.display()
        );
        Ok(Self::from_documents(path, documents, top_k))
    }

    /// Build from documents already in memory.
    pub fn from_documents(
        source: impl Into<PathBuf>,
        documents: Vec<RetrievedDocument>,
        top_k: usize,
    ) -> Self {
        let haystacks = documents.iter().map(|d| d.text.to_lowercase()).collect();
        Self {
            source: source.into(),
            documents,
            haystacks,
            top_k,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn rank(&self, query: &str) -> Vec<RetrievedDocument> {
        let query = query.to_lowercase();
        let terms: Vec<&str> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= MIN_TERM_LEN)
            .collect();
        if terms.is_empty() || self.top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, usize)> = self
            .haystacks
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let score = terms.iter().map(|term| text.matches(term).count()).sum();
                (index, score)
            })
            .filter(|(_, score)| *score > 0)
            .collect();
        // sort_by is stable: equal scores keep load order
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        scored
            .into_iter()
            .take(self.top_k)
            .map(|(index, _)| self.documents[index].clone())
            .collect()
    }
}

fn load_directory(dir: &Path) -> Result<Vec<RetrievedDocument>, RetrieverError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| RetrieverError::Unavailable(format!("{}: {}", dir.display(), e)))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => {
                let title = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                documents.push(RetrievedDocument::new(text).with_metadata(json!({
                    "title": title,
                    "source": path.display().to_string(),
                })));
            }
            Ok(_) => debug!("Skipping empty document {}", path.display()),
            Err(e) => warn!("Failed to read {}: {}", path.display(), e),
        }
    }
    Ok(documents)
}

fn load_json(path: &Path) -> Result<Vec<RetrievedDocument>, RetrieverError> {
    let content = fs::read_to_string(path)
        .map_err(|e| RetrieverError::Unavailable(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| RetrieverError::Unavailable(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl Retriever for FileKeywordRetriever {
    async fn search(&self, query: &str) -> Result<Vec<RetrievedDocument>, RetrieverError> {
        Ok(self.rank(query))
    }

    fn snapshot(&self) -> Value {
        json!({
            "source": self.source.display().to_string(),
            "documents": self.documents.len(),
            "top_k": self.top_k,
        })
    }
}
