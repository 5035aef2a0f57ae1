//! Retriever adapters
//!
//! - [`FileKeywordRetriever`]: keyword scoring over local documents

mod keyword;

pub use keyword::FileKeywordRetriever;
