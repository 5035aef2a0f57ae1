//! Tool store adapters
//!
//! - [`JsonFileToolStore`]: reads exported tool documents from a JSON file

mod json_file;

pub use json_file::JsonFileToolStore;
