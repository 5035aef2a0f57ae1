//! JSON file tool store
//!
//! Reads a JSON array of tool documents in the shape a document database
//! exports them:
//!
//! ```json
//! [
//!   {
//!     "_id": {"$oid": "6650f0c2a1"},
//!     "user": "local",
//!     "name": "api_tool",
//!     "status": true,
//!     "config": {
//!       "actions": {
//!         "get_forecast": {
//!           "description": "Forecast for a city",
//!           "url": "https://api.example.com/forecast",
//!           "method": "GET",
//!           "query_params": {"properties": {"city": {"type": "string"}}}
//!         }
//!       }
//!     }
//!   }
//! ]
//! ```
//!
//! `api_tool` documents keep their actions inside `config.actions` (a map
//! keyed by action name); every other tool has a top-level `actions` list.
//! The file is re-read on every call so edits apply to the next generation.

use async_trait::async_trait;
use docent_application::ports::tool_store::{ToolStore, ToolStoreError};
use docent_domain::{API_TOOL, ToolAction, ToolDefinition, ToolSet};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEFAULT_USER: &str = "local";

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentId {
    Plain(String),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl DocumentId {
    fn into_string(self) -> String {
        match self {
            DocumentId::Plain(id) => id,
            DocumentId::ObjectId { oid } => oid,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolDocument {
    #[serde(rename = "_id", alias = "id")]
    id: DocumentId,
    name: String,
    #[serde(default = "default_user")]
    user: String,
    #[serde(default)]
    status: bool,
    #[serde(default)]
    config: Map<String, Value>,
    #[serde(default)]
    actions: Vec<ToolAction>,
}

impl ToolDocument {
    fn is_enabled_for(&self, user: &str) -> bool {
        self.status && self.user == user
    }

    fn into_definition(mut self) -> Result<ToolDefinition, String> {
        let id = self.id.into_string();
        if self.name == API_TOOL {
            if let Some(embedded) = self.config.remove("actions") {
                let mut actions = embedded_actions(embedded)
                    .map_err(|e| format!("tool {}: {}", id, e))?;
                self.actions.append(&mut actions);
            }
        }

        let mut definition = ToolDefinition::new(id, self.name);
        definition.config = self.config;
        definition.actions = self.actions;
        Ok(definition)
    }
}

/// Decode `config.actions`: either a map keyed by action name or a list.
fn embedded_actions(value: Value) -> Result<Vec<ToolAction>, String> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, action)| {
                let Value::Object(mut fields) = action else {
                    return Err(format!("action '{}' is not an object", name));
                };
                fields.entry("name").or_insert(Value::String(name.clone()));
                serde_json::from_value(Value::Object(fields))
                    .map_err(|e| format!("action '{}': {}", name, e))
            })
            .collect(),
        Value::Array(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        _ => Err("config.actions must be an object or an array".to_string()),
    }
}

/// Tool store backed by a JSON export file
#[derive(Debug, Clone)]
pub struct JsonFileToolStore {
    path: PathBuf,
}

impl JsonFileToolStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str, user: &str) -> Result<ToolSet, ToolStoreError> {
        let documents: Vec<Value> = serde_json::from_str(content).map_err(|e| {
            ToolStoreError::Malformed(format!("{}: {}", self.path.display(), e))
        })?;

        let mut tools = ToolSet::new();
        for raw in documents {
            let document: ToolDocument = match serde_json::from_value(raw) {
                Ok(document) => document,
                Err(e) => {
                    warn!("Skipping tool document in {}: {}", self.path.display(), e);
                    continue;
                }
            };
            if !document.is_enabled_for(user) {
                continue;
            }
            match document.into_definition() {
                Ok(definition) => tools.insert(definition),
                Err(e) => warn!("Skipping tool document in {}: {}", self.path.display(), e),
            }
        }
        Ok(tools)
    }
}

#[async_trait]
impl ToolStore for JsonFileToolStore {
    async fn list_active_tools(&self, user: &str) -> Result<ToolSet, ToolStoreError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ToolStoreError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let tools = self.parse(&content, user)?;
        debug!(
            "Loaded {} active tool(s) for '{}' from {}",
            tools.len(),
            user,
            self.path.display()
        );
        Ok(tools)
    }
}
