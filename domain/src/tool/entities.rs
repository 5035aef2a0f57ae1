//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Tool kind that is invoked as a generic HTTP API call
pub const API_TOOL: &str = "api_tool";

/// Opaque identifier of a stored tool (e.g. a database object id)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(String);

impl ToolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ToolId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ToolId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ToolId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a parameter ends up when the action is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    QueryParams,
    Headers,
    Body,
    Parameters,
}

impl ParamLocation {
    /// Fixed iteration order used for exposure and binding
    pub const ORDER: [ParamLocation; 4] = [
        ParamLocation::QueryParams,
        ParamLocation::Headers,
        ParamLocation::Body,
        ParamLocation::Parameters,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::QueryParams => "query_params",
            ParamLocation::Headers => "headers",
            ParamLocation::Body => "body",
            ParamLocation::Parameters => "parameters",
        }
    }
}

fn default_field_type() -> String {
    "string".to_string()
}

fn default_true() -> bool {
    true
}

/// A single declared parameter field
///
/// Unknown JSON-schema keywords (`description`, `enum`, ...) are kept in
/// [`schema`](Self::schema) and passed through to the model unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterField {
    /// Declared JSON type (defaults to "string")
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    /// Static value used when the model does not supply one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Whether the model must supply this field at call time
    #[serde(default = "default_true")]
    pub filled_by_llm: bool,
    /// Remaining schema keywords
    #[serde(flatten)]
    pub schema: Map<String, Value>,
}

impl ParameterField {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            value: None,
            filled_by_llm: true,
            schema: Map::new(),
        }
    }

    /// A field with a static value that the model never sees
    pub fn fixed(field_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            filled_by_llm: false,
            ..Self::new(field_type)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.schema
            .insert("description".to_string(), Value::String(description.into()));
        self
    }

}

/// A named group of parameter fields (`{"properties": {...}}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroup {
    #[serde(default)]
    pub properties: BTreeMap<String, ParameterField>,
}

impl ParameterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, field: ParameterField) -> Self {
        self.properties.insert(name.into(), field);
        self
    }

    pub fn declares(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A single invokable operation of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolAction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Inactive actions are neither exposed nor invoked
    #[serde(default = "default_true")]
    pub active: bool,
    /// Target URL (`api_tool` actions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// HTTP method (`api_tool` actions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub query_params: ParameterGroup,
    #[serde(default)]
    pub headers: ParameterGroup,
    #[serde(default)]
    pub body: ParameterGroup,
    #[serde(default)]
    pub parameters: ParameterGroup,
}

impl ToolAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            active: true,
            url: None,
            method: None,
            query_params: ParameterGroup::default(),
            headers: ParameterGroup::default(),
            body: ParameterGroup::default(),
            parameters: ParameterGroup::default(),
        }
    }

    pub fn with_endpoint(mut self, method: impl Into<String>, url: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.url = Some(url.into());
        self
    }

    pub fn with_group(mut self, location: ParamLocation, group: ParameterGroup) -> Self {
        *self.group_mut(location) = group;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn group(&self, location: ParamLocation) -> &ParameterGroup {
        match location {
            ParamLocation::QueryParams => &self.query_params,
            ParamLocation::Headers => &self.headers,
            ParamLocation::Body => &self.body,
            ParamLocation::Parameters => &self.parameters,
        }
    }

    fn group_mut(&mut self, location: ParamLocation) -> &mut ParameterGroup {
        match location {
            ParamLocation::QueryParams => &mut self.query_params,
            ParamLocation::Headers => &mut self.headers,
            ParamLocation::Body => &mut self.body,
            ParamLocation::Parameters => &mut self.parameters,
        }
    }

    /// Iterate groups in the fixed [`ParamLocation::ORDER`]
    pub fn groups(&self) -> impl Iterator<Item = (ParamLocation, &ParameterGroup)> {
        ParamLocation::ORDER
            .into_iter()
            .map(move |location| (location, self.group(location)))
    }

    /// Whether any group declares a field with this name
    pub fn declares(&self, name: &str) -> bool {
        self.groups().any(|(_, group)| group.declares(name))
    }
}

/// A stored tool: its kind, configuration, and actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub id: ToolId,
    /// Tool kind, used to load the backend (e.g. "api_tool")
    pub name: String,
    /// Backend-specific configuration
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub actions: Vec<ToolAction>,
}

impl ToolDefinition {
    pub fn new(id: impl Into<ToolId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            config: Map::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: ToolAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn is_api_tool(&self) -> bool {
        self.name == API_TOOL
    }

    pub fn active_actions(&self) -> impl Iterator<Item = &ToolAction> {
        self.actions.iter().filter(|a| a.active)
    }

    /// Look up an active action by name
    pub fn find_action(&self, name: &str) -> Option<&ToolAction> {
        self.active_actions().find(|a| a.name == name)
    }
}

/// Snapshot of the tools available to one generation, keyed by id
///
/// Ordered by id so that schema exposure is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: BTreeMap<ToolId, ToolDefinition>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.insert(tool);
        self
    }

    pub fn insert(&mut self, tool: ToolDefinition) {
        self.tools.insert(tool.id.clone(), tool);
    }

    pub fn get(&self, id: &str) -> Option<&ToolDefinition> {
        self.tools.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ToolId> {
        self.tools.keys()
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl FromIterator<ToolDefinition> for ToolSet {
    fn from_iter<I: IntoIterator<Item = ToolDefinition>>(iter: I) -> Self {
        let mut set = ToolSet::new();
        for tool in iter {
            set.insert(tool);
        }
        set
    }
}
