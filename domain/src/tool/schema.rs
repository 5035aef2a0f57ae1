//! Model-facing projection of tool actions.
//!
//! The model never sees raw tool ids, static values, or the
//! `filled_by_llm` flag. It sees one function per active action, named
//! `{action_name}_{tool_id}` so that actions sharing a name across tools
//! stay distinct.

use super::entities::{ToolAction, ToolId, ToolSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Function signature exposed to the model for one tool action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposedToolSchema {
    /// Composite name: `{action_name}_{tool_id}`
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the model-supplied arguments
    pub parameters: Value,
}

impl ExposedToolSchema {
    /// Project a single action of a tool
    pub fn for_action(tool_id: &ToolId, action: &ToolAction) -> Self {
        Self {
            name: composite_name(&action.name, tool_id),
            description: action.description.clone(),
            parameters: exposed_parameters(action),
        }
    }

    /// Names of the parameters the model must supply
    pub fn required(&self) -> Vec<&str> {
        self.parameters["required"]
            .as_array()
            .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of exposed parameters
    pub fn parameter_count(&self) -> usize {
        self.parameters["properties"]
            .as_object()
            .map(|p| p.len())
            .unwrap_or(0)
    }
}

/// Build the composite function name for an action
pub fn composite_name(action_name: &str, tool_id: &ToolId) -> String {
    format!("{}_{}", action_name, tool_id)
}

fn exposed_parameters(action: &ToolAction) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (_, group) in action.groups() {
        for (name, field) in &group.properties {
            if !field.filled_by_llm {
                continue;
            }
            let mut prop = field.schema.clone();
            prop.insert("type".to_string(), Value::String(field.field_type.clone()));
            properties.insert(name.clone(), Value::Object(prop));
            if !required.iter().any(|r: &Value| r.as_str() == Some(name.as_str())) {
                required.push(Value::String(name.clone()));
            }
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

impl ToolSet {
    /// Project every active action of every tool, ordered by tool id then
    /// declared action order.
    pub fn exposed_schemas(&self) -> Vec<ExposedToolSchema> {
        self.all()
            .flat_map(|tool| {
                tool.active_actions()
                    .map(move |action| ExposedToolSchema::for_action(&tool.id, action))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParamLocation, ParameterField, ParameterGroup, ToolDefinition};

    fn weather_tool() -> ToolDefinition {
        ToolDefinition::new("abc123", "api_tool").with_action(
            ToolAction::new("get_forecast", "Forecast for a city")
                .with_endpoint("GET", "https://api.example.com/forecast")
                .with_group(
                    ParamLocation::QueryParams,
                    ParameterGroup::new()
                        .with_field(
                            "city",
                            ParameterField::new("string").with_description("City name"),
                        )
                        .with_field("units", ParameterField::fixed("string", "metric")),
                )
                .with_group(
                    ParamLocation::Headers,
                    ParameterGroup::new()
                        .with_field("X-Api-Key", ParameterField::fixed("string", "secret")),
                ),
        )
    }

    #[test]
    fn test_composite_name() {
        let schema = ExposedToolSchema::for_action(
            &ToolId::new("abc123"),
            &weather_tool().actions[0],
        );
        assert_eq!(schema.name, "get_forecast_abc123");
        assert_eq!(schema.description, "Forecast for a city");
    }

    #[test]
    fn test_only_llm_fields_are_exposed_and_stripped() {
        let tool = weather_tool();
        let schema = ExposedToolSchema::for_action(&tool.id, &tool.actions[0]);

        assert_eq!(schema.parameter_count(), 1);
        let city = &schema.parameters["properties"]["city"];
        assert_eq!(city["type"], "string");
        assert_eq!(city["description"], "City name");
        assert!(city.get("value").is_none());
        assert!(city.get("filled_by_llm").is_none());
        assert!(schema.parameters["properties"].get("units").is_none());
        assert!(schema.parameters["properties"].get("X-Api-Key").is_none());
    }

    #[test]
    fn test_every_exposed_parameter_is_required() {
        let tool = ToolDefinition::new("t9", "brave").with_action(
            ToolAction::new("search", "Search the web").with_group(
                ParamLocation::Parameters,
                ParameterGroup::new()
                    .with_field("query", ParameterField::new("string"))
                    .with_field("count", ParameterField::new("integer")),
            ),
        );
        let schema = ExposedToolSchema::for_action(&tool.id, &tool.actions[0]);
        let mut required = schema.required();
        required.sort();
        assert_eq!(required, vec!["count", "query"]);
    }

    #[test]
    fn test_all_static_fields_yield_empty_parameters() {
        let tool = ToolDefinition::new("t1", "api_tool").with_action(
            ToolAction::new("ping", "Ping")
                .with_group(
                    ParamLocation::Body,
                    ParameterGroup::new().with_field("msg", ParameterField::fixed("string", "hi")),
                )
                .with_group(
                    ParamLocation::Headers,
                    ParameterGroup::new()
                        .with_field("Auth", ParameterField::fixed("string", "token")),
                ),
        );
        let schemas = ToolSet::new().register(tool).exposed_schemas();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].parameter_count(), 0);
        assert!(schemas[0].required().is_empty());
    }

    #[test]
    fn test_duplicate_field_across_groups_listed_once() {
        let tool = ToolDefinition::new("t2", "api_tool").with_action(
            ToolAction::new("put", "Put")
                .with_group(
                    ParamLocation::QueryParams,
                    ParameterGroup::new().with_field("id", ParameterField::new("string")),
                )
                .with_group(
                    ParamLocation::Body,
                    ParameterGroup::new().with_field("id", ParameterField::new("string")),
                ),
        );
        let schema = ExposedToolSchema::for_action(&tool.id, &tool.actions[0]);
        assert_eq!(schema.required(), vec!["id"]);
    }

    #[test]
    fn test_exposed_schemas_skip_inactive_actions_and_order_by_id() {
        let set = ToolSet::new()
            .register(
                ToolDefinition::new("zz", "ntfy")
                    .with_action(ToolAction::new("send", "Send"))
                    .with_action(ToolAction::new("mute", "Mute").inactive()),
            )
            .register(ToolDefinition::new("aa", "brave").with_action(ToolAction::new("search", "")));

        let names: Vec<_> = set.exposed_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["search_aa", "send_zz"]);
    }
}
