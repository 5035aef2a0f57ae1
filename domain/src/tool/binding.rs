//! Parameter binding: static values + model arguments → invocation maps.
//!
//! Groups are always visited in [`ParamLocation::ORDER`] (query params,
//! headers, body, parameters). A model argument is written into every
//! group that declares it, and always overrides a static value.

use super::entities::{ParamLocation, ToolAction};
use serde_json::{Map, Value};

/// Concrete value maps ready for invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    pub query_params: Map<String, Value>,
    pub headers: Map<String, Value>,
    pub body: Map<String, Value>,
    pub parameters: Map<String, Value>,
    /// Model arguments that no group declares (dropped)
    pub ignored: Vec<String>,
}

impl BoundParameters {
    pub fn group(&self, location: ParamLocation) -> &Map<String, Value> {
        match location {
            ParamLocation::QueryParams => &self.query_params,
            ParamLocation::Headers => &self.headers,
            ParamLocation::Body => &self.body,
            ParamLocation::Parameters => &self.parameters,
        }
    }

    fn group_mut(&mut self, location: ParamLocation) -> &mut Map<String, Value> {
        match location {
            ParamLocation::QueryParams => &mut self.query_params,
            ParamLocation::Headers => &mut self.headers,
            ParamLocation::Body => &mut self.body,
            ParamLocation::Parameters => &mut self.parameters,
        }
    }
}

/// Merge an action's static values with the model's arguments.
pub fn bind_parameters(action: &ToolAction, arguments: &Map<String, Value>) -> BoundParameters {
    let mut bound = BoundParameters::default();

    for (location, group) in action.groups() {
        for (name, field) in &group.properties {
            if arguments.contains_key(name) {
                continue;
            }
            if let Some(value) = &field.value {
                bound.group_mut(location).insert(name.clone(), value.clone());
            }
        }
    }

    for (name, value) in arguments {
        let mut placed = false;
        for (location, group) in action.groups() {
            if group.declares(name) {
                bound.group_mut(location).insert(name.clone(), value.clone());
                placed = true;
            }
        }
        if !placed {
            bound.ignored.push(name.clone());
        }
    }

    bound
}
