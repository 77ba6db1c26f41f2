//! Deployment-config operation definitions.
//!
//! Operations can be declared in deployment configuration instead of an IG.
//! [`OperationConfig`] is that lighter-weight shape; conversion fills in the
//! FHIR defaults and reads optional operation-level flags from a nested
//! metadata block, defaulting safely on any absence or type mismatch.

use fhirmeta_core::conformance::{
    OperationDefinition, OperationParameterDefinition, ParameterUse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration shape for an operation defined in deployment config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<OperationParameterConfig>,
    /// Free-form metadata block; `meta.operationLevels` may carry boolean
    /// level overrides.
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Value>,
}

impl OperationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            parameters: Vec::new(),
            additional_properties: None,
        }
    }

    #[must_use]
    pub fn with_documentation(mut self, doc: impl Into<String>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: OperationParameterConfig) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_additional_properties(mut self, props: Value) -> Self {
        self.additional_properties = Some(props);
        self
    }

    /// Build the full operation definition for `resource_type`.
    ///
    /// Level flags default to `false` and are raised only when
    /// `additionalProperties.meta.operationLevels` carries them as booleans;
    /// each flag defaults independently.
    pub fn to_definition(&self, resource_type: &str) -> OperationDefinition {
        let levels = self
            .additional_properties
            .as_ref()
            .and_then(|props| props.get("meta"))
            .and_then(|meta| meta.get("operationLevels"));

        let mut definition = OperationDefinition::new(&self.name)
            .with_levels(
                bool_field(levels, "instanceLevel"),
                bool_field(levels, "typeLevel"),
                bool_field(levels, "systemLevel"),
            )
            .with_resource(vec![resource_type.to_string()]);

        for parameter in &self.parameters {
            definition = definition.with_parameter(parameter.to_definition());
        }
        definition
    }
}

/// One parameter entry of an [`OperationConfig`]; all fields beyond the name
/// are optional and fall back to `use = in`, `min = 0`, `max = "*"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationParameterConfig {
    pub name: String,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<ParameterUse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

impl OperationParameterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_: None,
            min: None,
            max: None,
            type_: None,
        }
    }

    fn to_definition(&self) -> OperationParameterDefinition {
        let mut parameter = OperationParameterDefinition::new(&self.name).with_cardinality(
            self.min.unwrap_or(0),
            self.max.clone().unwrap_or_else(|| "*".to_string()),
        );
        if let Some(use_) = self.use_ {
            parameter = parameter.with_use(use_);
        }
        if let Some(type_) = &self.type_ {
            parameter = parameter.with_type(type_);
        }
        parameter
    }
}

/// Read a boolean field from an optional metadata object. Absent containers,
/// absent fields and non-boolean values all yield `false`.
fn bool_field(container: Option<&Value>, field: &str) -> bool {
    container
        .and_then(|v| v.get(field))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_levels_default_to_false_without_metadata() {
        let config = OperationConfig::new("match");
        let def = config.to_definition("Patient");
        assert!(!def.instance_level);
        assert!(!def.type_level);
        assert!(!def.system_level);
        assert_eq!(def.resource, Some(vec!["Patient".to_string()]));
    }

    #[test]
    fn test_levels_raised_from_metadata_booleans() {
        let config = OperationConfig::new("match").with_additional_properties(json!({
            "meta": {
                "operationLevels": {
                    "typeLevel": true,
                    "instanceLevel": false
                }
            }
        }));
        let def = config.to_definition("Patient");
        assert!(def.type_level);
        assert!(!def.instance_level);
        assert!(!def.system_level);
    }

    #[test]
    fn test_non_boolean_levels_silently_ignored() {
        let config = OperationConfig::new("export").with_additional_properties(json!({
            "meta": {
                "operationLevels": {
                    "systemLevel": "yes",
                    "typeLevel": 1
                }
            }
        }));
        let def = config.to_definition("Group");
        assert!(!def.system_level);
        assert!(!def.type_level);
    }

    #[test]
    fn test_missing_meta_block_is_not_an_error() {
        let config =
            OperationConfig::new("validate").with_additional_properties(json!({"other": {}}));
        let def = config.to_definition("Patient");
        assert!(!def.instance_level && !def.type_level && !def.system_level);
    }

    #[test]
    fn test_parameter_defaults_applied() {
        let config = OperationConfig::new("match")
            .with_parameter(OperationParameterConfig::new("resource"));
        let def = config.to_definition("Patient");
        assert_eq!(def.parameter.len(), 1);
        let p = &def.parameter[0];
        assert_eq!(p.use_, ParameterUse::In);
        assert_eq!(p.min, 0);
        assert_eq!(p.max, "*");
    }

    #[test]
    fn test_parameter_overrides_win() {
        let mut param = OperationParameterConfig::new("return");
        param.use_ = Some(ParameterUse::Out);
        param.min = Some(1);
        param.max = Some("1".to_string());
        param.type_ = Some("Bundle".to_string());

        let config = OperationConfig::new("match").with_parameter(param);
        let def = config.to_definition("Patient");
        let p = &def.parameter[0];
        assert_eq!(p.use_, ParameterUse::Out);
        assert_eq!(p.min, 1);
        assert_eq!(p.max, "1");
        assert_eq!(p.type_.as_deref(), Some("Bundle"));
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: OperationConfig = serde_json::from_value(json!({
            "name": "match",
            "documentation": "Patient matching",
            "parameters": [{"name": "resource", "min": 1, "max": "1"}],
            "additionalProperties": {"meta": {"operationLevels": {"typeLevel": true}}}
        }))
        .unwrap();

        let def = config.to_definition("Patient");
        assert_eq!(def.name, "match");
        assert!(def.type_level);
        assert_eq!(def.parameter[0].min, 1);
    }
}
