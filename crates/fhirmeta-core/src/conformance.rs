//! Conformance artifact types contributed by implementation guides.
//!
//! These are the immutable values the registry indexes: resource profiles,
//! operation definitions and live service bindings. Parsing them out of IG
//! source artifacts is the loader's job; this module only defines the shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A named constraint on a resource type's shape, identified by canonical URL.
///
/// `model_type` is an opaque descriptor naming the in-memory model the
/// payload deserializes into; the registry stores it without interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub url: String,
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    #[serde(rename = "modelType")]
    pub model_type: String,
}

impl Profile {
    pub fn new(
        url: impl Into<String>,
        resource_type: impl Into<String>,
        model_type: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            resource_type: resource_type.into(),
            model_type: model_type.into(),
        }
    }
}

/// Direction of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterUse {
    #[default]
    In,
    Out,
}

/// A single parameter of an operation definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationParameterDefinition {
    pub name: String,
    #[serde(rename = "use")]
    pub use_: ParameterUse,
    pub min: u32,
    pub max: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl OperationParameterDefinition {
    /// Create a parameter with the defaults: `use = in`, `min = 0`, `max = "*"`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_: ParameterUse::In,
            min: 0,
            max: "*".to_string(),
            type_: None,
            documentation: None,
        }
    }

    #[must_use]
    pub fn with_use(mut self, use_: ParameterUse) -> Self {
        self.use_ = use_;
        self
    }

    #[must_use]
    pub fn with_cardinality(mut self, min: u32, max: impl Into<String>) -> Self {
        self.min = min;
        self.max = max.into();
        self
    }

    #[must_use]
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    #[must_use]
    pub fn with_documentation(mut self, doc: impl Into<String>) -> Self {
        self.documentation = Some(doc.into());
        self
    }
}

/// Definition of a named, non-CRUD action invocable at instance, type or
/// system level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub name: String,
    #[serde(rename = "instanceLevel")]
    pub instance_level: bool,
    #[serde(rename = "typeLevel")]
    pub type_level: bool,
    #[serde(rename = "systemLevel")]
    pub system_level: bool,
    #[serde(rename = "affectsState", skip_serializing_if = "Option::is_none")]
    pub affects_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameter: Vec<OperationParameterDefinition>,
}

impl OperationDefinition {
    /// Create an operation definition with all levels false.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance_level: false,
            type_level: false,
            system_level: false,
            affects_state: None,
            resource: None,
            parameter: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_levels(mut self, instance: bool, type_: bool, system: bool) -> Self {
        self.instance_level = instance;
        self.type_level = type_;
        self.system_level = system;
        self
    }

    #[must_use]
    pub fn with_affects_state(mut self, affects_state: bool) -> Self {
        self.affects_state = Some(affects_state);
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: Vec<String>) -> Self {
        self.resource = Some(resource);
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: OperationParameterDefinition) -> Self {
        self.parameter.push(parameter);
        self
    }
}

/// Descriptor of a live service bound to a resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FhirServiceInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub metadata: HashMap<String, Value>,
}

impl FhirServiceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            metadata: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_serialization_uses_wire_names() {
        let profile = Profile::new(
            "http://hl7.org/fhir/StructureDefinition/Patient",
            "Patient",
            "fhir.r4.Patient",
        );
        let j = serde_json::to_value(&profile).unwrap();
        assert_eq!(j["url"], "http://hl7.org/fhir/StructureDefinition/Patient");
        assert_eq!(j["resourceType"], "Patient");
        assert_eq!(j["modelType"], "fhir.r4.Patient");
    }

    #[test]
    fn test_operation_parameter_defaults() {
        let param = OperationParameterDefinition::new("resource");
        assert_eq!(param.use_, ParameterUse::In);
        assert_eq!(param.min, 0);
        assert_eq!(param.max, "*");
        assert!(param.type_.is_none());
    }

    #[test]
    fn test_operation_definition_builder() {
        let op = OperationDefinition::new("match")
            .with_levels(false, true, false)
            .with_affects_state(false)
            .with_resource(vec!["Patient".to_string()])
            .with_parameter(
                OperationParameterDefinition::new("resource")
                    .with_cardinality(1, "1")
                    .with_type("Patient"),
            );

        assert_eq!(op.name, "match");
        assert!(!op.instance_level);
        assert!(op.type_level);
        assert!(!op.system_level);
        assert_eq!(op.affects_state, Some(false));
        assert_eq!(op.parameter.len(), 1);
        assert_eq!(op.parameter[0].min, 1);
    }

    #[test]
    fn test_operation_definition_roundtrip() {
        let op = OperationDefinition::new("everything").with_levels(true, false, false);
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"instanceLevel\":true"));
        let back: OperationDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn test_service_info_builder() {
        let info = FhirServiceInfo::new("terminology-gateway")
            .with_version("2.1.0")
            .with_metadata("region", json!("eu-west-1"));
        assert_eq!(info.name, "terminology-gateway");
        assert_eq!(info.version.as_deref(), Some("2.1.0"));
        assert_eq!(info.metadata["region"], json!("eu-west-1"));
    }
}
