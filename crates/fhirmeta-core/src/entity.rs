//! Resource entity wrapper.
//!
//! [`ResourceEntity`] gives request/response handling a payload that cannot
//! be mutated through aliasing: `wrap` takes a deep copy in, and every
//! accessor hands a fresh deep copy out. Wire-format knowledge stays outside
//! — serialization is delegated to an injected [`WireCodec`], whose errors
//! are propagated unchanged.

use crate::error::{CoreError, Result};
use serde_json::Value;
use std::sync::Arc;

/// External serialization boundary: four codec functions, one per
/// entity-flavor/format pair. Implementations receive a deep-copied payload
/// and return the wire representation or a serialization error.
pub trait WireCodec: Send + Sync {
    fn resource_to_json(&self, payload: &Value) -> Result<String>;
    fn resource_to_xml(&self, payload: &Value) -> Result<String>;
    fn container_to_json(&self, payload: &Value) -> Result<String>;
    fn container_to_xml(&self, payload: &Value) -> Result<String>;
}

/// The two structural flavors of an entity, distinguished only by which
/// codec pair serializes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Resource,
    Container,
}

/// An immutable, exclusively-owned snapshot of a domain resource payload.
#[derive(Clone)]
pub struct ResourceEntity {
    payload: Value,
    kind: EntityKind,
    codec: Arc<dyn WireCodec>,
}

impl ResourceEntity {
    /// Wrap a singular resource payload, storing a private deep copy.
    pub fn wrap(payload: &Value, codec: Arc<dyn WireCodec>) -> Self {
        Self {
            payload: payload.clone(),
            kind: EntityKind::Resource,
            codec,
        }
    }

    /// Wrap a container/bundle payload, storing a private deep copy.
    pub fn wrap_container(payload: &Value, codec: Arc<dyn WireCodec>) -> Self {
        Self {
            payload: payload.clone(),
            kind: EntityKind::Container,
            codec,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// A fresh, independently mutable copy of the payload. Mutating the
    /// returned value never affects this entity or other copies.
    pub fn unwrap(&self) -> Value {
        self.payload.clone()
    }

    /// Serialize to JSON via the injected codec.
    pub fn to_json(&self) -> Result<String> {
        let copy = self.payload.clone();
        match self.kind {
            EntityKind::Resource => self.codec.resource_to_json(&copy),
            EntityKind::Container => self.codec.container_to_json(&copy),
        }
    }

    /// Serialize to XML via the injected codec.
    pub fn to_xml(&self) -> Result<String> {
        let copy = self.payload.clone();
        match self.kind {
            EntityKind::Resource => self.codec.resource_to_xml(&copy),
            EntityKind::Container => self.codec.container_to_xml(&copy),
        }
    }
}

impl std::fmt::Debug for ResourceEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceEntity")
            .field("kind", &self.kind)
            .field("payload", &self.payload)
            .finish()
    }
}

/// A codec that serializes both flavors through `serde_json` and rejects XML.
///
/// Useful as a default in deployments that only speak JSON; XML deployments
/// inject their own codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonOnlyCodec;

impl WireCodec for JsonOnlyCodec {
    fn resource_to_json(&self, payload: &Value) -> Result<String> {
        serde_json::to_string(payload).map_err(CoreError::from)
    }

    fn resource_to_xml(&self, _payload: &Value) -> Result<String> {
        Err(CoreError::serialization("XML codec not configured"))
    }

    fn container_to_json(&self, payload: &Value) -> Result<String> {
        serde_json::to_string(payload).map_err(CoreError::from)
    }

    fn container_to_xml(&self, _payload: &Value) -> Result<String> {
        Err(CoreError::serialization("XML codec not configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec() -> Arc<dyn WireCodec> {
        Arc::new(JsonOnlyCodec)
    }

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let payload = json!({"resourceType": "Patient", "id": "p1", "active": true});
        let entity = ResourceEntity::wrap(&payload, codec());
        assert_eq!(entity.unwrap(), payload);
    }

    #[test]
    fn test_unwrap_returns_independent_copies() {
        let payload = json!({"resourceType": "Patient", "id": "p1"});
        let entity = ResourceEntity::wrap(&payload, codec());

        let mut first = entity.unwrap();
        first["id"] = json!("mutated");

        let second = entity.unwrap();
        assert_eq!(second["id"], "p1");
        assert_eq!(entity.unwrap(), payload);
    }

    #[test]
    fn test_source_mutation_does_not_leak_in() {
        let mut payload = json!({"resourceType": "Patient", "id": "p1"});
        let entity = ResourceEntity::wrap(&payload, codec());

        payload["id"] = json!("changed-after-wrap");
        assert_eq!(entity.unwrap()["id"], "p1");
    }

    #[test]
    fn test_to_json_delegates_to_codec() {
        let payload = json!({"resourceType": "Patient", "id": "p1"});
        let entity = ResourceEntity::wrap(&payload, codec());
        let wire = entity.to_json().unwrap();
        let back: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_codec_error_propagates_unchanged() {
        struct FailingCodec;
        impl WireCodec for FailingCodec {
            fn resource_to_json(&self, _: &Value) -> Result<String> {
                Err(CoreError::serialization("boom"))
            }
            fn resource_to_xml(&self, _: &Value) -> Result<String> {
                Err(CoreError::serialization("boom"))
            }
            fn container_to_json(&self, _: &Value) -> Result<String> {
                Err(CoreError::serialization("boom"))
            }
            fn container_to_xml(&self, _: &Value) -> Result<String> {
                Err(CoreError::serialization("boom"))
            }
        }

        let entity = ResourceEntity::wrap(&json!({}), Arc::new(FailingCodec));
        let err = entity.to_json().unwrap_err();
        assert_eq!(err.to_string(), "Serialization error: boom");
    }

    #[test]
    fn test_container_flavor_uses_container_pair() {
        struct TaggingCodec;
        impl WireCodec for TaggingCodec {
            fn resource_to_json(&self, _: &Value) -> Result<String> {
                Ok("resource".to_string())
            }
            fn resource_to_xml(&self, _: &Value) -> Result<String> {
                Ok("resource-xml".to_string())
            }
            fn container_to_json(&self, _: &Value) -> Result<String> {
                Ok("container".to_string())
            }
            fn container_to_xml(&self, _: &Value) -> Result<String> {
                Ok("container-xml".to_string())
            }
        }

        let codec: Arc<dyn WireCodec> = Arc::new(TaggingCodec);
        let singular = ResourceEntity::wrap(&json!({}), codec.clone());
        let container = ResourceEntity::wrap_container(&json!({}), codec);

        assert_eq!(singular.kind(), EntityKind::Resource);
        assert_eq!(container.kind(), EntityKind::Container);
        assert_eq!(singular.to_json().unwrap(), "resource");
        assert_eq!(container.to_json().unwrap(), "container");
        assert_eq!(container.to_xml().unwrap(), "container-xml");
    }

    #[test]
    fn test_json_only_codec_rejects_xml() {
        let entity = ResourceEntity::wrap(&json!({}), codec());
        assert!(entity.to_xml().is_err());
    }
}
