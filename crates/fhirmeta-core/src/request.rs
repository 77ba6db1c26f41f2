//! Interaction, request and response value model.
//!
//! A [`Request`] is an immutable snapshot of what the caller asked for; a
//! [`Response`] is what the server returns. Both are safe to pass across
//! concurrent handling stages without synchronization. [`Interaction`] is a
//! closed, tag-discriminated variant set — adding an interaction kind means
//! extending the enum, never widening an existing variant.

use crate::conformance::Profile;
use crate::entity::ResourceEntity;
use crate::search::RequestSearchParameter;
use indexmap::IndexMap;
use std::fmt;

/// One FHIR REST verb instance with its interaction-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Read {
        id: String,
    },
    Search {
        /// Profile applied when the query names none explicitly.
        default_profile: Option<Profile>,
    },
    Create,
    Update {
        id: String,
    },
    Delete {
        id: String,
    },
    Operation {
        name: String,
    },
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::Read { .. } => InteractionKind::Read,
            Self::Search { .. } => InteractionKind::Search,
            Self::Create => InteractionKind::Create,
            Self::Update { .. } => InteractionKind::Update,
            Self::Delete { .. } => InteractionKind::Delete,
            Self::Operation { .. } => InteractionKind::Operation,
        }
    }
}

/// Discriminant tag of an [`Interaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Read,
    Search,
    Create,
    Update,
    Delete,
    Operation,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Read => "read",
            Self::Search => "search",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Operation => "operation",
        };
        f.write_str(s)
    }
}

/// Wire format the client asked for in the Accept header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptFormat {
    #[default]
    Json,
    Xml,
}

impl AcceptFormat {
    /// Resolve an Accept header value to a format. Unknown or wildcard
    /// values fall back to JSON.
    #[must_use]
    pub fn parse(accept: &str) -> Self {
        let accept = accept.to_ascii_lowercase();
        if accept.contains("application/fhir+xml") || accept.contains("application/xml") {
            Self::Xml
        } else {
            Self::Json
        }
    }
}

impl fmt::Display for AcceptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("application/fhir+json"),
            Self::Xml => f.write_str("application/fhir+xml"),
        }
    }
}

/// Immutable snapshot of a validated incoming interaction.
///
/// `resource_type` is `None` only for system-level interactions (whole-system
/// search, capabilities); instance- and type-level interactions always carry
/// one. Search parameters are an ordered list per name: a name may legally
/// repeat in a query string (`date=ge2020-01-01&date=le2020-12-31`) and list
/// order is what downstream AND-semantics evaluation relies on.
#[derive(Debug, Clone)]
pub struct Request {
    interaction: Interaction,
    resource_type: Option<String>,
    entity: Option<ResourceEntity>,
    search_parameters: IndexMap<String, Vec<RequestSearchParameter>>,
    accept: AcceptFormat,
}

impl Request {
    pub fn builder(interaction: Interaction) -> RequestBuilder {
        RequestBuilder {
            interaction,
            resource_type: None,
            entity: None,
            search_parameters: IndexMap::new(),
            accept: AcceptFormat::default(),
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn entity(&self) -> Option<&ResourceEntity> {
        self.entity.as_ref()
    }

    pub fn search_parameters(&self) -> &IndexMap<String, Vec<RequestSearchParameter>> {
        &self.search_parameters
    }

    /// All values supplied for one parameter name, in query-string order.
    pub fn search_parameter(&self, name: &str) -> &[RequestSearchParameter] {
        self.search_parameters
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn accept(&self) -> AcceptFormat {
        self.accept
    }

    /// True for interactions addressing the whole system rather than a
    /// resource type.
    pub fn is_system_level(&self) -> bool {
        self.resource_type.is_none()
    }
}

/// Consuming builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    interaction: Interaction,
    resource_type: Option<String>,
    entity: Option<ResourceEntity>,
    search_parameters: IndexMap<String, Vec<RequestSearchParameter>>,
    accept: AcceptFormat,
}

impl RequestBuilder {
    #[must_use]
    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: ResourceEntity) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Append one decoded search parameter, preserving arrival order within
    /// its name.
    #[must_use]
    pub fn search_parameter(mut self, param: RequestSearchParameter) -> Self {
        self.search_parameters
            .entry(param.name().to_string())
            .or_default()
            .push(param);
        self
    }

    #[must_use]
    pub fn accept(mut self, accept: AcceptFormat) -> Self {
        self.accept = accept;
        self
    }

    pub fn build(self) -> Request {
        Request {
            interaction: self.interaction,
            resource_type: self.resource_type,
            entity: self.entity,
            search_parameters: self.search_parameters,
            accept: self.accept,
        }
    }
}

/// Immutable wrapper holding exactly one singular resource entity.
#[derive(Debug, Clone)]
pub struct Response {
    entity: ResourceEntity,
}

impl Response {
    pub fn new(entity: ResourceEntity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &ResourceEntity {
        &self.entity
    }
}

/// Immutable wrapper holding exactly one container/bundle entity.
#[derive(Debug, Clone)]
pub struct ContainerResponse {
    entity: ResourceEntity,
}

impl ContainerResponse {
    pub fn new(entity: ResourceEntity) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &ResourceEntity {
        &self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::JsonOnlyCodec;
    use crate::search::{SearchPrefix, TypedSearchValue};
    use serde_json::json;
    use std::sync::Arc;
    use time::macros::datetime;

    fn date_param(raw: &str, prefix: SearchPrefix, dt: time::PrimitiveDateTime) -> RequestSearchParameter {
        RequestSearchParameter::new(
            "date",
            raw,
            None,
            TypedSearchValue::date(Some(prefix), dt),
        )
    }

    #[test]
    fn test_interaction_kind_tags() {
        assert_eq!(Interaction::Create.kind().to_string(), "create");
        assert_eq!(
            Interaction::Read { id: "p1".into() }.kind(),
            InteractionKind::Read
        );
        assert_eq!(
            Interaction::Operation {
                name: "match".into()
            }
            .kind()
            .to_string(),
            "operation"
        );
    }

    #[test]
    fn test_accept_format_parse() {
        assert_eq!(AcceptFormat::parse("application/fhir+json"), AcceptFormat::Json);
        assert_eq!(AcceptFormat::parse("application/fhir+xml"), AcceptFormat::Xml);
        assert_eq!(AcceptFormat::parse("Application/XML"), AcceptFormat::Xml);
        assert_eq!(AcceptFormat::parse("*/*"), AcceptFormat::Json);
    }

    #[test]
    fn test_repeated_parameter_preserves_order() {
        let request = Request::builder(Interaction::Search {
            default_profile: None,
        })
        .resource_type("Observation")
        .search_parameter(date_param(
            "ge2020-01-01",
            SearchPrefix::Ge,
            datetime!(2020-01-01 00:00),
        ))
        .search_parameter(date_param(
            "le2020-12-31",
            SearchPrefix::Le,
            datetime!(2020-12-31 00:00),
        ))
        .build();

        let dates = request.search_parameter("date");
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].raw_value(), "ge2020-01-01");
        assert_eq!(dates[1].raw_value(), "le2020-12-31");
        assert!(request.search_parameter("code").is_empty());
    }

    #[test]
    fn test_system_level_request_has_no_resource_type() {
        let request = Request::builder(Interaction::Search {
            default_profile: None,
        })
        .build();
        assert!(request.is_system_level());
        assert!(request.resource_type().is_none());
    }

    #[test]
    fn test_type_level_request_carries_resource_type() {
        let request = Request::builder(Interaction::Read { id: "p1".into() })
            .resource_type("Patient")
            .build();
        assert!(!request.is_system_level());
        assert_eq!(request.resource_type(), Some("Patient"));
    }

    #[test]
    fn test_response_holds_entity() {
        let entity = ResourceEntity::wrap(
            &json!({"resourceType": "Patient", "id": "p1"}),
            Arc::new(JsonOnlyCodec),
        );
        let response = Response::new(entity);
        assert_eq!(response.entity().unwrap()["id"], "p1");
    }

    #[test]
    fn test_search_default_profile_travels_with_interaction() {
        let profile = Profile::new(
            "http://example.org/StructureDefinition/vital-signs",
            "Observation",
            "fhir.r4.Observation",
        );
        let request = Request::builder(Interaction::Search {
            default_profile: Some(profile.clone()),
        })
        .resource_type("Observation")
        .build();

        match request.interaction() {
            Interaction::Search { default_profile } => {
                assert_eq!(default_profile.as_ref(), Some(&profile));
            }
            other => panic!("unexpected interaction: {other:?}"),
        }
    }
}
