pub mod conformance;
pub mod entity;
pub mod error;
pub mod request;
pub mod search;
pub mod security;

pub use conformance::{
    FhirServiceInfo, OperationDefinition, OperationParameterDefinition, ParameterUse, Profile,
};
pub use entity::{EntityKind, JsonOnlyCodec, ResourceEntity, WireCodec};
pub use error::{CoreError, Result};
pub use request::{
    AcceptFormat, ContainerResponse, Interaction, InteractionKind, Request, Response,
};
pub use search::{
    RequestSearchParameter, SearchModifier, SearchNumber, SearchParameterDefinition,
    SearchParameterType, SearchPrefix, TypedSearchValue,
};
pub use security::{FhirUser, Jwt, SecurityContext};
