//! Implementation-guide ingestion boundary.
//!
//! The registry reads IGs through the [`ImplementationGuide`] trait; parsing
//! IG source artifacts into these values is the loader's job. Terminology
//! flows straight through to a [`TerminologySink`] — the registry neither
//! validates nor caches it.

use fhirmeta_core::conformance::{OperationDefinition, Profile};
use fhirmeta_core::search::SearchParameterDefinition;
use serde_json::Value;
use std::collections::HashMap;

/// Opaque terminology payload handed to the terminology component.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminologyBundle(pub Value);

/// A loaded implementation guide: profiles, search-parameter definitions,
/// operation definitions and terminology for one deployment artifact.
pub trait ImplementationGuide: Send + Sync {
    /// IG name, unique within a deployment (e.g. a package id).
    fn name(&self) -> &str;

    fn profiles(&self) -> Vec<Profile>;

    /// Search-parameter definitions grouped by resource type. A sequence of
    /// maps rather than one map because IG source artifacts commonly come in
    /// per-file groups; the registry flattens them.
    fn search_parameters(&self) -> Vec<HashMap<String, Vec<SearchParameterDefinition>>>;

    /// Operation definitions grouped by resource type, if the IG defines any.
    fn operations(&self) -> Option<HashMap<String, Vec<OperationDefinition>>>;

    /// Terminology bundle, if the IG ships one.
    fn terminology(&self) -> Option<TerminologyBundle>;
}

/// External terminology component. Hand-off is fire-and-forget: ordering and
/// atomicity on the terminology side are its own concern.
pub trait TerminologySink: Send + Sync {
    fn add_terminology(&self, bundle: TerminologyBundle);
}
