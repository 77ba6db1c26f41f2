//! Process-wide conformance registry.
//!
//! Single source of truth for which resource types, profiles, search
//! parameters, operations and live services exist in a deployment. Built
//! incrementally as implementation guides install; queried on the hot path
//! of every request.
//!
//! Each index is published behind an `ArcSwap`: writers clone the current
//! map, apply one whole logical mutation, and swap the result in, so readers
//! observe either the pre-merge or the post-merge state of an index — never
//! a partially merged one. Reads are lock-free; writers serialize on a
//! per-index-family mutex. The service catalog uses `DashMap` since bindings
//! come and go one entry at a time.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fhirmeta_core::conformance::{FhirServiceInfo, OperationDefinition, Profile};
use fhirmeta_core::search::SearchParameterDefinition;

use crate::error::{RegistryError, Result};
use crate::ig::{ImplementationGuide, TerminologySink};
use crate::operation_config::OperationConfig;

type ProfileMap = HashMap<String, Arc<Profile>>;
type ProfilesByType = HashMap<String, HashMap<String, Arc<Profile>>>;
type SearchParamsByType = HashMap<String, HashMap<String, Arc<SearchParameterDefinition>>>;
type OperationsByType = HashMap<String, HashMap<String, Arc<OperationDefinition>>>;

/// Default name of the base specification IG.
pub const DEFAULT_BASE_IG: &str = "hl7.fhir.core";

/// The central conformance index, safe under concurrent read/write.
pub struct ConformanceRegistry {
    /// Name of the IG whose profiles count as base-specification profiles
    base_ig: String,

    profiles_by_url: ArcSwap<ProfileMap>,
    profiles_by_type: ArcSwap<ProfilesByType>,
    base_profiles: ArcSwap<ProfileMap>,
    search_params: ArcSwap<SearchParamsByType>,
    operations: ArcSwap<OperationsByType>,
    services: DashMap<String, Arc<FhirServiceInfo>>,

    // Writer serialization per index family; readers never take these.
    profile_lock: Mutex<()>,
    search_lock: Mutex<()>,
    operation_lock: Mutex<()>,

    terminology: Option<Arc<dyn TerminologySink>>,
}

impl ConformanceRegistry {
    /// Create an empty registry with the default base-IG name.
    pub fn new() -> Self {
        Self {
            base_ig: DEFAULT_BASE_IG.to_string(),
            profiles_by_url: ArcSwap::from_pointee(HashMap::new()),
            profiles_by_type: ArcSwap::from_pointee(HashMap::new()),
            base_profiles: ArcSwap::from_pointee(HashMap::new()),
            search_params: ArcSwap::from_pointee(HashMap::new()),
            operations: ArcSwap::from_pointee(HashMap::new()),
            services: DashMap::new(),
            profile_lock: Mutex::new(()),
            search_lock: Mutex::new(()),
            operation_lock: Mutex::new(()),
            terminology: None,
        }
    }

    /// Designate which IG name supplies base-specification profiles.
    #[must_use]
    pub fn with_base_ig(mut self, name: impl Into<String>) -> Self {
        self.base_ig = name.into();
        self
    }

    /// Attach the external terminology component. Each installed IG's
    /// terminology bundle is forwarded to it after the merge passes.
    #[must_use]
    pub fn with_terminology(mut self, sink: Arc<dyn TerminologySink>) -> Self {
        self.terminology = Some(sink);
        self
    }

    /// Merge an implementation guide's profiles, search parameters and
    /// operations into the registry, then forward its terminology bundle.
    ///
    /// The three merge passes are independent atomic sections: a failure in
    /// one never corrupts state a prior pass already published. Search
    /// parameters and operations merge first-wins per `(resourceType, name)`;
    /// later IGs redefining an existing name are silently skipped.
    pub fn add_implementation_guide(&self, ig: &dyn ImplementationGuide) -> Result<()> {
        let ig_name = ig.name().to_string();
        let is_base = ig_name == self.base_ig;

        self.merge_profiles(&ig_name, is_base, ig.profiles())?;
        self.merge_search_parameters(&ig_name, ig.search_parameters());
        self.merge_operations(&ig_name, ig.operations());

        if let Some(bundle) = ig.terminology() {
            if let Some(sink) = &self.terminology {
                sink.add_terminology(bundle);
            }
        }

        tracing::info!(ig = %ig_name, base = is_base, "Installed implementation guide");
        Ok(())
    }

    fn merge_profiles(&self, ig_name: &str, is_base: bool, profiles: Vec<Profile>) -> Result<()> {
        // Validate before publishing anything so a configuration error
        // leaves every index untouched.
        for profile in &profiles {
            if profile.url.is_empty() {
                return Err(RegistryError::configuration(format!(
                    "IG '{ig_name}' contains a profile without a canonical url"
                )));
            }
            if profile.resource_type.is_empty() {
                return Err(RegistryError::configuration(format!(
                    "Profile '{}' in IG '{ig_name}' has no resource type",
                    profile.url
                )));
            }
        }

        let _guard = self.profile_lock.lock().expect("profile writer lock");

        let mut by_url = (**self.profiles_by_url.load()).clone();
        let mut by_type = (**self.profiles_by_type.load()).clone();
        let mut base = (**self.base_profiles.load()).clone();

        for profile in profiles {
            let profile = Arc::new(profile);
            by_url.insert(profile.url.clone(), profile.clone());
            by_type
                .entry(profile.resource_type.clone())
                .or_default()
                .insert(profile.url.clone(), profile.clone());
            if is_base {
                base.insert(profile.resource_type.clone(), profile.clone());
            }
            tracing::debug!(url = %profile.url, resource_type = %profile.resource_type, "Registered profile");
        }

        self.profiles_by_url.store(Arc::new(by_url));
        self.profiles_by_type.store(Arc::new(by_type));
        if is_base {
            self.base_profiles.store(Arc::new(base));
        }
        Ok(())
    }

    fn merge_search_parameters(
        &self,
        ig_name: &str,
        groups: Vec<HashMap<String, Vec<SearchParameterDefinition>>>,
    ) {
        if groups.is_empty() {
            return;
        }

        let _guard = self.search_lock.lock().expect("search writer lock");
        let mut params = (**self.search_params.load()).clone();

        for group in groups {
            for (resource_type, definitions) in group {
                let entry = params.entry(resource_type.clone()).or_default();
                for definition in definitions {
                    if entry.contains_key(&definition.name) {
                        tracing::debug!(
                            ig = %ig_name,
                            resource_type = %resource_type,
                            name = %definition.name,
                            "Search parameter already registered, keeping first"
                        );
                        continue;
                    }
                    entry.insert(definition.name.clone(), Arc::new(definition));
                }
            }
        }

        self.search_params.store(Arc::new(params));
    }

    fn merge_operations(
        &self,
        ig_name: &str,
        operations: Option<HashMap<String, Vec<OperationDefinition>>>,
    ) {
        let Some(operations) = operations else {
            return;
        };

        let _guard = self.operation_lock.lock().expect("operation writer lock");
        let mut ops = (**self.operations.load()).clone();

        for (resource_type, definitions) in operations {
            let entry = ops.entry(resource_type.clone()).or_default();
            for definition in definitions {
                if entry.contains_key(&definition.name) {
                    tracing::debug!(
                        ig = %ig_name,
                        resource_type = %resource_type,
                        name = %definition.name,
                        "Operation already registered, keeping first"
                    );
                    continue;
                }
                entry.insert(definition.name.clone(), Arc::new(definition));
            }
        }

        self.operations.store(Arc::new(ops));
    }

    /// All profiles registered for a resource type, keyed by canonical url.
    ///
    /// Returns an independent snapshot; an unknown resource type yields an
    /// empty map, never an error.
    pub fn get_resource_profiles(&self, resource_type: &str) -> HashMap<String, Profile> {
        self.profiles_by_type
            .load()
            .get(resource_type)
            .map(|profiles| {
                profiles
                    .iter()
                    .map(|(url, profile)| (url.clone(), (**profile).clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All search parameters registered for a resource type, keyed by name.
    pub fn get_resource_search_parameters(
        &self,
        resource_type: &str,
    ) -> HashMap<String, SearchParameterDefinition> {
        self.search_params
            .load()
            .get(resource_type)
            .map(|params| {
                params
                    .iter()
                    .map(|(name, def)| (name.clone(), (**def).clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_resource_search_parameter_by_name(
        &self,
        resource_type: &str,
        name: &str,
    ) -> Option<SearchParameterDefinition> {
        self.search_params
            .load()
            .get(resource_type)
            .and_then(|params| params.get(name))
            .map(|def| (**def).clone())
    }

    /// All operations registered for a resource type, keyed by name.
    pub fn get_resource_operations(
        &self,
        resource_type: &str,
    ) -> HashMap<String, OperationDefinition> {
        self.operations
            .load()
            .get(resource_type)
            .map(|ops| {
                ops.iter()
                    .map(|(name, def)| (name.clone(), (**def).clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_resource_operation_by_name(
        &self,
        resource_type: &str,
        operation: &str,
    ) -> Option<OperationDefinition> {
        self.operations
            .load()
            .get(resource_type)
            .and_then(|ops| ops.get(operation))
            .map(|def| (**def).clone())
    }

    /// Register an operation declared in deployment configuration.
    ///
    /// First-wins: if an operation of that name already exists for the
    /// resource type this is a silent no-op. Returns whether the
    /// registration took effect.
    pub fn register_resource_operation(
        &self,
        resource_type: &str,
        config: &OperationConfig,
    ) -> bool {
        let _guard = self.operation_lock.lock().expect("operation writer lock");

        let current = self.operations.load();
        if current
            .get(resource_type)
            .is_some_and(|ops| ops.contains_key(&config.name))
        {
            tracing::debug!(
                resource_type = %resource_type,
                name = %config.name,
                "Operation already registered, ignoring config entry"
            );
            return false;
        }

        let mut ops = (**current).clone();
        let definition = config.to_definition(resource_type);
        ops.entry(resource_type.to_string())
            .or_default()
            .insert(definition.name.clone(), Arc::new(definition));
        self.operations.store(Arc::new(ops));

        tracing::debug!(resource_type = %resource_type, name = %config.name, "Registered config-defined operation");
        true
    }

    pub fn find_profile(&self, url: &str) -> Option<Profile> {
        self.profiles_by_url
            .load()
            .get(url)
            .map(|profile| (**profile).clone())
    }

    /// The base-specification profile for a resource type, if the base IG
    /// registered one.
    pub fn find_base_profile(&self, resource_type: &str) -> Option<Profile> {
        self.base_profiles
            .load()
            .get(resource_type)
            .map(|profile| (**profile).clone())
    }

    /// True iff at least one profile is registered for the resource type.
    pub fn is_supported_resource(&self, resource_type: &str) -> bool {
        self.profiles_by_type
            .load()
            .get(resource_type)
            .is_some_and(|profiles| !profiles.is_empty())
    }

    /// Add a custom search parameter outside IG installation.
    ///
    /// No-op if the resource type has no registered profile or the name is
    /// already taken for that type (first-wins). Returns whether the
    /// registration took effect.
    pub fn add_search_parameter(
        &self,
        resource_type: &str,
        definition: SearchParameterDefinition,
    ) -> bool {
        if !self.is_supported_resource(resource_type) {
            tracing::debug!(
                resource_type = %resource_type,
                name = %definition.name,
                "Resource type not registered, ignoring custom search parameter"
            );
            return false;
        }

        let _guard = self.search_lock.lock().expect("search writer lock");

        let current = self.search_params.load();
        if current
            .get(resource_type)
            .is_some_and(|params| params.contains_key(&definition.name))
        {
            tracing::debug!(
                resource_type = %resource_type,
                name = %definition.name,
                "Search parameter already registered, ignoring custom definition"
            );
            return false;
        }

        let mut params = (**current).clone();
        params
            .entry(resource_type.to_string())
            .or_default()
            .insert(definition.name.clone(), Arc::new(definition));
        self.search_params.store(Arc::new(params));
        true
    }

    /// Bind a live service to a resource type. First-wins; returns whether
    /// the registration took effect.
    pub fn register_fhir_service(&self, resource_type: &str, info: FhirServiceInfo) -> bool {
        match self.services.entry(resource_type.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                tracing::debug!(resource_type = %resource_type, "Service already registered, ignoring");
                false
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Arc::new(info));
                true
            }
        }
    }

    pub fn get_fhir_service(&self, resource_type: &str) -> Option<FhirServiceInfo> {
        self.services
            .get(resource_type)
            .map(|entry| (**entry.value()).clone())
    }

    pub fn get_all_registered_fhir_services(&self) -> HashMap<String, FhirServiceInfo> {
        self.services
            .iter()
            .map(|entry| (entry.key().clone(), (**entry.value()).clone()))
            .collect()
    }

    /// Remove a service binding; returns whether an entry existed.
    pub fn remove_fhir_service(&self, resource_type: &str) -> bool {
        self.services.remove(resource_type).is_some()
    }
}

impl Default for ConformanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConformanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConformanceRegistry")
            .field("base_ig", &self.base_ig)
            .field("profiles", &self.profiles_by_url.load().len())
            .field("services", &self.services.len())
            .finish()
    }
}
