//! Model registry
//!
//! Populated once at startup, then shared read-only behind an `Arc`, so
//! concurrent readers need no synchronization.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::models::{
    DomainModel, EconomicModel, InfrastructureModel, MilitaryModel, ModelDescriptor, SocialModel,
};
use crate::scenario::{EnvironmentType, ModelKind};
use crate::{Error, Result};

/// Registry entry: capability descriptor plus implementation.
#[derive(Clone)]
pub struct RegisteredModel {
    descriptor: ModelDescriptor,
    implementation: Arc<dyn DomainModel>,
}

impl RegisteredModel {
    /// Get the capability descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Get a shared handle to the implementation.
    #[must_use]
    pub fn implementation(&self) -> Arc<dyn DomainModel> {
        Arc::clone(&self.implementation)
    }
}

impl std::fmt::Debug for RegisteredModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredModel")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Catalog mapping model identifiers to descriptors and implementations.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: FxHashMap<ModelKind, RegisteredModel>,
}

impl ModelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four built-in domain models.
    #[must_use]
    pub fn with_default_models() -> Self {
        let mut registry = Self::new();
        registry.register_model(MilitaryModel);
        registry.register_model(EconomicModel);
        registry.register_model(SocialModel);
        registry.register_model(InfrastructureModel);
        registry
    }

    /// Register an implementation under an identifier, replacing any
    /// previous entry.
    pub fn register(
        &mut self,
        model: ModelKind,
        descriptor: ModelDescriptor,
        implementation: Arc<dyn DomainModel>,
    ) {
        debug!(%model, name = descriptor.name(), "model registered");
        self.models.insert(
            model,
            RegisteredModel {
                descriptor,
                implementation,
            },
        );
    }

    /// Register a model under its own identifier and descriptor.
    pub fn register_model<M: DomainModel + 'static>(&mut self, model: M) {
        let kind = model.kind();
        let descriptor = model.descriptor();
        self.register(kind, descriptor, Arc::new(model));
    }

    /// Look up a registered model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`] for an unregistered identifier.
    pub fn lookup(&self, model: ModelKind) -> Result<&RegisteredModel> {
        self.models.get(&model).ok_or(Error::ModelNotFound(model))
    }

    /// Models applicable to an environment type, in identifier order.
    #[must_use]
    pub fn list_applicable(&self, environment: EnvironmentType) -> BTreeSet<ModelKind> {
        self.models
            .iter()
            .filter(|(_, entry)| entry.descriptor.supports(environment))
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Number of registered models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
