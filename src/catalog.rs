//! Type catalog
//!
//! Rust has no runtime class loader, so the catalog plays that role: it maps
//! fully-qualified type names to their [`ComponentType`] descriptors.
//! `#[derive(Component)]` submits a [`TypeRegistration`] for every type it
//! expands on, and [`TypeCatalog::from_inventory`] collects all of them from
//! every crate linked into the binary.

use crate::metadata::ComponentType;
use crate::{DiError, Result};
use ahash::RandomState;
use std::collections::HashMap;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Link-time registration of one descriptor
pub struct TypeRegistration {
    descriptor: fn() -> ComponentType,
}

impl TypeRegistration {
    /// Used by the derive macro inside `inventory::submit!`
    pub const fn new(descriptor: fn() -> ComponentType) -> Self {
        Self { descriptor }
    }

    /// Build the descriptor
    #[inline]
    pub fn descriptor(&self) -> ComponentType {
        (self.descriptor)()
    }
}

inventory::collect!(TypeRegistration);

/// Fully-qualified name → descriptor
#[derive(Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<&'static str, ComponentType, RandomState>,
}

impl TypeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every registration submitted by `#[derive(Component)]`
    pub fn from_inventory() -> Self {
        let mut catalog = Self::new();
        for registration in inventory::iter::<TypeRegistration> {
            catalog.insert(registration.descriptor());
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "simple_ioc",
            type_count = catalog.len(),
            "Collected type catalog from link-time registrations"
        );

        catalog
    }

    /// Add a descriptor. Returns `false` if the name was already present;
    /// the existing descriptor is kept.
    pub fn insert(&mut self, ty: ComponentType) -> bool {
        if self.types.contains_key(ty.name()) {
            #[cfg(feature = "logging")]
            warn!(
                target: "simple_ioc",
                service = ty.name(),
                "Type already in catalog, ignoring second descriptor"
            );
            return false;
        }
        self.types.insert(ty.name(), ty);
        true
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, ty: ComponentType) -> Self {
        self.insert(ty);
        self
    }

    /// Load one type by fully-qualified name
    pub fn load(&self, name: &str) -> Result<ComponentType> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| DiError::type_not_found(name))
    }

    /// Load every type declared directly in `module_path`.
    ///
    /// Fails with `TypeNotFound` when the module declares no known types.
    pub fn load_module(&self, module_path: &str) -> Result<Vec<ComponentType>> {
        let types: Vec<_> = self
            .types
            .values()
            .filter(|ty| ty.module_path() == module_path)
            .cloned()
            .collect();

        if types.is_empty() {
            Err(DiError::type_not_found(module_path))
        } else {
            Ok(types)
        }
    }

    /// All known types, in no particular order
    pub fn types(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("count", &self.len())
            .finish()
    }
}
