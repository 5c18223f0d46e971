//! Bean creation
//!
//! For each component: pick a constructor, resolve its arguments from the
//! registry, construct the instance, fill every injectable field, and
//! register the result under the component's bean name.
//!
//! Dependencies are matched by assignability with a linear scan over the
//! registry in registration order; the first match wins. Nothing is cached
//! between beans.

use crate::classifier::Classification;
use crate::metadata::{ComponentType, ConstructorDescriptor, Instance, TypeKey};
use crate::registry::{Bean, BeanRegistry};
use crate::{DiError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, error, trace};

/// Creates beans for component types and writes them into a registry
#[derive(Debug, Clone, Copy)]
pub struct Instantiator<'r> {
    registry: &'r BeanRegistry,
}

impl<'r> Instantiator<'r> {
    pub fn new(registry: &'r BeanRegistry) -> Self {
        Self { registry }
    }

    /// The constructor marked for injection, else the zero-argument one
    pub fn select_constructor(ty: &ComponentType) -> Result<&ConstructorDescriptor> {
        let constructors = ty.constructors();
        constructors
            .iter()
            .find(|c| c.is_injectable())
            .or_else(|| constructors.iter().find(|c| c.is_zero_arg()))
            .ok_or_else(|| DiError::NoSuitableConstructor {
                type_name: ty.name().to_string(),
            })
    }

    /// First registered bean assignable to `target`
    #[inline]
    pub fn resolve(&self, target: &TypeKey) -> Option<Bean> {
        self.registry.find_assignable(target)
    }

    fn resolve_arguments(
        &self,
        ty: &ComponentType,
        ctor: &ConstructorDescriptor,
    ) -> Result<Vec<Bean>> {
        ctor.params()
            .iter()
            .map(|param| {
                #[cfg(feature = "logging")]
                debug!(
                    target: "simple_ioc",
                    service = ty.name(),
                    parameter = param.name(),
                    "Resolving dependency for constructor parameter"
                );

                self.resolve(param).ok_or_else(|| DiError::UnresolvedParameter {
                    type_name: ty.name().to_string(),
                    param_type: param.name(),
                })
            })
            .collect()
    }

    fn inject_dependencies(&self, ty: &ComponentType, instance: &mut Instance) -> Result<()> {
        for field in ty.injectable_fields() {
            let dependency = self
                .resolve(&field.ty())
                .ok_or_else(|| DiError::UnresolvedField {
                    type_name: ty.name().to_string(),
                    field: field.name(),
                })?;

            field.inject(instance.as_mut(), &dependency)?;

            #[cfg(feature = "logging")]
            debug!(
                target: "simple_ioc",
                service = ty.name(),
                field = field.name(),
                dependency = dependency.name(),
                "Injected dependency into field"
            );
        }
        Ok(())
    }

    /// Construct and inject one instance without registering it
    pub fn create_instance(&self, ty: &ComponentType) -> Result<Bean> {
        let ctor = Self::select_constructor(ty)?;
        let args = self.resolve_arguments(ty, ctor)?;

        #[cfg(feature = "logging")]
        trace!(
            target: "simple_ioc",
            service = ty.name(),
            arguments = args.len(),
            "Invoking constructor"
        );

        let mut instance = ctor.invoke(&args)?;
        self.inject_dependencies(ty, &mut instance)?;

        Ok(Bean::new(ty.bean_name(), ty, Arc::from(instance)))
    }

    /// Create a bean for `ty` and register it.
    ///
    /// Errors and panics from user code are caught here, logged, and returned
    /// as `DiError::CreationFailed`, so one broken component cannot stop the
    /// rest. A duplicate name is only a warning: the first bean stays and
    /// `Ok(())` is returned.
    pub fn create_and_register(&self, ty: &ComponentType) -> Result<()> {
        let created = panic::catch_unwind(AssertUnwindSafe(|| self.create_instance(ty)))
            .unwrap_or_else(|payload| Err(DiError::panicked(ty.name(), payload.as_ref())));

        match created {
            Ok(bean) => match self.registry.register(bean) {
                Ok(()) | Err(DiError::DuplicateBean { .. }) => Ok(()),
                Err(e) => Err(e),
            },
            Err(cause) => {
                let err = DiError::creation_failed(ty.name(), cause);

                #[cfg(feature = "logging")]
                error!(
                    target: "simple_ioc",
                    service = ty.name(),
                    error = %err.trace(),
                    "Failed to create bean"
                );

                Err(err)
            }
        }
    }

    /// Register every classified component in order.
    ///
    /// Returns the per-bean failures; they never stop the remaining beans.
    pub fn register_all(&self, classification: &Classification) -> Vec<DiError> {
        classification
            .ordered()
            .filter_map(|ty| self.create_and_register(ty).err())
            .collect()
    }
}
