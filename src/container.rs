//! The IoC container
//!
//! `Container` drives the whole pipeline: derive the root namespace, discover
//! components, classify them, create and register beans, then serve lookups
//! by bean name.

use crate::catalog::TypeCatalog;
use crate::classifier::Classification;
use crate::instantiator::Instantiator;
use crate::registry::{Bean, BeanRegistry};
use crate::scanner::{DirectoryScanner, Discovery, LoadPath, SourceRoot, root_namespace};
use crate::{DiError, Result};
use once_cell::sync::OnceCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, error, info, warn};

/// Process-wide container, see [`Container::install_global`]
static GLOBAL: OnceCell<Container> = OnceCell::new();

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Namespace that was scanned
    pub namespace: String,
    /// Number of component types discovered
    pub discovered: usize,
    /// Beans in the registry after the run
    pub beans: usize,
    /// Per-bean creation failures
    pub failures: Vec<DiError>,
}

/// Dependency injection container.
///
/// Cloning is cheap; clones share the same registry.
///
/// # Examples
///
/// ```rust,ignore
/// use simple_ioc::{Component, Container};
/// use std::sync::Arc;
///
/// #[derive(Component, Default)]
/// pub struct EmailService;
///
/// #[derive(Component, Default)]
/// pub struct UserComponent {
///     #[inject]
///     email: Option<Arc<EmailService>>,
/// }
///
/// pub struct App;
///
/// let container = Container::builder()
///     .source_root(simple_ioc::source_root!())
///     .build();
/// container.run::<App>();
///
/// let user = container.get_bean("UserComponent");
/// ```
#[derive(Clone)]
pub struct Container {
    registry: Arc<BeanRegistry>,
    catalog: Arc<TypeCatalog>,
    discovery: Arc<dyn Discovery>,
}

impl Container {
    /// Create a container over every `#[derive(Component)]` type linked into
    /// the binary, scanning the load path from `SIMPLE_IOC_LOAD_PATH`.
    pub fn new() -> Self {
        Self::builder().load_path_from_env().build()
    }

    /// Start configuring a container
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Scan the namespace enclosing `Root` and register every component found.
    ///
    /// Never fails: errors are logged and whatever was registered stays.
    #[inline]
    pub fn run<Root: ?Sized + 'static>(&self) {
        self.run_namespace(root_namespace::<Root>());
    }

    /// Like [`run`](Self::run) with an explicit namespace
    pub fn run_namespace(&self, namespace: &str) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_run_namespace(namespace)))
            .unwrap_or_else(|payload| Err(DiError::panicked(namespace, payload.as_ref())));

        if let Err(err) = outcome {
            #[cfg(feature = "logging")]
            error!(
                target: "simple_ioc",
                namespace,
                error = %err,
                trace = %err.trace(),
                "Error starting container"
            );
            #[cfg(not(feature = "logging"))]
            let _ = err;
        }
    }

    /// Run the pipeline and report the outcome instead of swallowing errors.
    ///
    /// Per-bean failures do not make this fail; they are listed in the report.
    pub fn try_run_namespace(&self, namespace: &str) -> Result<RunReport> {
        #[cfg(feature = "logging")]
        debug!(target: "simple_ioc", namespace, "Scanning for components");

        let components = self.discovery.discover(namespace, &self.catalog)?;

        #[cfg(feature = "logging")]
        {
            info!(
                target: "simple_ioc",
                namespace,
                count = components.len(),
                "Found components"
            );
            for ty in &components {
                info!(target: "simple_ioc", component = ty.name(), "Found component");
            }
        }

        let classification = Classification::classify(&components);
        let failures = Instantiator::new(&self.registry).register_all(&classification);

        self.log_registered_beans();

        Ok(RunReport {
            namespace: namespace.to_string(),
            discovered: components.len(),
            beans: self.registry.len(),
            failures,
        })
    }

    fn log_registered_beans(&self) {
        #[cfg(feature = "logging")]
        {
            info!(
                target: "simple_ioc",
                count = self.registry.len(),
                "Registered beans"
            );
            for bean in self.registry.values() {
                info!(
                    target: "simple_ioc",
                    bean = bean.name(),
                    service = bean.type_name(),
                    "Registered bean"
                );
            }
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Bean registered under `name` (the component's simple type name)
    #[inline]
    pub fn get_bean(&self, name: &str) -> Option<Bean> {
        self.registry.get(name)
    }

    /// Bean registered under `name`, viewed as `T`
    #[inline]
    pub fn get_bean_as<T: ?Sized + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.registry.get_as::<T>(name)
    }

    #[inline]
    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }

    #[inline]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    // =========================================================================
    // Process-wide instance
    // =========================================================================

    /// Make this container the process-wide instance.
    ///
    /// Only the first call succeeds; later calls hand the container back.
    pub fn install_global(self) -> std::result::Result<&'static Container, Container> {
        GLOBAL.try_insert(self).map_err(|(_, rejected)| {
            #[cfg(feature = "logging")]
            warn!(target: "simple_ioc", "Global container already installed");
            rejected
        })
    }

    /// The process-wide instance, if one was installed
    #[inline]
    pub fn global() -> Option<&'static Container> {
        GLOBAL.get()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("beans", &self.registry.len())
            .field("types", &self.catalog.len())
            .finish()
    }
}

/// Builder for [`Container`]
#[derive(Default)]
pub struct ContainerBuilder {
    load_path: LoadPath,
    catalog: Option<TypeCatalog>,
    discovery: Option<Arc<dyn Discovery>>,
}

impl ContainerBuilder {
    /// Replace the load path used by the default directory scanner
    pub fn load_path(mut self, load_path: LoadPath) -> Self {
        self.load_path = load_path;
        self
    }

    /// Append one source root
    pub fn source_root(mut self, root: SourceRoot) -> Self {
        self.load_path.push(root);
        self
    }

    /// Append the roots listed in `SIMPLE_IOC_LOAD_PATH`.
    ///
    /// A malformed value is logged and ignored.
    pub fn load_path_from_env(mut self) -> Self {
        match LoadPath::from_env() {
            Ok(from_env) => {
                for root in from_env.roots() {
                    self.load_path.push(root.clone());
                }
            }
            Err(err) => {
                #[cfg(feature = "logging")]
                warn!(target: "simple_ioc", error = %err, "Ignoring malformed load path");
                #[cfg(not(feature = "logging"))]
                let _ = err;
            }
        }
        self
    }

    /// Use a specific catalog instead of the link-time registrations
    pub fn catalog(mut self, catalog: TypeCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a different discovery strategy; the load path is then unused
    pub fn discovery(mut self, discovery: impl Discovery + 'static) -> Self {
        self.discovery = Some(Arc::new(discovery));
        self
    }

    pub fn build(self) -> Container {
        let catalog = self.catalog.unwrap_or_else(TypeCatalog::from_inventory);
        let discovery = self
            .discovery
            .unwrap_or_else(|| Arc::new(DirectoryScanner::new(self.load_path)));

        #[cfg(feature = "logging")]
        debug!(
            target: "simple_ioc",
            types = catalog.len(),
            "Creating IoC container"
        );

        Container {
            registry: Arc::new(BeanRegistry::new()),
            catalog: Arc::new(catalog),
            discovery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ComponentType, ConstructorDescriptor, TypeKey};
    use crate::scanner::{CatalogScanner, ComponentSet};

    #[derive(Default)]
    struct Store;

    #[derive(Default)]
    struct Service {
        store: Option<Arc<Store>>,
    }

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with(
                ComponentType::builder::<Store>("app::Store")
                    .constructor(ConstructorDescriptor::default_of::<Store>())
                    .build(),
            )
            .with(
                ComponentType::builder::<Service>("app::Service")
                    .inject_field("store", TypeKey::of::<Store>(), |target, bean| {
                        let target = target
                            .downcast_mut::<Service>()
                            .ok_or_else(|| DiError::Internal("wrong target".into()))?;
                        target.store = bean.get::<Store>();
                        Ok(())
                    })
                    .constructor(ConstructorDescriptor::default_of::<Service>())
                    .build(),
            )
    }

    struct FailingDiscovery;

    impl Discovery for FailingDiscovery {
        fn discover(&self, namespace: &str, _catalog: &TypeCatalog) -> Result<ComponentSet> {
            Err(DiError::Scan {
                path: namespace.into(),
                reason: "disk on fire".into(),
            })
        }
    }

    struct PanickingDiscovery;

    impl Discovery for PanickingDiscovery {
        fn discover(&self, _namespace: &str, _catalog: &TypeCatalog) -> Result<ComponentSet> {
            panic!("discovery panicked")
        }
    }

    #[test]
    fn test_run_registers_and_injects() {
        let container = Container::builder()
            .catalog(catalog())
            .discovery(CatalogScanner)
            .build();

        let report = container.try_run_namespace("app").unwrap();
        assert_eq!(report.discovered, 2);
        assert_eq!(report.beans, 2);
        assert!(report.failures.is_empty());

        let store = container.get_bean_as::<Store>("Store").unwrap();
        let service = container.get_bean_as::<Service>("Service").unwrap();
        assert!(Arc::ptr_eq(service.store.as_ref().unwrap(), &store));
        assert!(container.get_bean("Missing").is_none());
    }

    #[test]
    fn test_empty_namespace_gives_empty_registry() {
        let container = Container::builder()
            .catalog(catalog())
            .discovery(CatalogScanner)
            .build();

        container.run_namespace("nothing::here");
        assert!(container.registry().is_empty());
    }

    #[test]
    fn test_run_swallows_discovery_errors_and_panics() {
        let failing = Container::builder()
            .catalog(catalog())
            .discovery(FailingDiscovery)
            .build();
        assert!(failing.try_run_namespace("app").is_err());
        failing.run_namespace("app");
        assert!(failing.registry().is_empty());

        let panicking = Container::builder()
            .catalog(catalog())
            .discovery(PanickingDiscovery)
            .build();
        panicking.run_namespace("app");
        assert!(panicking.registry().is_empty());
    }

    #[test]
    fn test_clones_share_registry() {
        let container = Container::builder()
            .catalog(catalog())
            .discovery(CatalogScanner)
            .build();
        let clone = container.clone();

        container.run_namespace("app");
        assert!(clone.get_bean("Store").unwrap().ptr_eq(&container.get_bean("Store").unwrap()));
    }

    #[test]
    fn test_run_uses_root_type_namespace() {
        let catalog = TypeCatalog::new().with(
            ComponentType::builder::<Store>(concat!(module_path!(), "::Store"))
                .constructor(ConstructorDescriptor::default_of::<Store>())
                .build(),
        );
        let container = Container::builder()
            .catalog(catalog)
            .discovery(CatalogScanner)
            .build();

        container.run::<Service>();
        assert!(container.get_bean("Store").is_some());
    }
}
