//! # simple-ioc - A Minimal Inversion-of-Control Container
//!
//! Given a root type, the container discovers every component declared in
//! that type's module tree, creates one instance of each, wires their
//! dependencies, and keeps them in a registry keyed by bean name.
//!
//! ## Features
//!
//! - **Component scanning** - Source directories on a load path are walked and
//!   every module found is looked up in a link-time type catalog
//! - **Constructor injection** - `#[component(constructor)]` resolves the
//!   arguments of the type's `Construct` impl from the registry
//! - **Field injection** - `#[inject]` fields are filled after construction
//! - **Interface assignability** - `#[component(provides(dyn Trait))]` lets a
//!   bean satisfy trait-object dependencies
//! - **Failure isolation** - one broken component is logged and skipped, the
//!   rest still register
//! - **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use simple_ioc::{Component, Container};
//! use std::sync::Arc;
//!
//! pub trait Notifier: Send + Sync {
//!     fn notify(&self, message: &str);
//! }
//!
//! #[derive(Component, Default)]
//! #[component(provides(dyn Notifier))]
//! pub struct EmailService;
//!
//! impl Notifier for EmailService {
//!     fn notify(&self, message: &str) {
//!         println!("Sending email: {message}");
//!     }
//! }
//!
//! #[derive(Component, Default)]
//! pub struct UserComponent {
//!     #[inject]
//!     notifier: Option<Arc<dyn Notifier>>,
//! }
//!
//! pub struct App;
//!
//! fn main() {
//!     // Called from the crate root file, so the scanner knows where the
//!     // sources live.
//!     let container = Container::builder()
//!         .source_root(simple_ioc::source_root!())
//!         .build();
//!     container.run::<App>();
//!
//!     let user = container.get_bean_as::<UserComponent>("UserComponent");
//! }
//! ```
//!
//! ## Registration Order
//!
//! Components without injectable fields are created first, then the rest.
//! This is a single level of ordering: a component whose field depends on
//! another component that itself has injectable fields may be created before
//! its dependency and fail. Such failures are logged per bean.
//!
//! ## Bean Names
//!
//! A bean is named after its type's simple name (`UserComponent`). Two
//! components with the same simple name in different modules collide; the
//! first one registered is kept.

// Lets `#[derive(Component)]` expand to `::simple_ioc::...` inside this crate
extern crate self as simple_ioc;

mod catalog;
mod classifier;
mod container;
mod error;
mod instantiator;
#[cfg(feature = "logging")]
pub mod logging;
mod metadata;
mod registry;
mod scanner;

pub use catalog::*;
pub use classifier::*;
pub use container::*;
pub use error::*;
pub use instantiator::*;
pub use metadata::*;
pub use registry::*;
pub use scanner::*;

#[cfg(feature = "derive")]
pub use simple_ioc_derive::Component;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Bean, Component, Construct, Container, ContainerBuilder, DiError, LoadPath, Result,
        SourceRoot,
    };
    pub use std::sync::Arc;
}
