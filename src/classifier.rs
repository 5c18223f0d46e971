//! Registration ordering
//!
//! Components are split into two buckets: types with no injectable fields,
//! then types with at least one. Every type in the first bucket is created
//! before any type in the second. Within a bucket the order is whatever the
//! discovered set yields, which is unspecified.
//!
//! This is a one-level heuristic, not a topological sort. A chain such as
//! `A -> B -> C` where `B` also has injectable fields puts `A` and `B` in the
//! same bucket, so `A` may be created before `B` exists and fail.

use crate::metadata::ComponentType;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Components split by whether they declare injectable fields
#[derive(Debug, Clone, Default)]
pub struct Classification {
    no_dependencies: Vec<ComponentType>,
    with_dependencies: Vec<ComponentType>,
}

impl Classification {
    /// Split `components`, preserving iteration order within each bucket.
    ///
    /// Non-concrete types are skipped with a warning.
    pub fn classify<'a>(components: impl IntoIterator<Item = &'a ComponentType>) -> Self {
        let mut classification = Self::default();

        for ty in components {
            if !ty.is_concrete() {
                #[cfg(feature = "logging")]
                warn!(
                    target: "simple_ioc",
                    service = ty.name(),
                    "Skipping non-concrete component"
                );
                continue;
            }

            if ty.has_dependencies() {
                classification.with_dependencies.push(ty.clone());
            } else {
                classification.no_dependencies.push(ty.clone());
            }
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "simple_ioc",
            no_dependencies = classification.no_dependencies.len(),
            with_dependencies = classification.with_dependencies.len(),
            "Classified components"
        );

        classification
    }

    /// Use explicit bucket contents and order
    pub fn from_buckets(
        no_dependencies: Vec<ComponentType>,
        with_dependencies: Vec<ComponentType>,
    ) -> Self {
        Self {
            no_dependencies,
            with_dependencies,
        }
    }

    pub fn no_dependencies(&self) -> &[ComponentType] {
        &self.no_dependencies
    }

    pub fn with_dependencies(&self) -> &[ComponentType] {
        &self.with_dependencies
    }

    /// Registration order: the whole first bucket, then the whole second
    pub fn ordered(&self) -> impl Iterator<Item = &ComponentType> {
        self.no_dependencies
            .iter()
            .chain(self.with_dependencies.iter())
    }

    pub fn len(&self) -> usize {
        self.no_dependencies.len() + self.with_dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TypeKey;

    #[derive(Default)]
    struct Leaf;
    #[derive(Default)]
    struct Consumer;
    #[derive(Default)]
    struct Abstract;

    fn leaf() -> ComponentType {
        ComponentType::builder::<Leaf>("app::Leaf")
            .field("counter", TypeKey::of::<u64>())
            .build()
    }

    fn consumer() -> ComponentType {
        ComponentType::builder::<Consumer>("app::Consumer")
            .inject_field("leaf", TypeKey::of::<Leaf>(), |_, _| Ok(()))
            .build()
    }

    #[test]
    fn test_each_type_lands_in_exactly_one_bucket() {
        let types = [consumer(), leaf()];
        let classification = Classification::classify(&types);

        assert_eq!(classification.no_dependencies(), &[leaf()]);
        assert_eq!(classification.with_dependencies(), &[consumer()]);
        assert_eq!(classification.len(), 2);
    }

    #[test]
    fn test_ordered_puts_no_dependency_bucket_first() {
        let classification = Classification::classify(&[consumer(), leaf(), consumer()]);
        let order: Vec<_> = classification.ordered().map(ComponentType::simple_name).collect();
        assert_eq!(order, vec!["Leaf", "Consumer", "Consumer"]);
    }

    #[test]
    fn test_non_concrete_types_are_skipped() {
        let abstract_type = ComponentType::builder::<Abstract>("app::Abstract")
            .concrete(false)
            .build();
        let classification = Classification::classify(&[abstract_type]);
        assert!(classification.is_empty());
    }
}
