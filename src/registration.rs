//! Registration records and the per-container store.

use std::any::Any;
use std::sync::Arc;

use crate::args::ConstructorArgs;
use crate::descriptors::ServiceDescriptor;
use crate::error::{ConstructError, DiError, DiResult};
use crate::internal::with_construction_catch;
use crate::key::Key;
use crate::lifetime::Lifetime;

/// Type-erased handle. Always holds an `Arc<C>` for the contract `C`.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Fabricates a transient instance from constructor arguments.
pub(crate) type Factory =
    Arc<dyn Fn(&ConstructorArgs) -> Result<AnyArc, ConstructError> + Send + Sync>;

/// Values a mutation pushed out of a container. Dropping them may run user
/// `Drop` impls.
pub(crate) type Displaced = Vec<Box<dyn Any + Send>>;

#[cfg(feature = "ahash")]
type KeyMap<V> = ahash::AHashMap<Key, V>;
#[cfg(not(feature = "ahash"))]
type KeyMap<V> = std::collections::HashMap<Key, V>;

/// Stored association between a contract and its implementation.
pub(crate) struct Registration {
    pub(crate) lifetime: Lifetime,
    /// `type_name` of the implementation
    pub(crate) concrete: &'static str,
    /// The bound value; the live singleton for `Lifetime::Singleton`
    pub(crate) instance: AnyArc,
    /// Constructor for transient fabrication
    pub(crate) factory: Option<Factory>,
}

impl Registration {
    pub(crate) fn new(lifetime: Lifetime, concrete: &'static str, instance: AnyArc) -> Self {
        Self {
            lifetime,
            concrete,
            instance,
            factory: None,
        }
    }

    pub(crate) fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Snapshot of what a resolution of this registration needs, detached
    /// from the store so it can complete without borrowing it.
    pub(crate) fn resolution(&self) -> Resolution {
        match self.lifetime {
            Lifetime::Singleton => Resolution::Shared(self.instance.clone()),
            Lifetime::Transient => Resolution::Fabricate {
                concrete: self.concrete,
                factory: self.factory.clone(),
            },
        }
    }
}

/// A pending resolution.
pub(crate) enum Resolution {
    Shared(AnyArc),
    Fabricate {
        concrete: &'static str,
        factory: Option<Factory>,
    },
}

impl Resolution {
    /// Produces the handle, running the transient constructor if needed.
    /// Singletons ignore `args`.
    pub(crate) fn complete(self, args: Option<&ConstructorArgs>) -> DiResult<AnyArc> {
        match self {
            Resolution::Shared(instance) => Ok(instance),
            Resolution::Fabricate { concrete, factory } => {
                let factory = factory.ok_or(DiError::TransientClassInstantiationFailed {
                    concrete,
                    reason: ConstructError::NoConstructor.to_string(),
                })?;
                let empty = ConstructorArgs::new();
                let args = args.unwrap_or(&empty);
                with_construction_catch(concrete, || factory(args))
            }
        }
    }
}

/// Type-keyed store of registrations.
#[derive(Default)]
pub(crate) struct Registry {
    entries: KeyMap<Registration>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `registration`, returning the one it replaces.
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) -> Option<Registration> {
        self.entries.insert(key, registration)
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        self.entries.get(key)
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<Registration> {
        self.entries.remove(key)
    }

    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.entries.iter()
    }

    pub(crate) fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.iter()
            .map(|(key, reg)| ServiceDescriptor {
                contract: *key,
                lifetime: reg.lifetime,
                concrete_type: reg.concrete,
            })
            .collect()
    }
}

/// Recovers the `Arc<C>` stored behind an erased handle.
pub(crate) fn downcast_contract<C>(any: AnyArc) -> DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    any.downcast_ref::<Arc<C>>()
        .cloned()
        .ok_or(DiError::InvalidType {
            contract: std::any::type_name::<C>(),
            implementation: "<erased>",
        })
}

/// Boxes an `Arc<C>` into the erased storage form.
#[inline(always)]
pub(crate) fn erase<C>(value: Arc<C>) -> AnyArc
where
    C: ?Sized + Send + Sync + 'static,
{
    Arc::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_resolution_shares_instance() {
        let instance = erase(Arc::new(5u32));
        let reg = Registration::new(Lifetime::Singleton, "u32", instance.clone());
        let resolved = reg.resolution().complete(None).unwrap();
        assert!(Arc::ptr_eq(&resolved, &instance));
    }

    #[test]
    fn transient_without_factory_fails() {
        let reg = Registration::new(Lifetime::Transient, "u32", erase(Arc::new(5u32)));
        let err = reg.resolution().complete(None).unwrap_err();
        assert!(matches!(
            err,
            DiError::TransientClassInstantiationFailed { concrete: "u32", .. }
        ));
    }

    #[test]
    fn transient_factory_receives_args() {
        let factory: Factory = Arc::new(|args: &ConstructorArgs| -> Result<AnyArc, ConstructError> {
            let n = *args.required::<u32>(0)?;
            Ok(erase(Arc::new(n * 2)))
        });
        let reg = Registration::new(Lifetime::Transient, "u32", erase(Arc::new(0u32)))
            .with_factory(factory);
        let any = reg
            .resolution()
            .complete(Some(&ConstructorArgs::new().with(21u32)))
            .unwrap();
        assert_eq!(*downcast_contract::<u32>(any).unwrap(), 42);
    }

    #[test]
    fn registry_replaces_and_removes() {
        let mut registry = Registry::new();
        let key = Key::of::<u32>();
        registry.insert(key, Registration::new(Lifetime::Singleton, "u32", erase(Arc::new(1u32))));
        registry.insert(key, Registration::new(Lifetime::Transient, "u32", erase(Arc::new(2u32))));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.descriptors()[0].lifetime, Lifetime::Transient);
        assert!(registry.remove(&key).is_some());
        assert!(!registry.contains_key(&key));
    }
}
