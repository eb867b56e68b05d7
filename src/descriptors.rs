//! Registration descriptors for introspection and diagnostics.

use crate::key::Key;
use crate::lifetime::Lifetime;

/// Registration descriptor for introspection and diagnostics
///
/// A detached snapshot of one registration: which contract is bound, with
/// what lifetime, and to which concrete type. Useful for startup checks and
/// for dumping the state of a context while debugging.
///
/// # Examples
///
/// ```rust
/// use scene_di::{implements, Container, Injectable, Lifetime};
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
/// impl Injectable for SystemClock {}
/// implements!(dyn Clock => SystemClock);
///
/// let mut container = Container::new();
/// container.bind::<dyn Clock, _>(SystemClock, Lifetime::Singleton).unwrap();
///
/// let descriptors = container.descriptors();
/// assert_eq!(descriptors.len(), 1);
/// assert!(descriptors[0].contract_name().contains("Clock"));
/// assert!(descriptors[0].concrete_type.contains("SystemClock"));
/// assert!(!descriptors[0].is_transient());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// The contract key
    pub contract: Key,
    /// Registration lifetime
    pub lifetime: Lifetime,
    /// Implementation type name
    pub concrete_type: &'static str,
}

impl ServiceDescriptor {
    /// The contract's type name.
    pub fn contract_name(&self) -> &'static str {
        self.contract.display_name()
    }

    pub fn is_transient(&self) -> bool {
        self.lifetime == Lifetime::Transient
    }
}
