//! Lifetime and scope declarations.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// How instances are produced when a contract is resolved.
///
/// # Examples
///
/// ```rust
/// use scene_di::{Container, Injectable, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Counter;
/// impl Injectable for Counter {}
///
/// let mut container = Container::new();
/// container.bind::<Counter, _>(Counter, Lifetime::Singleton).unwrap();
///
/// let a = container.resolve::<Counter>().unwrap();
/// let b = container.resolve::<Counter>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Lifetime {
    /// One shared instance, bound once per container lifetime
    ///
    /// A second bind for the same contract returns the instance already held;
    /// the contract must be unbound before it can be replaced.
    #[default]
    Singleton,
    /// A new instance per resolution
    ///
    /// The concrete type is fabricated through its
    /// [`Injectable::construct`](crate::Injectable::construct) on every resolve.
    Transient,
}

/// Which registry a binding lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Scope {
    /// Registration persists for the whole process
    #[default]
    Global,
    /// Registration is dropped when the scene container is cleared
    Scene,
}

impl Scope {
    /// The fallback scope searched after this one.
    pub fn other(self) -> Scope {
        match self {
            Scope::Global => Scope::Scene,
            Scope::Scene => Scope::Global,
        }
    }
}

/// Lifetime and scope applied to one bind call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct ServicePolicy {
    pub lifetime: Lifetime,
    pub scope: Scope,
}

impl ServicePolicy {
    pub const fn new(lifetime: Lifetime, scope: Scope) -> Self {
        Self { lifetime, scope }
    }

    pub const fn singleton(scope: Scope) -> Self {
        Self::new(Lifetime::Singleton, scope)
    }

    pub const fn transient(scope: Scope) -> Self {
        Self::new(Lifetime::Transient, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_singleton_global() {
        let policy = ServicePolicy::default();
        assert_eq!(policy.lifetime, Lifetime::Singleton);
        assert_eq!(policy.scope, Scope::Global);
    }

    #[test]
    fn other_scope_flips() {
        assert_eq!(Scope::Global.other(), Scope::Scene);
        assert_eq!(Scope::Scene.other(), Scope::Global);
    }
}
