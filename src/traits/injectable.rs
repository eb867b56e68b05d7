//! Declarations carried by implementation types.

use std::sync::Arc;

use crate::args::ConstructorArgs;
use crate::error::ConstructError;
use crate::lifetime::{Lifetime, Scope, ServicePolicy};

/// Declares how an implementation type is bound.
///
/// The associated constants play the part of lifetime and scope attributes:
/// they are read once per bind call and never re-validated afterwards.
/// Transient bindings fabricate new instances through [`construct`](Self::construct),
/// whose default reports that no constructor exists.
///
/// # Examples
///
/// ```
/// use scene_di::{ConstructError, ConstructorArgs, Injectable, Lifetime, Scope};
///
/// struct Dice {
///     sides: u32,
/// }
///
/// impl Injectable for Dice {
///     const LIFETIME: Lifetime = Lifetime::Transient;
///     const SCOPE: Scope = Scope::Scene;
///
///     fn construct(args: &ConstructorArgs) -> Result<Self, ConstructError> {
///         let sides = args.get::<u32>(0).copied().unwrap_or(6);
///         Ok(Dice { sides })
///     }
/// }
///
/// let dice = Dice::construct(&ConstructorArgs::new().with(20u32)).unwrap();
/// assert_eq!(dice.sides, 20);
/// assert_eq!(Dice::policy().scope, Scope::Scene);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Declared lifetime, `Singleton` unless overridden.
    const LIFETIME: Lifetime = Lifetime::Singleton;
    /// Declared scope, `Global` unless overridden.
    const SCOPE: Scope = Scope::Global;

    /// Builds a fresh instance for transient resolution.
    ///
    /// An empty argument list stands for parameterless construction.
    fn construct(args: &ConstructorArgs) -> Result<Self, ConstructError> {
        let _ = args;
        Err(ConstructError::NoConstructor)
    }

    /// The declared lifetime and scope as one policy.
    fn policy() -> ServicePolicy {
        ServicePolicy::new(Self::LIFETIME, Self::SCOPE)
    }
}

/// Upcast from an implementation to the contract it satisfies.
///
/// Every type implements itself; trait-object contracts are wired with the
/// [`implements!`](crate::implements) macro.
pub trait Implements<C: ?Sized>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<C>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline(always)]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares that implementation types satisfy a trait-object contract.
///
/// ```
/// use scene_di::implements;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// struct French;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
/// impl Greeter for French {
///     fn greet(&self) -> String { "bonjour".into() }
/// }
///
/// implements!(dyn Greeter => English, French);
///
/// use scene_di::Implements;
/// let greeter: Arc<dyn Greeter> = Arc::new(French).upcast();
/// assert_eq!(greeter.greet(), "bonjour");
/// ```
#[macro_export]
macro_rules! implements {
    ($contract:ty => $($implementation:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$contract> for $implementation {
                #[inline(always)]
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$contract> {
                    self
                }
            }
        )+
    };
}
