//! Resolver traits for contract resolution.

use std::sync::Arc;

use crate::args::ConstructorArgs;
use crate::error::DiResult;
use crate::key::Key;
use crate::registration::{downcast_contract, AnyArc};

/// Core resolver trait for object-safe resolution.
///
/// Implemented by [`Container`](crate::Container), [`DiContext`](crate::DiContext)
/// and the process-wide [`GlobalContext`](crate::global::GlobalContext). The
/// injector only ever sees a `&dyn ResolverCore`, so any of them can populate
/// injection points.
///
/// Most callers want the generic methods of [`Resolver`] instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves the contract behind `key` to its type-erased handle.
    ///
    /// `args` are only consulted when a transient registration fabricates a
    /// new instance; `None` means parameterless construction.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - an `Arc<C>` boxed as `Arc<dyn Any>`
    /// * `Err(DiError)` - `CannotResolve` or `TransientClassInstantiationFailed`
    fn resolve_any(&self, key: &Key, args: Option<&ConstructorArgs>) -> DiResult<AnyArc>;
}

/// High-level resolver interface with generic methods.
///
/// Blanket-implemented for every [`ResolverCore`], trait objects included.
///
/// # Examples
///
/// ```
/// use scene_di::{implements, Container, Injectable, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String { format!("[console] {}", msg) }
/// }
/// impl Injectable for ConsoleLogger {}
/// implements!(dyn Logger => ConsoleLogger);
///
/// let mut container = Container::new();
/// container.bind::<dyn Logger, _>(ConsoleLogger, Lifetime::Singleton).unwrap();
///
/// let logger = container.resolve::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("hi"), "[console] hi");
/// assert!(container.resolve_or_default::<String>().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the contract `C`.
    fn resolve<C>(&self) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let any = self.resolve_any(&Key::of::<C>(), None)?;
        downcast_contract::<C>(any)
    }

    /// Resolves `C`, handing `args` to a transient constructor.
    ///
    /// Singletons ignore the arguments.
    fn resolve_with<C>(&self, args: &ConstructorArgs) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let any = self.resolve_any(&Key::of::<C>(), Some(args))?;
        downcast_contract::<C>(any)
    }

    /// Resolves `C`, panicking on failure.
    ///
    /// For call sites that have already established that the contract is
    /// bound; the panic message names the missing contract.
    fn resolve_or_panic<C>(&self) -> Arc<C>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<C>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<C>(), e))
    }

    /// Resolves `C`, yielding `None` on any failure.
    fn resolve_or_default<C>(&self) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<C>().ok()
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
