//! Process-wide context behind free functions.
//!
//! Game code usually reaches the container from anywhere, without threading
//! a handle through every call. This module keeps one [`DiContext`] in a
//! lazily initialized static guarded by a mutex and exposes its operations as
//! free functions.
//!
//! The lock is never held while user code runs. Transient constructors and
//! observer callbacks run after it is released, as do the `Drop` impls of
//! anything a bind, unbind or clear pushed out of a container. Any of them
//! may call back into this module.
//!
//! ```
//! use scene_di::{global, implements, Injectable, Scope};
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct FrozenClock;
//! impl Clock for FrozenClock {
//!     fn now(&self) -> u64 { 1_000 }
//! }
//! impl Injectable for FrozenClock {
//!     const SCOPE: Scope = Scope::Scene;
//! }
//! implements!(dyn Clock => FrozenClock);
//!
//! global::bind::<dyn Clock, _>(FrozenClock).unwrap();
//! assert_eq!(global::resolve::<dyn Clock>().unwrap().now(), 1_000);
//!
//! global::clear_scene_container();
//! assert!(global::resolve_or_default::<dyn Clock>().is_none());
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::args::ConstructorArgs;
use crate::context::{complete_first, Aftermath, DiContext};
use crate::error::DiResult;
use crate::inject::{InjectionReport, InjectionTarget};
use crate::key::Key;
use crate::lifetime::{Scope, ServicePolicy};
use crate::observer::DiObserver;
use crate::registration::AnyArc;
use crate::traits::{Implements, Injectable, Resolver, ResolverCore};

static CONTEXT: Lazy<Mutex<DiContext>> = Lazy::new(|| Mutex::new(DiContext::new()));

/// Resolver handle over the process-wide context.
///
/// Zero-sized; pass `&GlobalContext` wherever a [`ResolverCore`] is expected.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalContext;

impl ResolverCore for GlobalContext {
    fn resolve_any(&self, key: &Key, args: Option<&ConstructorArgs>) -> DiResult<AnyArc> {
        let (candidates, observers) = {
            let context = CONTEXT.lock();
            (context.candidates(key), context.observers().clone())
        };
        complete_first(key, candidates, args, &observers)
    }
}

/// Runs `f` with exclusive access to the process-wide context.
///
/// The other functions of this module must not be called from inside `f`;
/// the lock is not reentrant.
pub fn with_context<R>(f: impl FnOnce(&mut DiContext) -> R) -> R {
    f(&mut CONTEXT.lock())
}

/// Applies a mutation under the lock, then settles its aftermath outside it.
fn mutate<R>(f: impl FnOnce(&mut DiContext, &mut Aftermath) -> R) -> R {
    let mut aftermath = Aftermath::default();
    let (result, observers) = {
        let mut context = CONTEXT.lock();
        let result = f(&mut *context, &mut aftermath);
        (result, context.observers().clone())
    };
    aftermath.settle(&observers);
    result
}

pub fn bind<C, I>(implementation: I) -> DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
    I: Injectable + Implements<C>,
{
    bind_optional::<C, I>(Some(implementation))
}

pub fn bind_optional<C, I>(implementation: Option<I>) -> DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
    I: Injectable + Implements<C>,
{
    mutate(|context, aftermath| {
        let policy = context.policy_for::<I>();
        context.route_bind::<C, I>(implementation, policy, aftermath)
    })
}

pub fn bind_with<C, I>(implementation: I, policy: ServicePolicy) -> DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
    I: Injectable + Implements<C>,
{
    mutate(|context, aftermath| {
        context.route_bind::<C, I>(Some(implementation), policy, aftermath)
    })
}

pub fn bind_instance<C>(scope: Scope, instance: Arc<C>) -> DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    mutate(|context, aftermath| context.route_bind_instance(scope, instance, aftermath))
}

/// Removes the binding for `C`, scene container first.
pub fn unbind<C: ?Sized + 'static>() -> bool {
    let key = Key::of::<C>();
    mutate(|context, aftermath| context.route_unbind(&key, aftermath))
}

pub fn resolve<C>() -> DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    GlobalContext.resolve::<C>()
}

pub fn resolve_with<C>(args: &ConstructorArgs) -> DiResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    GlobalContext.resolve_with::<C>(args)
}

/// Resolves `C` or panics with a message naming the contract.
pub fn resolve_or_panic<C>() -> Arc<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    GlobalContext.resolve_or_panic::<C>()
}

pub fn resolve_or_default<C>() -> Option<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    GlobalContext.resolve_or_default::<C>()
}

/// Populates `target`'s injection points from the process-wide context.
pub fn inject_dependencies<T>(target: &mut T) -> InjectionReport
where
    T: InjectionTarget + ?Sized,
{
    crate::inject::inject_dependencies(&GlobalContext, target)
}

pub fn declare_contract_scope<C: ?Sized + 'static>(scope: Scope) {
    CONTEXT.lock().declare_contract_scope::<C>(scope);
}

pub fn init_scene() {
    CONTEXT.lock().init_scene();
}

pub fn has_scene() -> bool {
    CONTEXT.lock().has_scene()
}

/// Registers an observer. Its callbacks run outside the lock.
pub fn add_observer(observer: Arc<dyn DiObserver>) {
    CONTEXT.lock().add_observer(observer);
}

/// Clears both containers.
pub fn clear() {
    mutate(DiContext::take_all);
}

/// Clears only the scene container; call it when a scene unloads.
pub fn clear_scene_container() {
    mutate(DiContext::take_scene);
}
