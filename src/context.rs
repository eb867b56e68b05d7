//! Two-tier scope router: one global and at most one scene container.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::args::ConstructorArgs;
use crate::container::Container;
use crate::descriptors::ServiceDescriptor;
use crate::error::{DiError, DiResult};
use crate::inject::{inject_dependencies, InjectionReport, InjectionTarget};
use crate::key::Key;
use crate::lifetime::{Lifetime, Scope, ServicePolicy};
use crate::observer::{DiObserver, Event, Observers};
use crate::registration::{AnyArc, Displaced, Resolution};
use crate::traits::{Implements, Injectable, ResolverCore};

#[cfg(feature = "config")]
use crate::config::PolicyTable;

/// Routes bind and resolve calls between a global and a scene container.
///
/// The global container is created on first use and lives until
/// [`clear`](Self::clear). The scene container exists only while something is
/// bound to it (or after [`init_scene`](Self::init_scene)) and is discarded
/// on its own by [`clear_scene_container`](Self::clear_scene_container),
/// leaving global bindings untouched.
///
/// # Resolution order
///
/// A contract is looked up first in the container of its declared scope and
/// then in the other one. Contracts are declared `Global` unless
/// [`declare_contract_scope`](Self::declare_contract_scope) (or a policy
/// table) says otherwise. So a scene override is still found for a globally
/// declared contract, and a scene-declared contract falls back to a global
/// default before any scene binding exists.
///
/// # Examples
///
/// ```
/// use scene_di::{implements, DiContext, Injectable, Resolver, Scope};
///
/// trait Music: Send + Sync {
///     fn track(&self) -> &'static str;
/// }
///
/// struct MenuTheme;
/// impl Music for MenuTheme {
///     fn track(&self) -> &'static str { "menu" }
/// }
/// impl Injectable for MenuTheme {}
///
/// struct BossTheme;
/// impl Music for BossTheme {
///     fn track(&self) -> &'static str { "boss" }
/// }
/// impl Injectable for BossTheme {
///     const SCOPE: Scope = Scope::Scene;
/// }
///
/// implements!(dyn Music => MenuTheme, BossTheme);
///
/// let mut context = DiContext::new();
/// context.declare_contract_scope::<dyn Music>(Scope::Scene);
/// context.bind::<dyn Music, _>(MenuTheme).unwrap();
/// assert_eq!(context.resolve::<dyn Music>().unwrap().track(), "menu");
///
/// context.bind::<dyn Music, _>(BossTheme).unwrap();
/// assert_eq!(context.resolve::<dyn Music>().unwrap().track(), "boss");
///
/// context.clear_scene_container();
/// assert_eq!(context.resolve::<dyn Music>().unwrap().track(), "menu");
/// ```
#[derive(Default)]
pub struct DiContext {
    global: Option<Container>,
    scene: Option<Container>,
    contract_scopes: HashMap<Key, Scope>,
    observers: Observers,
    #[cfg(feature = "config")]
    policies: Option<PolicyTable>,
}

impl DiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the global container if it does not exist yet.
    pub fn init_global(&mut self) -> &mut Container {
        self.global.get_or_insert_with(Container::new)
    }

    /// Creates the scene container if it does not exist yet.
    pub fn init_scene(&mut self) -> &mut Container {
        self.scene.get_or_insert_with(Container::new)
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    /// The container for `scope`, if it currently exists.
    pub fn container(&self, scope: Scope) -> Option<&Container> {
        match scope {
            Scope::Global => self.global.as_ref(),
            Scope::Scene => self.scene.as_ref(),
        }
    }

    fn container_mut(&mut self, scope: Scope) -> &mut Container {
        match scope {
            Scope::Global => self.init_global(),
            Scope::Scene => self.init_scene(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.add(observer);
    }

    /// Installs a policy table consulted on every bind and resolve.
    #[cfg(feature = "config")]
    pub fn set_policies(&mut self, policies: PolicyTable) {
        self.policies = Some(policies);
    }

    #[cfg(feature = "config")]
    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.set_policies(policies);
        self
    }

    /// The lifetime and scope a bind of `I` will use: its declaration,
    /// overridden by the policy table when one is installed.
    pub fn policy_for<I: Injectable>(&self) -> ServicePolicy {
        let declared = I::policy();
        #[cfg(feature = "config")]
        if let Some(policies) = &self.policies {
            return policies.apply(std::any::type_name::<I>(), declared);
        }
        declared
    }

    /// Records the scope searched first when resolving `C`.
    pub fn declare_contract_scope<C: ?Sized + 'static>(&mut self, scope: Scope) {
        self.contract_scopes.insert(Key::of::<C>(), scope);
    }

    /// The declared scope of the contract behind `key`, `Global` by default.
    pub fn contract_scope(&self, key: &Key) -> Scope {
        if let Some(scope) = self.contract_scopes.get(key) {
            return *scope;
        }
        #[cfg(feature = "config")]
        if let Some(scope) = self
            .policies
            .as_ref()
            .and_then(|policies| policies.contract_scope(key.display_name()))
        {
            return scope;
        }
        Scope::Global
    }

    /// Binds `implementation` to `C` using the lifetime and scope the
    /// implementation type declares.
    pub fn bind<C, I>(&mut self, implementation: I) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.bind_optional(Some(implementation))
    }

    /// Like [`bind`](Self::bind), failing with [`DiError::NullBinding`] when
    /// no implementation is supplied.
    pub fn bind_optional<C, I>(&mut self, implementation: Option<I>) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        let policy = self.policy_for::<I>();
        self.bind_with_optional(implementation, policy)
    }

    /// Binds with an explicit policy instead of the type's declaration.
    pub fn bind_with<C, I>(&mut self, implementation: I, policy: ServicePolicy) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.bind_with_optional(Some(implementation), policy)
    }

    fn bind_with_optional<C, I>(
        &mut self,
        implementation: Option<I>,
        policy: ServicePolicy,
    ) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        let mut aftermath = Aftermath::default();
        let bound = self.route_bind(implementation, policy, &mut aftermath);
        aftermath.settle(&self.observers);
        bound
    }

    /// Binds a shared handle as a singleton in `scope`.
    pub fn bind_instance<C>(&mut self, scope: Scope, instance: Arc<C>) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let mut aftermath = Aftermath::default();
        let bound = self.route_bind_instance(scope, instance, &mut aftermath);
        aftermath.settle(&self.observers);
        bound
    }

    /// Removes the binding for `C`, scene container first.
    ///
    /// Returns `true` on the first container that held a binding, `false`
    /// when neither did or no container exists.
    pub fn unbind<C: ?Sized + 'static>(&mut self) -> bool {
        self.unbind_key(&Key::of::<C>())
    }

    pub fn unbind_key(&mut self, key: &Key) -> bool {
        let mut aftermath = Aftermath::default();
        let removed = self.route_unbind(key, &mut aftermath);
        aftermath.settle(&self.observers);
        removed
    }

    pub(crate) fn route_bind<C, I>(
        &mut self,
        implementation: Option<I>,
        policy: ServicePolicy,
        aftermath: &mut Aftermath,
    ) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        let key = Key::of::<C>();
        let implementation =
            implementation.ok_or(DiError::NullBinding(key.display_name()))?;

        let bound = self.container_mut(policy.scope).bind_displacing::<C, I>(
            implementation,
            policy.lifetime,
            &mut aftermath.displaced,
        )?;
        debug!(contract = key.display_name(), scope = ?policy.scope, "routed bind");
        aftermath
            .events
            .push(Event::Bound(key, policy.scope, policy.lifetime));
        Ok(bound)
    }

    pub(crate) fn route_bind_instance<C>(
        &mut self,
        scope: Scope,
        instance: Arc<C>,
        aftermath: &mut Aftermath,
    ) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = Key::of::<C>();
        let bound = self
            .container_mut(scope)
            .bind_instance_displacing(instance, &mut aftermath.displaced)?;
        aftermath
            .events
            .push(Event::Bound(key, scope, Lifetime::Singleton));
        Ok(bound)
    }

    pub(crate) fn route_unbind(&mut self, key: &Key, aftermath: &mut Aftermath) -> bool {
        for scope in [Scope::Scene, Scope::Global] {
            let removed = match scope {
                Scope::Scene => self.scene.as_mut(),
                Scope::Global => self.global.as_mut(),
            }
            .and_then(|container| container.take_key(key));

            if let Some(registration) = removed {
                aftermath.displaced.push(Box::new(registration));
                aftermath.events.push(Event::Unbound(*key, scope));
                return true;
            }
        }
        false
    }

    /// Detaches both containers into `aftermath`.
    pub(crate) fn take_all(&mut self, aftermath: &mut Aftermath) {
        if let Some(global) = self.global.take() {
            debug!(count = global.len(), "global container discarded");
            aftermath.displaced.push(Box::new(global));
            aftermath.events.push(Event::ScopeCleared(Scope::Global));
        }
        self.take_scene(aftermath);
    }

    /// Detaches the scene container into `aftermath`.
    pub(crate) fn take_scene(&mut self, aftermath: &mut Aftermath) {
        if let Some(scene) = self.scene.take() {
            debug!(count = scene.len(), "scene container discarded");
            aftermath.displaced.push(Box::new(scene));
            aftermath.events.push(Event::ScopeCleared(Scope::Scene));
        }
    }

    /// Pending resolutions for `key`, in search order.
    ///
    /// At most one per existing container that holds the contract; nothing
    /// is constructed yet.
    pub(crate) fn candidates(&self, key: &Key) -> Vec<(Scope, Resolution)> {
        let first = self.contract_scope(key);
        [first, first.other()]
            .into_iter()
            .filter_map(|scope| {
                self.container(scope)
                    .and_then(|container| container.prepare(key))
                    .map(|resolution| (scope, resolution))
            })
            .collect()
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.observers
    }

    /// Populates `target`'s injection points through this context.
    pub fn inject_dependencies<T>(&self, target: &mut T) -> InjectionReport
    where
        T: InjectionTarget + ?Sized,
    {
        inject_dependencies(self, target)
    }

    /// Every registration, tagged with the scope holding it.
    pub fn descriptors(&self) -> Vec<(Scope, ServiceDescriptor)> {
        [Scope::Global, Scope::Scene]
            .into_iter()
            .filter_map(|scope| self.container(scope).map(|c| (scope, c)))
            .flat_map(|(scope, container)| {
                container
                    .descriptors()
                    .into_iter()
                    .map(move |descriptor| (scope, descriptor))
            })
            .collect()
    }

    /// Clears and discards both containers.
    pub fn clear(&mut self) {
        let mut aftermath = Aftermath::default();
        self.take_all(&mut aftermath);
        aftermath.settle(&self.observers);
    }

    /// Clears and discards only the scene container.
    ///
    /// Meant for the host's end-of-scene hook; global bindings survive.
    pub fn clear_scene_container(&mut self) {
        let mut aftermath = Aftermath::default();
        self.take_scene(&mut aftermath);
        aftermath.settle(&self.observers);
    }
}

/// What a mutation leaves behind: observer events and the values it pushed
/// out of a container.
///
/// Both may run user code, so the process-wide handle settles them after
/// releasing its lock.
#[derive(Default)]
#[must_use]
pub(crate) struct Aftermath {
    events: Vec<Event>,
    displaced: Displaced,
}

impl Aftermath {
    /// Drops the displaced values, then reports the events.
    pub(crate) fn settle(self, observers: &Observers) {
        drop(self.displaced);
        for event in &self.events {
            observers.notify(event);
        }
    }
}

/// Completes the first candidate that succeeds.
///
/// A construction failure falls through to the next candidate; if none
/// succeeds, the first construction failure is reported, or `CannotResolve`
/// when there was nothing to construct at all.
pub(crate) fn complete_first(
    key: &Key,
    candidates: Vec<(Scope, Resolution)>,
    args: Option<&ConstructorArgs>,
    observers: &Observers,
) -> DiResult<AnyArc> {
    let mut first_error = None;

    for (scope, resolution) in candidates {
        let start = observers.has_observers().then(Instant::now);
        match resolution.complete(args) {
            Ok(value) => {
                if let Some(start) = start {
                    observers.resolved(key, scope, start.elapsed());
                }
                return Ok(value);
            }
            Err(error) => {
                warn!(contract = key.display_name(), ?scope, %error, "resolution attempt failed");
                observers.construction_failed(key, scope, &error);
                first_error.get_or_insert(error);
            }
        }
    }

    let error = first_error.unwrap_or(DiError::CannotResolve(key.display_name()));
    debug!(contract = key.display_name(), %error, "unresolved");
    observers.resolve_failed(key, &error);
    Err(error)
}

impl ResolverCore for DiContext {
    fn resolve_any(&self, key: &Key, args: Option<&ConstructorArgs>) -> DiResult<AnyArc> {
        complete_first(key, self.candidates(key), args, &self.observers)
    }
}

impl fmt::Display for DiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (scope, descriptor) in self.descriptors() {
            writeln!(
                f,
                "{:?} {} -> {} ({:?})",
                scope,
                descriptor.contract_name(),
                descriptor.concrete_type,
                descriptor.lifetime
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for DiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiContext")
            .field("global", &self.global)
            .field("scene", &self.scene)
            .field("contract_scopes", &self.contract_scopes)
            .field("observers", &self.observers.len())
            .finish()
    }
}
