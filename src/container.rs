//! Single-scope container: one registration store plus lifetime rules.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::args::ConstructorArgs;
use crate::descriptors::ServiceDescriptor;
use crate::error::{ConstructError, DiError, DiResult};
use crate::inject::{inject_dependencies, InjectionReport, InjectionTarget};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::{
    downcast_contract, erase, AnyArc, Displaced, Factory, Registration, Registry, Resolution,
};
use crate::traits::{Implements, Injectable, ResolverCore};

/// One registry of contract bindings.
///
/// A `Container` enforces the lifetime rules on its own; routing between the
/// global and the scene registry is the job of [`DiContext`](crate::DiContext).
///
/// - Binding a contract that already has a **singleton** registration is a
///   no-op that hands back the existing instance. [`unbind`](Self::unbind)
///   first to replace it.
/// - Resolving a **transient** registration fabricates a new instance of the
///   bound concrete type on every call.
///
/// # Examples
///
/// ```
/// use scene_di::{implements, Container, Injectable, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// trait Counter: Send + Sync {
///     fn start(&self) -> u32;
/// }
///
/// struct FromZero;
/// impl Counter for FromZero {
///     fn start(&self) -> u32 { 0 }
/// }
/// impl Injectable for FromZero {}
///
/// struct FromOne;
/// impl Counter for FromOne {
///     fn start(&self) -> u32 { 1 }
/// }
/// impl Injectable for FromOne {}
///
/// implements!(dyn Counter => FromZero, FromOne);
///
/// let mut container = Container::new();
/// let first = container.bind::<dyn Counter, _>(FromZero, Lifetime::Singleton).unwrap();
///
/// // The singleton blocks a second bind
/// let second = container.bind::<dyn Counter, _>(FromOne, Lifetime::Singleton).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
///
/// assert!(container.unbind::<dyn Counter>());
/// container.bind::<dyn Counter, _>(FromOne, Lifetime::Singleton).unwrap();
/// assert_eq!(container.resolve::<dyn Counter>().unwrap().start(), 1);
/// ```
#[derive(Default)]
pub struct Container {
    registry: Registry,
}

impl Container {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Binds `implementation` to the contract `C` with the given lifetime.
    ///
    /// Returns the bound handle, or the existing one when a singleton is
    /// already registered for `C`.
    pub fn bind<C, I>(&mut self, implementation: I, lifetime: Lifetime) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        self.bind_optional(Some(implementation), lifetime)
    }

    /// Like [`bind`](Self::bind), failing with [`DiError::NullBinding`] when
    /// no implementation is supplied.
    pub fn bind_optional<C, I>(
        &mut self,
        implementation: Option<I>,
        lifetime: Lifetime,
    ) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        let key = Key::of::<C>();
        let implementation = implementation.ok_or(DiError::NullBinding(key.display_name()))?;
        self.bind_displacing(implementation, lifetime, &mut Displaced::new())
    }

    /// Binds `implementation`, moving anything the bind pushes out (a
    /// rejected implementation or a replaced registration) into `displaced`
    /// instead of dropping it.
    pub(crate) fn bind_displacing<C, I>(
        &mut self,
        implementation: I,
        lifetime: Lifetime,
        displaced: &mut Displaced,
    ) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<C>,
    {
        let key = Key::of::<C>();
        if let Some(existing) = self.existing_singleton::<C>(&key)? {
            displaced.push(Box::new(implementation));
            return Ok(existing);
        }

        let instance = <I as Implements<C>>::upcast(Arc::new(implementation));
        let mut registration =
            Registration::new(lifetime, std::any::type_name::<I>(), erase(instance.clone()));
        if lifetime == Lifetime::Transient {
            registration = registration.with_factory(transient_factory::<C, I>());
        }
        if let Some(replaced) = self.registry.insert(key, registration) {
            displaced.push(Box::new(replaced));
        }

        debug!(
            contract = key.display_name(),
            concrete = std::any::type_name::<I>(),
            ?lifetime,
            "bound"
        );
        Ok(instance)
    }

    /// Binds an already shared handle as a singleton.
    pub fn bind_instance<C>(&mut self, instance: Arc<C>) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.bind_instance_displacing(instance, &mut Displaced::new())
    }

    pub(crate) fn bind_instance_displacing<C>(
        &mut self,
        instance: Arc<C>,
        displaced: &mut Displaced,
    ) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = Key::of::<C>();
        if let Some(existing) = self.existing_singleton::<C>(&key)? {
            displaced.push(Box::new(instance));
            return Ok(existing);
        }

        let replaced = self.registry.insert(
            key,
            Registration::new(
                Lifetime::Singleton,
                std::any::type_name::<C>(),
                erase(instance.clone()),
            ),
        );
        if let Some(replaced) = replaced {
            displaced.push(Box::new(replaced));
        }
        debug!(contract = key.display_name(), "bound instance");
        Ok(instance)
    }

    /// Binds a type-erased implementation, checking it against `C` at runtime.
    ///
    /// The erased value must hold an `Arc<C>`; anything else fails with
    /// [`DiError::InvalidType`]. Erased bindings carry no constructor, so a
    /// transient one fails every resolution with
    /// [`DiError::TransientClassInstantiationFailed`].
    ///
    /// ```
    /// use scene_di::{Container, DiError, Erased, Lifetime};
    /// use std::sync::Arc;
    ///
    /// let mut container = Container::new();
    /// let err = container
    ///     .bind_erased::<String>(Some(Erased::new(7u32)), Lifetime::Singleton)
    ///     .unwrap_err();
    /// assert!(matches!(err, DiError::InvalidType { implementation: "u32", .. }));
    ///
    /// let ok = container
    ///     .bind_erased::<String>(Some(Erased::new(Arc::new("up".to_string()))), Lifetime::Singleton)
    ///     .unwrap();
    /// assert_eq!(&*ok, "up");
    /// ```
    pub fn bind_erased<C>(
        &mut self,
        implementation: Option<Erased>,
        lifetime: Lifetime,
    ) -> DiResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = Key::of::<C>();
        let Erased { value, type_name } =
            implementation.ok_or(DiError::NullBinding(key.display_name()))?;

        let instance = match value.downcast::<Arc<C>>() {
            Ok(boxed) => *boxed,
            Err(_) => {
                return Err(DiError::InvalidType {
                    contract: key.display_name(),
                    implementation: type_name,
                })
            }
        };

        if let Some(existing) = self.existing_singleton::<C>(&key)? {
            return Ok(existing);
        }

        self.registry.insert(
            key,
            Registration::new(lifetime, type_name, erase(instance.clone())),
        );
        debug!(contract = key.display_name(), concrete = type_name, ?lifetime, "bound erased");
        Ok(instance)
    }

    /// Removes the registration for `C`. Returns whether one existed.
    pub fn unbind<C: ?Sized + 'static>(&mut self) -> bool {
        self.unbind_key(&Key::of::<C>())
    }

    pub fn unbind_key(&mut self, key: &Key) -> bool {
        self.take_key(key).is_some()
    }

    /// Removes and returns the registration for `key`.
    pub(crate) fn take_key(&mut self, key: &Key) -> Option<Registration> {
        let removed = self.registry.remove(key);
        if removed.is_some() {
            debug!(contract = key.display_name(), "unbound");
        }
        removed
    }

    pub fn contains<C: ?Sized + 'static>(&self) -> bool {
        self.registry.contains_key(&Key::of::<C>())
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.registry.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.registry.descriptors()
    }

    /// Populates `target`'s injection points from this container alone.
    pub fn inject_dependencies<T>(&self, target: &mut T) -> InjectionReport
    where
        T: InjectionTarget + ?Sized,
    {
        inject_dependencies(self, target)
    }

    /// Drops every registration. Handles resolved earlier stay valid.
    pub fn clear(&mut self) {
        let count = self.registry.len();
        self.registry.clear();
        debug!(count, "container cleared");
    }

    pub(crate) fn prepare(&self, key: &Key) -> Option<Resolution> {
        self.registry.get(key).map(Registration::resolution)
    }

    fn existing_singleton<C>(&self, key: &Key) -> DiResult<Option<Arc<C>>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        match self.registry.get(key) {
            Some(reg) if reg.lifetime == Lifetime::Singleton => {
                debug!(
                    contract = key.display_name(),
                    concrete = reg.concrete,
                    "singleton already bound, keeping existing instance"
                );
                downcast_contract::<C>(reg.instance.clone()).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &Key, args: Option<&ConstructorArgs>) -> DiResult<AnyArc> {
        self.prepare(key)
            .ok_or(DiError::CannotResolve(key.display_name()))?
            .complete(args)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.registry
                    .iter()
                    .map(|(key, reg)| (key.display_name(), (reg.lifetime, reg.concrete))),
            )
            .finish()
    }
}

/// A type-erased implementation for [`Container::bind_erased`].
pub struct Erased {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Erased {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Erased {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Erased").field(&self.type_name).finish()
    }
}

fn transient_factory<C, I>() -> Factory
where
    C: ?Sized + Send + Sync + 'static,
    I: Injectable + Implements<C>,
{
    Arc::new(|args: &ConstructorArgs| -> Result<AnyArc, ConstructError> {
        let value = I::construct(args)?;
        Ok(erase(<I as Implements<C>>::upcast(Arc::new(value))))
    })
}
