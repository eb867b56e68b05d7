//! Member injection driven by an explicit manifest.
//!
//! A target type lists its injection points by implementing
//! [`InjectionTarget`], usually through the [`injection_points!`] macro. The
//! injector resolves each point's contract and assigns the result; a point
//! whose contract cannot be resolved keeps its previous value. Injection as a
//! whole never fails.
//!
//! ```
//! use scene_di::{implements, injection_points, Container, Injectable, Lifetime};
//! use std::sync::Arc;
//!
//! trait Audio: Send + Sync {
//!     fn volume(&self) -> u8;
//! }
//! trait Network: Send + Sync {}
//!
//! struct Mixer;
//! impl Audio for Mixer {
//!     fn volume(&self) -> u8 { 7 }
//! }
//! impl Injectable for Mixer {}
//! implements!(dyn Audio => Mixer);
//!
//! #[derive(Default)]
//! struct Hud {
//!     audio: Option<Arc<dyn Audio>>,
//!     network: Option<Arc<dyn Network>>,
//! }
//!
//! injection_points!(Hud {
//!     audio: dyn Audio,
//!     network: dyn Network,
//! });
//!
//! let mut container = Container::new();
//! container.bind::<dyn Audio, _>(Mixer, Lifetime::Singleton).unwrap();
//!
//! let mut hud = Hud::default();
//! let report = container.inject_dependencies(&mut hud);
//!
//! assert_eq!(hud.audio.unwrap().volume(), 7);
//! assert!(hud.network.is_none());
//! assert_eq!(report.injected(), ["audio"]);
//! assert_eq!(report.skipped(), ["network"]);
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::traits::{Resolver, ResolverCore};

/// A type whose members can be populated by the injector.
///
/// Implementations call [`InjectionPoints::field`] or
/// [`InjectionPoints::property`] once per injectable member. Because the
/// manifest is written next to the type, private members are reachable too.
/// The default manifest is empty, which makes injection a no-op.
pub trait InjectionTarget {
    fn injection_points(&mut self, points: &mut InjectionPoints<'_>) {
        let _ = points;
    }
}

impl InjectionTarget for () {}

/// Resolution cursor handed to [`InjectionTarget::injection_points`].
pub struct InjectionPoints<'a> {
    source: &'a dyn ResolverCore,
    report: InjectionReport,
}

impl<'a> InjectionPoints<'a> {
    pub(crate) fn new(source: &'a dyn ResolverCore) -> Self {
        Self {
            source,
            report: InjectionReport::default(),
        }
    }

    /// Field-like point: assigns into `slot` when `C` resolves.
    pub fn field<C>(&mut self, member: &'static str, slot: &mut Option<Arc<C>>)
    where
        C: ?Sized + Send + Sync + 'static,
    {
        if let Some(value) = self.resolve_member::<C>(member) {
            *slot = Some(value);
        }
    }

    /// Property-like point: calls `set` when `C` resolves.
    pub fn property<C, F>(&mut self, member: &'static str, set: F)
    where
        C: ?Sized + Send + Sync + 'static,
        F: FnOnce(Arc<C>),
    {
        if let Some(value) = self.resolve_member::<C>(member) {
            set(value);
        }
    }

    fn resolve_member<C>(&mut self, member: &'static str) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        match self.source.resolve::<C>() {
            Ok(value) => {
                trace!(member, contract = std::any::type_name::<C>(), "injected");
                self.report.injected.push(member);
                Some(value)
            }
            Err(error) => {
                trace!(member, %error, "injection point left untouched");
                self.report.skipped.push(member);
                None
            }
        }
    }
}

/// Outcome of one injection pass, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    injected: Vec<&'static str>,
    skipped: Vec<&'static str>,
}

impl InjectionReport {
    /// Members that received a value.
    pub fn injected(&self) -> &[&'static str] {
        &self.injected
    }

    /// Members whose contract could not be resolved.
    pub fn skipped(&self) -> &[&'static str] {
        &self.skipped
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Populates every injection point of `target` from `source`.
pub fn inject_dependencies<T>(source: &dyn ResolverCore, target: &mut T) -> InjectionReport
where
    T: InjectionTarget + ?Sized,
{
    let mut points = InjectionPoints::new(source);
    target.injection_points(&mut points);
    points.report
}

/// Implements [`InjectionTarget`] for field-like injection points.
///
/// Each listed field must be an `Option<Arc<Contract>>`. Invoke the macro in
/// the module that defines the type so private fields are accessible.
///
/// ```
/// use scene_di::{injection_points, InjectionTarget};
/// use std::sync::Arc;
///
/// trait Store: Send + Sync {}
///
/// struct Inventory {
///     store: Option<Arc<dyn Store>>,
/// }
///
/// injection_points!(Inventory { store: dyn Store });
///
/// // Types without injectable members
/// struct Plain;
/// injection_points!(Plain {});
/// ```
#[macro_export]
macro_rules! injection_points {
    ($target:ty { $($field:ident : $contract:ty),* $(,)? }) => {
        impl $crate::InjectionTarget for $target {
            #[allow(unused_variables)]
            fn injection_points(&mut self, points: &mut $crate::InjectionPoints<'_>) {
                $(
                    points.field::<$contract>(::std::stringify!($field), &mut self.$field);
                )*
            }
        }
    };
}
