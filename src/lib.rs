//! # scene-di
//!
//! Two-tier dependency injection for games and other scene-based hosts.
//!
//! ## Features
//!
//! - **Two scopes**: a global container that lives for the whole process and
//!   a scene container that is cleared on its own when a scene unloads
//! - **Two lifetimes**: shared singletons and freshly constructed transients
//! - **Scope fallback**: a contract missing from its declared scope is looked
//!   up in the other one
//! - **Member injection**: objects list their injectable members once and are
//!   populated on demand; unresolvable members are left untouched
//! - **Trait contracts**: bind implementations against `dyn Trait` keys
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_di::{implements, DiContext, Injectable, Resolver};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[console] {}", message)
//!     }
//! }
//! impl Injectable for ConsoleLogger {}
//! implements!(dyn Logger => ConsoleLogger);
//!
//! let mut context = DiContext::new();
//! context.bind::<dyn Logger, _>(ConsoleLogger).unwrap();
//!
//! let logger = context.resolve::<dyn Logger>().unwrap();
//! assert_eq!(logger.log("ready"), "[console] ready");
//! ```
//!
//! ## Lifetimes and Scopes
//!
//! An implementation declares both through [`Injectable`]:
//!
//! - **Singleton** (default): the bound value is shared. Binding the same
//!   contract again returns the existing instance until it is unbound.
//! - **Transient**: every resolution fabricates a new instance through
//!   [`Injectable::construct`], optionally from [`ConstructorArgs`].
//! - **Global** (default) and **Scene** choose the container the binding
//!   lands in.
//!
//! ```rust
//! use scene_di::{
//!     ConstructError, ConstructorArgs, DiContext, Injectable, Lifetime, Resolver, Scope,
//! };
//! use std::sync::Arc;
//!
//! struct Calculator;
//! impl Calculator {
//!     fn add(&self, a: i32, b: i32) -> i32 { a + b }
//! }
//! impl Injectable for Calculator {
//!     const LIFETIME: Lifetime = Lifetime::Transient;
//!     const SCOPE: Scope = Scope::Scene;
//!
//!     fn construct(_: &ConstructorArgs) -> Result<Self, ConstructError> {
//!         Ok(Calculator)
//!     }
//! }
//!
//! let mut context = DiContext::new();
//! context.bind::<Calculator, _>(Calculator).unwrap();
//!
//! let a = context.resolve::<Calculator>().unwrap();
//! let b = context.resolve::<Calculator>().unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! assert_eq!(a.add(2, 3), 5);
//!
//! context.clear_scene_container();
//! assert!(context.resolve_or_default::<Calculator>().is_none());
//! ```
//!
//! ## Process-wide access
//!
//! The [`global`] module wraps one [`DiContext`] behind free functions for
//! code that cannot carry a context handle around.

pub mod args;
pub mod container;
pub mod context;
pub mod descriptors;
pub mod error;
pub mod global;
pub mod inject;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod traits;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use args::ConstructorArgs;
pub use container::{Container, Erased};
pub use context::DiContext;
pub use descriptors::ServiceDescriptor;
pub use error::{ConstructError, DiError, DiResult};
pub use global::GlobalContext;
pub use inject::{inject_dependencies, InjectionPoints, InjectionReport, InjectionTarget};
pub use key::{key_of, Key};
pub use lifetime::{Lifetime, Scope, ServicePolicy};
pub use observer::{DiObserver, MetricsObserver, TracingObserver};
pub use registration::AnyArc;
pub use traits::{Implements, Injectable, Resolver, ResolverCore};

#[cfg(feature = "config")]
pub use config::{PolicyError, PolicyOverride, PolicyTable};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    trait Audio: Send + Sync {
        fn channel(&self) -> &'static str;
    }

    struct GlobalAudio;
    impl Audio for GlobalAudio {
        fn channel(&self) -> &'static str {
            "global"
        }
    }
    impl Injectable for GlobalAudio {}

    struct SceneAudio;
    impl Audio for SceneAudio {
        fn channel(&self) -> &'static str {
            "scene"
        }
    }
    impl Injectable for SceneAudio {
        const SCOPE: Scope = Scope::Scene;
    }

    implements!(dyn Audio => GlobalAudio, SceneAudio);

    #[test]
    fn test_singleton_resolution() {
        let mut context = DiContext::new();
        context.bind::<dyn Audio, _>(GlobalAudio).unwrap();

        let a = context.resolve::<dyn Audio>().unwrap();
        let b = context.resolve::<dyn Audio>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_global_declared_contract_prefers_global() {
        let mut context = DiContext::new();
        context.bind::<dyn Audio, _>(GlobalAudio).unwrap();
        context.bind::<dyn Audio, _>(SceneAudio).unwrap();

        assert_eq!(context.resolve::<dyn Audio>().unwrap().channel(), "global");
    }

    #[test]
    fn test_scene_declared_contract_prefers_scene() {
        let mut context = DiContext::new();
        context.declare_contract_scope::<dyn Audio>(Scope::Scene);
        context.bind::<dyn Audio, _>(GlobalAudio).unwrap();
        context.bind::<dyn Audio, _>(SceneAudio).unwrap();

        assert_eq!(context.resolve::<dyn Audio>().unwrap().channel(), "scene");
    }

    #[test]
    fn test_display_lists_registrations() {
        let mut context = DiContext::new();
        context.bind::<dyn Audio, _>(SceneAudio).unwrap();

        let listing = context.to_string();
        assert!(listing.starts_with("Scene "));
        assert!(listing.contains("SceneAudio"));
        assert!(listing.contains("Singleton"));
    }
}
