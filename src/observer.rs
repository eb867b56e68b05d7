//! Diagnostic observers for binding and resolution events.
//!
//! Observers are attached to a [`DiContext`](crate::DiContext) and are told
//! about every bind, unbind, resolution and scope teardown the context
//! performs. They are invoked synchronously, so keep them lightweight.
//!
//! Through the [`global`](crate::global) handle, callbacks run after the
//! process-wide lock is released and may resolve through the handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;
use crate::lifetime::{Lifetime, Scope};

/// Observer trait for context events.
///
/// Every method has an empty default so an observer only overrides what it
/// cares about.
///
/// # Examples
///
/// ```
/// use scene_di::{DiContext, DiObserver, Key, Lifetime, Scope};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Journal(Mutex<Vec<String>>);
///
/// impl DiObserver for Journal {
///     fn bound(&self, key: &Key, scope: Scope, _lifetime: Lifetime) {
///         self.0.lock().unwrap().push(format!("{:?}:{}", scope, key));
///     }
/// }
///
/// let journal = Arc::new(Journal::default());
/// let mut context = DiContext::new();
/// context.add_observer(journal.clone());
/// context.bind_instance(Scope::Scene, Arc::new(5u32)).unwrap();
///
/// assert_eq!(journal.0.lock().unwrap().as_slice(), ["Scene:u32"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// A binding was stored (or an existing singleton kept).
    fn bound(&self, key: &Key, scope: Scope, lifetime: Lifetime) {
        let _ = (key, scope, lifetime);
    }

    /// A binding was removed from the given scope.
    fn unbound(&self, key: &Key, scope: Scope) {
        let _ = (key, scope);
    }

    /// A contract was resolved from `scope`.
    fn resolved(&self, key: &Key, scope: Scope, duration: Duration) {
        let _ = (key, scope, duration);
    }

    /// A transient constructor failed in `scope`; the search may still
    /// succeed in the fallback container.
    fn construction_failed(&self, key: &Key, scope: Scope, error: &DiError) {
        let _ = (key, scope, error);
    }

    /// A resolution failed in every searched container.
    fn resolve_failed(&self, key: &Key, error: &DiError) {
        let _ = (key, error);
    }

    /// A scope's container was cleared and discarded.
    fn scope_cleared(&self, scope: Scope) {
        let _ = scope;
    }
}

/// A context mutation, reported once the mutation is complete.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Event {
    Bound(Key, Scope, Lifetime),
    Unbound(Key, Scope),
    ScopeCleared(Scope),
}

/// Registered observers.
///
/// Cheap to clone so the process-wide handle can notify without holding its
/// lock.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn notify(&self, event: &Event) {
        match event {
            Event::Bound(key, scope, lifetime) => self.bound(key, *scope, *lifetime),
            Event::Unbound(key, scope) => self.unbound(key, *scope),
            Event::ScopeCleared(scope) => self.scope_cleared(*scope),
        }
    }

    pub(crate) fn bound(&self, key: &Key, scope: Scope, lifetime: Lifetime) {
        for observer in &self.observers {
            observer.bound(key, scope, lifetime);
        }
    }

    pub(crate) fn unbound(&self, key: &Key, scope: Scope) {
        for observer in &self.observers {
            observer.unbound(key, scope);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, scope: Scope, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, scope, duration);
        }
    }

    pub(crate) fn construction_failed(&self, key: &Key, scope: Scope, error: &DiError) {
        for observer in &self.observers {
            observer.construction_failed(key, scope, error);
        }
    }

    pub(crate) fn resolve_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.resolve_failed(key, error);
        }
    }

    pub(crate) fn scope_cleared(&self, scope: Scope) {
        for observer in &self.observers {
            observer.scope_cleared(scope);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// Bind and teardown events are emitted at `info`, resolutions at `debug`
/// and failures at `warn`, all under the `scene_di` target.
///
/// ```
/// use scene_di::{DiContext, TracingObserver};
/// use std::sync::Arc;
///
/// let mut context = DiContext::new();
/// context.add_observer(Arc::new(TracingObserver::new()));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        TracingObserver
    }
}

impl DiObserver for TracingObserver {
    fn bound(&self, key: &Key, scope: Scope, lifetime: Lifetime) {
        tracing::info!(target: "scene_di", contract = key.display_name(), ?scope, ?lifetime, "bound");
    }

    fn unbound(&self, key: &Key, scope: Scope) {
        tracing::info!(target: "scene_di", contract = key.display_name(), ?scope, "unbound");
    }

    fn resolved(&self, key: &Key, scope: Scope, duration: Duration) {
        tracing::debug!(target: "scene_di", contract = key.display_name(), ?scope, ?duration, "resolved");
    }

    fn construction_failed(&self, key: &Key, scope: Scope, error: &DiError) {
        tracing::warn!(target: "scene_di", contract = key.display_name(), ?scope, %error, "construction failed");
    }

    fn resolve_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(target: "scene_di", contract = key.display_name(), %error, "resolution failed");
    }

    fn scope_cleared(&self, scope: Scope) {
        tracing::info!(target: "scene_di", ?scope, "scope cleared");
    }
}

/// Observer that counts events.
///
/// ```
/// use scene_di::{DiContext, MetricsObserver, Resolver};
/// use std::sync::Arc;
///
/// let metrics = Arc::new(MetricsObserver::new());
/// let mut context = DiContext::new();
/// context.add_observer(metrics.clone());
///
/// assert!(context.resolve::<String>().is_err());
/// assert_eq!(metrics.failure_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MetricsObserver {
    bind_count: AtomicU64,
    resolution_count: AtomicU64,
    failure_count: AtomicU64,
    total_resolution_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_count(&self) -> u64 {
        self.bind_count.load(Ordering::Relaxed)
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_nanos.load(Ordering::Relaxed))
    }

    /// Mean resolution time, `None` before the first resolution.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            None
        } else {
            let total = self.total_resolution_nanos.load(Ordering::Relaxed);
            Some(Duration::from_nanos(total / count))
        }
    }

    pub fn reset(&self) {
        self.bind_count.store(0, Ordering::Relaxed);
        self.resolution_count.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
        self.total_resolution_nanos.store(0, Ordering::Relaxed);
    }
}

impl DiObserver for MetricsObserver {
    fn bound(&self, _key: &Key, _scope: Scope, _lifetime: Lifetime) {
        self.bind_count.fetch_add(1, Ordering::Relaxed);
    }

    fn resolved(&self, _key: &Key, _scope: Scope, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn resolve_failed(&self, _key: &Key, _error: &DiError) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of;

    #[test]
    fn metrics_observer_counts() {
        let observer = MetricsObserver::new();
        let key = key_of::<String>();

        assert_eq!(observer.resolution_count(), 0);
        assert!(observer.average_resolution_time().is_none());

        observer.resolved(&key, Scope::Global, Duration::from_millis(10));
        observer.resolved(&key, Scope::Scene, Duration::from_millis(20));
        observer.bound(&key, Scope::Global, Lifetime::Singleton);
        observer.resolve_failed(&key, &DiError::CannotResolve("String"));

        assert_eq!(observer.resolution_count(), 2);
        assert_eq!(observer.bind_count(), 1);
        assert_eq!(observer.failure_count(), 1);
        assert!(observer.total_resolution_time() >= Duration::from_millis(30));
        assert_eq!(observer.average_resolution_time(), Some(Duration::from_millis(15)));

        observer.reset();
        assert_eq!(observer.failure_count(), 0);
    }

    #[test]
    fn observers_fan_out() {
        let first = Arc::new(MetricsObserver::new());
        let second = Arc::new(MetricsObserver::new());
        let mut observers = Observers::default();
        observers.add(first.clone());
        observers.add(second.clone());
        observers.add(Arc::new(TracingObserver::new()));

        assert!(observers.has_observers());
        assert_eq!(observers.len(), 3);

        observers.bound(&key_of::<u8>(), Scope::Scene, Lifetime::Transient);
        observers.unbound(&key_of::<u8>(), Scope::Scene);
        observers.scope_cleared(Scope::Scene);
        assert_eq!(first.bind_count(), 1);
        assert_eq!(second.bind_count(), 1);
    }

    #[test]
    fn average_with_count_beyond_u32() {
        let observer = MetricsObserver::new();
        let count = u64::from(u32::MAX) + 1;
        observer.resolution_count.store(count, Ordering::Relaxed);
        observer
            .total_resolution_nanos
            .store(count * 3, Ordering::Relaxed);

        assert_eq!(observer.average_resolution_time(), Some(Duration::from_nanos(3)));
    }

    #[test]
    fn oversized_duration_saturates() {
        let observer = MetricsObserver::new();
        observer.resolved(&key_of::<u8>(), Scope::Global, Duration::MAX);
        assert_eq!(observer.total_resolution_time(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn notify_dispatches_events() {
        let metrics = Arc::new(MetricsObserver::new());
        let mut observers = Observers::default();
        observers.add(metrics.clone());

        observers.notify(&Event::Bound(key_of::<u8>(), Scope::Global, Lifetime::Singleton));
        observers.notify(&Event::Unbound(key_of::<u8>(), Scope::Global));
        observers.notify(&Event::ScopeCleared(Scope::Scene));
        assert_eq!(metrics.bind_count(), 1);
    }
}
