//! The service container: storage, resolution, and mutation rules.
//!
//! A [`Container`] is a flat registry mapping [`ServiceId`]s to
//! [`Definition`]s. Lookups resolve lazily: the first `get` of a singleton
//! definition invokes its constructor, caches the result, and freezes the
//! entry against further mutation; factory definitions re-run on every
//! `get`; plain values are returned as stored.
//!
//! Every operation is synchronous and runs to completion before container
//! state can be observed again. Constructors receive `&mut Container` and
//! may reenter it to register or resolve other services; a definition that
//! resolves itself recurses until stack exhaustion, which is treated as a
//! caller bug rather than guarded against.

use crate::definition::{Definition, ServiceCallable, ServiceValue};
use crate::error::ContainerError;
use crate::id::ServiceId;
use crate::provider::ServiceProvider;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, trace};

/// How an entry behaves on `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Plain data, returned as stored.
    Plain,
    /// Constructor invoked once; the result is cached and the entry
    /// freezes.
    Singleton,
    /// Constructor invoked on every `get`; never cached, never frozen.
    Factory,
}

/// Per-identifier registration record.
struct ServiceEntry {
    definition: Definition,
    kind: ServiceKind,
    protected: bool,
    frozen: bool,
    /// Original constructor, retained once a singleton has resolved so the
    /// unevaluated form stays retrievable through [`Container::raw`].
    raw: Option<ServiceCallable>,
}

impl std::fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("definition", &self.definition)
            .field("kind", &self.kind)
            .field("protected", &self.protected)
            .field("frozen", &self.frozen)
            .field("raw", &self.raw.as_ref().map(|_| "..."))
            .finish()
    }
}

impl ServiceEntry {
    fn new(definition: Definition, kind: ServiceKind, protected: bool) -> Self {
        Self {
            definition,
            kind,
            protected,
            frozen: false,
            raw: None,
        }
    }
}

/// Resolution counters.
///
/// Plain fields, no atomics: the container is single-threaded and all
/// mutation goes through `&mut self`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStats {
    /// `get` calls that reached a registered entry.
    pub resolutions: u64,
    /// Resolutions answered from a stored value (plain or already frozen).
    pub cache_hits: u64,
    /// First-time singleton constructions.
    pub cache_misses: u64,
    /// Factory invocations.
    pub factory_creations: u64,
}

impl ContainerStats {
    /// Share of resolutions answered without invoking a constructor.
    pub fn hit_rate(&self) -> f64 {
        if self.resolutions == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.resolutions as f64
        }
    }
}

/// Keyed dependency-injection service container.
///
/// See the [module docs](self) for the resolution model. Identifier
/// arguments are taken as `impl Into<ServiceId>`, so string literals work
/// directly:
///
/// ```
/// use carton::{Container, Definition};
///
/// let mut container = Container::new();
/// container.set_value("answer", 42_i32)?;
/// assert_eq!(*container.resolve::<i32>("answer")?, 42);
/// # Ok::<(), carton::ContainerError>(())
/// ```
#[derive(Debug, Default)]
pub struct Container {
    entries: IndexMap<ServiceId, ServiceEntry>,
    stats: ContainerStats,
}

impl Container {
    /// Empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a definition.
    ///
    /// A callable definition registers as a singleton; tag it with
    /// [`factory`](Self::factory) or [`protect`](Self::protect) instead for
    /// the other behaviors. Replacing an unfrozen entry resets its kind and
    /// protection from the new definition.
    ///
    /// # Errors
    ///
    /// [`ContainerError::FrozenService`] if the identifier's singleton
    /// value is already cached.
    pub fn set(
        &mut self,
        id: impl Into<ServiceId>,
        definition: Definition,
    ) -> Result<(), ContainerError> {
        let kind = if definition.is_callable() {
            ServiceKind::Singleton
        } else {
            ServiceKind::Plain
        };
        self.install(id.into(), definition, kind, false)
    }

    /// Register plain data under `id`.
    ///
    /// Sugar for `set(id, Definition::value(value))`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::FrozenService`] if the identifier is frozen.
    pub fn set_value<T: Any + Send + Sync>(
        &mut self,
        id: impl Into<ServiceId>,
        value: T,
    ) -> Result<(), ContainerError> {
        self.set(id, Definition::value(value))
    }

    /// Register a constructor that re-executes on every `get`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::ExpectedCallable`] if `definition` is a plain
    /// value; [`ContainerError::FrozenService`] if the identifier is
    /// frozen.
    pub fn factory(
        &mut self,
        id: impl Into<ServiceId>,
        definition: Definition,
    ) -> Result<(), ContainerError> {
        if !definition.is_callable() {
            return Err(ContainerError::ExpectedCallable);
        }
        self.install(id.into(), definition, ServiceKind::Factory, false)
    }

    /// Register a constructor that can never be the target of
    /// [`extend`](Self::extend).
    ///
    /// # Errors
    ///
    /// [`ContainerError::ExpectedCallable`] if `definition` is a plain
    /// value; [`ContainerError::FrozenService`] if the identifier is
    /// frozen.
    pub fn protect(
        &mut self,
        id: impl Into<ServiceId>,
        definition: Definition,
    ) -> Result<(), ContainerError> {
        if !definition.is_callable() {
            return Err(ContainerError::ExpectedCallable);
        }
        self.install(id.into(), definition, ServiceKind::Singleton, true)
    }

    /// Resolve and return the service registered under `id`.
    ///
    /// Plain values and already-frozen singletons are returned as stored.
    /// A factory constructor runs on every call and its result is never
    /// cached. Any other constructor runs once: the result replaces the
    /// definition, the original constructor moves to the raw slot, and the
    /// entry freezes.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownIdentifier`] if `id` is not registered.
    pub fn get(&mut self, id: impl Into<ServiceId>) -> Result<ServiceValue, ContainerError> {
        let id = id.into();
        let Some(entry) = self.entries.get(&id) else {
            return Err(ContainerError::UnknownIdentifier(id));
        };
        self.stats.resolutions += 1;

        let (callable, kind) = match &entry.definition {
            Definition::Value(value) => {
                self.stats.cache_hits += 1;
                return Ok(Arc::clone(value));
            }
            Definition::Callable(callable) => (Arc::clone(callable), entry.kind),
        };

        if kind == ServiceKind::Factory {
            trace!(id = %id, "invoking factory");
            self.stats.factory_creations += 1;
            return Ok(callable(self));
        }

        // First singleton resolution. The constructor may reenter the
        // container through its argument, so the entry is re-fetched before
        // the result is cached; a reentrant removal leaves the result
        // uncached and the removal stands.
        debug!(id = %id, "resolving singleton");
        let resolved = callable(self);
        self.stats.cache_misses += 1;
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.definition = Definition::Value(Arc::clone(&resolved));
            entry.raw = Some(callable);
            entry.frozen = true;
        }
        Ok(resolved)
    }

    /// [`get`](Self::get) followed by a checked downcast to `T`.
    ///
    /// # Errors
    ///
    /// Everything `get` raises, plus [`ContainerError::TypeMismatch`] if
    /// the stored value is not a `T`.
    pub fn resolve<T: Any + Send + Sync>(
        &mut self,
        id: impl Into<ServiceId>,
    ) -> Result<Arc<T>, ContainerError> {
        let id = id.into();
        let value = self.get(id.clone())?;
        value
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                id,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Whether `id` is registered. Never resolves, never fails.
    pub fn has(&self, id: impl Into<ServiceId>) -> bool {
        self.entries.contains_key(&id.into())
    }

    /// Registered identifiers, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &ServiceId> {
        self.entries.keys()
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no registrations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The unevaluated original definition for `id`.
    ///
    /// For a frozen singleton this is the constructor as registered; for
    /// anything else it is a clone of the current definition.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownIdentifier`] if `id` is not registered.
    pub fn raw(&self, id: impl Into<ServiceId>) -> Result<Definition, ContainerError> {
        let id = id.into();
        let entry = self
            .entries
            .get(&id)
            .ok_or(ContainerError::UnknownIdentifier(id))?;
        match &entry.raw {
            Some(callable) => Ok(Definition::Callable(Arc::clone(callable))),
            None => Ok(entry.definition.clone()),
        }
    }

    /// Remove `id` entirely, dropping its definition, kind, protection,
    /// freeze state, and retained raw constructor.
    ///
    /// Returns the removed definition (the cached value, for a frozen
    /// entry), or `None` when `id` was not registered. Registration order
    /// of the remaining entries is preserved.
    pub fn remove(&mut self, id: impl Into<ServiceId>) -> Option<Definition> {
        let id = id.into();
        let entry = self.entries.shift_remove(&id)?;
        debug!(id = %id, "removed service");
        Some(entry.definition)
    }

    /// Wrap the callable definition at `id` with `modifier`.
    ///
    /// The new definition resolves to
    /// `modifier(original(container), container)` and is re-registered
    /// under `id` with the original entry's kind, so extending a factory
    /// yields a factory.
    ///
    /// # Errors
    ///
    /// In order of precedence: [`ContainerError::UnknownIdentifier`],
    /// [`ContainerError::FrozenService`],
    /// [`ContainerError::InvalidServiceIdentifier`] (current definition is
    /// a plain value), [`ContainerError::ProtectedService`].
    pub fn extend<F>(&mut self, id: impl Into<ServiceId>, modifier: F) -> Result<(), ContainerError>
    where
        F: Fn(ServiceValue, &mut Container) -> ServiceValue + Send + Sync + 'static,
    {
        let id = id.into();
        let Some(entry) = self.entries.get(&id) else {
            return Err(ContainerError::UnknownIdentifier(id));
        };
        if entry.frozen {
            return Err(ContainerError::FrozenService(id));
        }
        let Definition::Callable(original) = &entry.definition else {
            return Err(ContainerError::InvalidServiceIdentifier(id));
        };
        if entry.protected {
            return Err(ContainerError::ProtectedService(id));
        }

        let kind = entry.kind;
        let original = Arc::clone(original);
        let wrapped: ServiceCallable = Arc::new(move |container: &mut Container| {
            let resolved = original(container);
            modifier(resolved, container)
        });
        debug!(id = %id, kind = ?kind, "extending service");
        self.install(id, Definition::Callable(wrapped), kind, false)
    }

    /// Hand the container to `provider` for registration, then return it
    /// for chaining.
    ///
    /// # Errors
    ///
    /// Whatever the provider's own registrations raise.
    pub fn register<P>(&mut self, provider: &P) -> Result<&mut Self, ContainerError>
    where
        P: ServiceProvider + ?Sized,
    {
        provider.register(self)?;
        Ok(self)
    }

    /// Resolution counters accumulated since construction or the last
    /// [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> &ContainerStats {
        &self.stats
    }

    /// Zero the resolution counters. Registrations are untouched.
    pub fn reset_stats(&mut self) {
        self.stats = ContainerStats::default();
    }

    fn install(
        &mut self,
        id: ServiceId,
        definition: Definition,
        kind: ServiceKind,
        protected: bool,
    ) -> Result<(), ContainerError> {
        if let Some(entry) = self.entries.get(&id) {
            if entry.frozen {
                return Err(ContainerError::FrozenService(id));
            }
        }
        trace!(id = %id, kind = ?kind, protected = protected, "registering service");
        self.entries
            .insert(id, ServiceEntry::new(definition, kind, protected));
        Ok(())
    }
}

impl<I: Into<ServiceId>> FromIterator<(I, Definition)> for Container {
    /// Register every entry via [`Container::set`], in iteration order.
    fn from_iter<T: IntoIterator<Item = (I, Definition)>>(iter: T) -> Self {
        let mut container = Container::new();
        for (id, definition) in iter {
            container
                .set(id, definition)
                .expect("a fresh container holds no frozen entries");
        }
        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Greeter {
        salute: String,
    }

    #[test]
    fn plain_values_return_as_stored() {
        let mut container = Container::new();
        container.set_value("answer", 42_i32).unwrap();

        let first = container.get("answer").unwrap();
        let second = container.get("answer").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*container.resolve::<i32>("answer").unwrap(), 42);
    }

    #[test]
    fn singletons_invoke_once_and_freeze() {
        let mut container = Container::new();
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invocations);
        container
            .set(
                "greeter",
                Definition::callable(move |_: &mut Container| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Greeter {
                        salute: "hello".into(),
                    }
                }),
            )
            .unwrap();

        let first = container.resolve::<Greeter>("greeter").unwrap();
        let second = container.resolve::<Greeter>("greeter").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        let err = container.set_value("greeter", 0_i32).unwrap_err();
        assert!(matches!(err, ContainerError::FrozenService(_)));
    }

    #[test]
    fn factories_invoke_every_get() {
        let mut container = Container::new();
        container
            .factory(
                "ticket",
                Definition::callable(|c: &mut Container| c.stats().resolutions),
            )
            .unwrap();

        let first = container.get("ticket").unwrap();
        let second = container.get("ticket").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        // Never frozen: still replaceable.
        container.set_value("ticket", 0_i32).unwrap();
    }

    #[test]
    fn factory_rejects_plain_values() {
        let mut container = Container::new();
        let err = container.factory("n", Definition::value(1_i32)).unwrap_err();
        assert!(matches!(err, ContainerError::ExpectedCallable));
    }

    #[test]
    fn raw_returns_the_original_constructor_after_freeze() {
        let mut container = Container::new();
        container
            .set("n", Definition::callable(|_: &mut Container| 7_i32))
            .unwrap();
        container.get("n").unwrap();

        assert!(container.raw("n").unwrap().is_callable());
        // The stored definition itself is the cached value now.
        assert!(matches!(
            container.get("n").unwrap().downcast::<i32>(),
            Ok(n) if *n == 7
        ));
    }

    #[test]
    fn extend_wraps_and_preserves_factory_kind() {
        let mut container = Container::new();
        container
            .factory("n", Definition::callable(|_: &mut Container| 10_i32))
            .unwrap();
        container
            .extend("n", |value, _| {
                let n = value
                    .downcast::<i32>()
                    .unwrap_or_else(|_| panic!("factory yields i32"));
                Arc::new(*n + 1) as ServiceValue
            })
            .unwrap();

        assert_eq!(*container.resolve::<i32>("n").unwrap(), 11);
        assert_eq!(*container.resolve::<i32>("n").unwrap(), 11);
        // Still a factory: distinct instances, no freeze.
        let a = container.get("n").unwrap();
        let b = container.get("n").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn extend_error_precedence() {
        let mut container = Container::new();
        assert!(matches!(
            container.extend("missing", |v, _| v).unwrap_err(),
            ContainerError::UnknownIdentifier(_)
        ));

        container.set_value("plain", 1_i32).unwrap();
        assert!(matches!(
            container.extend("plain", |v, _| v).unwrap_err(),
            ContainerError::InvalidServiceIdentifier(_)
        ));

        container
            .protect("guarded", Definition::callable(|_: &mut Container| 1_i32))
            .unwrap();
        assert!(matches!(
            container.extend("guarded", |v, _| v).unwrap_err(),
            ContainerError::ProtectedService(_)
        ));

        container
            .set("frozen", Definition::callable(|_: &mut Container| 1_i32))
            .unwrap();
        container.get("frozen").unwrap();
        assert!(matches!(
            container.extend("frozen", |v, _| v).unwrap_err(),
            ContainerError::FrozenService(_)
        ));
    }

    #[test]
    fn remove_purges_all_entry_state() {
        let mut container = Container::new();
        container
            .set("svc", Definition::callable(|_: &mut Container| 5_i32))
            .unwrap();
        container.get("svc").unwrap();

        assert!(container.remove("svc").is_some());
        assert!(!container.has("svc"));
        assert!(container.remove("svc").is_none());

        // Re-registration starts unfrozen.
        container.set_value("svc", 6_i32).unwrap();
        container.set_value("svc", 7_i32).unwrap();
        assert_eq!(*container.resolve::<i32>("svc").unwrap(), 7);
    }

    #[test]
    fn keys_preserve_registration_order() {
        let mut container = Container::new();
        container.set_value("a", 1_i32).unwrap();
        container.set_value("b", 2_i32).unwrap();
        container.set_value("c", 3_i32).unwrap();
        container.remove("b");

        let keys: Vec<String> = container.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[test]
    fn reentrant_resolution_sees_the_container() {
        let mut container = Container::new();
        container.set_value("base", 20_i32).unwrap();
        container
            .set(
                "derived",
                Definition::callable(|c: &mut Container| {
                    *c.resolve::<i32>("base").expect("base is registered") + 1
                }),
            )
            .unwrap();

        assert_eq!(*container.resolve::<i32>("derived").unwrap(), 21);
    }

    #[test]
    fn reentrant_removal_leaves_result_uncached() {
        let mut container = Container::new();
        container
            .set(
                "ephemeral",
                Definition::callable(|c: &mut Container| {
                    c.remove("ephemeral");
                    9_i32
                }),
            )
            .unwrap();

        assert_eq!(*container.resolve::<i32>("ephemeral").unwrap(), 9);
        assert!(!container.has("ephemeral"));
    }

    #[test]
    fn stats_track_hits_misses_and_factories() {
        let mut container = Container::new();
        container.set_value("v", 1_i32).unwrap();
        container
            .set("s", Definition::callable(|_: &mut Container| 2_i32))
            .unwrap();
        container
            .factory("f", Definition::callable(|_: &mut Container| 3_i32))
            .unwrap();

        container.get("v").unwrap();
        container.get("s").unwrap();
        container.get("s").unwrap();
        container.get("f").unwrap();

        let stats = container.stats();
        assert_eq!(stats.resolutions, 4);
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.factory_creations, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);

        container.reset_stats();
        assert_eq!(container.stats(), &ContainerStats::default());
    }
}
