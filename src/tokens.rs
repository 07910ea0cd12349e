//! Out-of-band type-token annotations.
//!
//! A [`TokenRegistry`] associates Rust types with preferred service
//! identifiers, the explicit equivalent of decorator-style registration
//! hints. It is deliberately external to [`Container`]: the container
//! never consults these bindings during its own resolution, and code that
//! does not opt in pays nothing.

use crate::container::Container;
use crate::error::ContainerError;
use crate::id::ServiceId;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Registry mapping type tokens to preferred service identifiers.
///
/// Populated by explicit [`bind`](TokenRegistry::bind) calls and consumed
/// only by the auto-wiring helper [`resolve`](TokenRegistry::resolve).
#[derive(Debug, Default)]
pub struct TokenRegistry {
    bindings: HashMap<TypeId, ServiceId>,
}

impl TokenRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `T` to `id`, returning the previous binding if any.
    pub fn bind<T: 'static>(&mut self, id: impl Into<ServiceId>) -> Option<ServiceId> {
        let id = id.into();
        trace!(token = std::any::type_name::<T>(), id = %id, "binding token");
        self.bindings.insert(TypeId::of::<T>(), id)
    }

    /// Drop the binding for `T`, returning it if present.
    pub fn unbind<T: 'static>(&mut self) -> Option<ServiceId> {
        self.bindings.remove(&TypeId::of::<T>())
    }

    /// Preferred identifier for `T`, if bound.
    pub fn identifier_of<T: 'static>(&self) -> Option<&ServiceId> {
        self.bindings.get(&TypeId::of::<T>())
    }

    /// Number of bound types.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no types are bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Auto-wire: resolve `T` from `container` through its bound
    /// identifier.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownIdentifier`] when `T` has no binding (the
    /// type name is reported as the unknown identifier) or when the bound
    /// identifier is not registered; [`ContainerError::TypeMismatch`] when
    /// the registered service is not a `T`.
    pub fn resolve<T: Any + Send + Sync>(
        &self,
        container: &mut Container,
    ) -> Result<Arc<T>, ContainerError> {
        let id = self.identifier_of::<T>().ok_or_else(|| {
            ContainerError::UnknownIdentifier(ServiceId::name(std::any::type_name::<T>()))
        })?;
        container.resolve::<T>(id.clone())
    }
}
