//! Service definitions: the value-or-constructor sum type.

use crate::container::Container;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A stored or resolved service value.
///
/// Values are shared handles; identity comparisons go through
/// [`Arc::ptr_eq`].
pub type ServiceValue = Arc<dyn Any + Send + Sync>;

/// A lazily-evaluated service constructor.
///
/// The constructor receives the container itself and may reenter it to
/// register or resolve other services while running.
pub type ServiceCallable = Arc<dyn Fn(&mut Container) -> ServiceValue + Send + Sync>;

/// What an identifier is bound to.
///
/// Resolution branches on this tag: a [`Definition::Value`] is returned as
/// stored, a [`Definition::Callable`] is invoked according to the entry's
/// [`ServiceKind`](crate::ServiceKind).
#[derive(Clone)]
pub enum Definition {
    /// Plain data, returned as-is by every lookup.
    Value(ServiceValue),
    /// Constructor invoked with the container as argument.
    Callable(ServiceCallable),
}

impl Definition {
    /// Wrap plain data.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Definition::Value(Arc::new(value))
    }

    /// Wrap a constructor returning a concrete service type.
    ///
    /// The return value is boxed into a [`ServiceValue`]; resolve it back
    /// with [`Container::resolve`](crate::Container::resolve).
    pub fn callable<T, F>(constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut Container) -> T + Send + Sync + 'static,
    {
        Definition::Callable(Arc::new(move |container| {
            Arc::new(constructor(container)) as ServiceValue
        }))
    }

    /// Whether this definition is a constructor rather than plain data.
    pub fn is_callable(&self) -> bool {
        matches!(self, Definition::Callable(_))
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Value(_) => f.write_str("Definition::Value(..)"),
            Definition::Callable(_) => f.write_str("Definition::Callable(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_definitions_are_not_callable() {
        assert!(!Definition::value(1_i32).is_callable());
    }

    #[test]
    fn constructor_definitions_are_callable() {
        assert!(Definition::callable(|_: &mut Container| 1_i32).is_callable());
    }
}
