//! Container error types.

use crate::id::ServiceId;
use thiserror::Error;

/// Errors surfaced by container operations.
///
/// Every failure is synchronous and signals a usage mistake at the call
/// site; the container performs no internal recovery or retry.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A lookup or extension referenced an identifier that was never
    /// registered.
    #[error("unknown service identifier: {0}")]
    UnknownIdentifier(ServiceId),

    /// Registration or extension targeted an identifier whose singleton
    /// value is already cached.
    #[error("service {0} is frozen")]
    FrozenService(ServiceId),

    /// A plain value was supplied where a callable definition is required.
    #[error("service definition is not callable")]
    ExpectedCallable,

    /// Extension targeted an identifier whose current definition is not
    /// callable.
    #[error("service identifier {0} does not hold a callable definition")]
    InvalidServiceIdentifier(ServiceId),

    /// Extension targeted a callable registered through `protect`.
    #[error("service {0} is protected")]
    ProtectedService(ServiceId),

    /// A typed accessor asked for a type the stored value does not hold.
    #[error("service {id} is not a {expected}")]
    TypeMismatch {
        /// Identifier the lookup went through.
        id: ServiceId,
        /// Requested Rust type.
        expected: &'static str,
    },
}
