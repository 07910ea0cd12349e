//! Service provider collaborators.

use crate::container::Container;
use crate::error::ContainerError;

/// A bundle of registrations installed as a unit.
///
/// Providers let library authors ship a set of related services that an
/// application wires in with one call. The container invokes
/// [`register`](ServiceProvider::register) exactly once per
/// [`Container::register`] call and then returns itself, so providers
/// chain:
///
/// ```
/// use carton::{Container, ContainerError, Definition, ServiceProvider};
///
/// struct Defaults;
///
/// impl ServiceProvider for Defaults {
///     fn register(&self, container: &mut Container) -> Result<(), ContainerError> {
///         container.set_value("retries", 3_u32)
///     }
/// }
///
/// let mut container = Container::new();
/// container.register(&Defaults)?;
/// assert_eq!(*container.resolve::<u32>("retries")?, 3);
/// # Ok::<(), ContainerError>(())
/// ```
pub trait ServiceProvider {
    /// Register this provider's services into `container`.
    fn register(&self, container: &mut Container) -> Result<(), ContainerError>;
}
