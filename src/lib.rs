//! Carton: a keyed dependency-injection service container.
//!
//! A [`Container`] maps [`ServiceId`]s to lazily-instantiated values,
//! factories, and protected callables. Constructors register once;
//! lookups resolve on demand. The first resolution of a singleton caches
//! its result and freezes the entry, so a service observed by one caller
//! can never be silently redefined for the next.
//!
//! ```
//! use carton::{Container, Definition};
//!
//! let mut container = Container::new();
//! container.set_value("greeting", String::from("hello"))?;
//! container.set(
//!     "shout",
//!     Definition::callable(|c: &mut Container| {
//!         let greeting = c.resolve::<String>("greeting").expect("registered above");
//!         greeting.to_uppercase()
//!     }),
//! )?;
//!
//! assert_eq!(*container.resolve::<String>("shout")?, "HELLO");
//! // Resolved once, cached forever: the entry is frozen now.
//! assert!(container.set_value("shout", 1_i32).is_err());
//! # Ok::<(), carton::ContainerError>(())
//! ```
//!
//! Registration flavors:
//!
//! - [`Container::set`] / [`Container::set_value`]: plain values and
//!   singleton constructors.
//! - [`Container::factory`]: constructors re-run on every lookup, never
//!   cached, never frozen.
//! - [`Container::protect`]: constructors that can never be wrapped by
//!   [`Container::extend`].
//! - [`Container::extend`]: decorate a not-yet-resolved definition with a
//!   modifier, preserving factory-ness.
//!
//! The container is single-threaded and synchronous: every operation,
//! including user constructors, runs to completion before state is
//! observed again. Constructors receive `&mut Container` and may reenter
//! it. Hosts embedding a container in concurrent code serialize access
//! themselves.

#![warn(missing_docs)]

pub mod container;
pub mod definition;
pub mod error;
pub mod id;
pub mod provider;
pub mod tokens;

pub use container::{Container, ContainerStats, ServiceKind};
pub use definition::{Definition, ServiceCallable, ServiceValue};
pub use error::ContainerError;
pub use id::ServiceId;
pub use provider::ServiceProvider;
pub use tokens::TokenRegistry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
