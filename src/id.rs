//! Service identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// Identifier a service is registered under.
///
/// Most services are registered under a human-readable name. Callers that
/// need collision-free keys (plugins sharing one container, generated
/// registrations) can allocate an opaque [`ServiceId::unique`] symbol
/// instead; a symbol never compares equal to any name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    /// Named identifier, the common case.
    Name(Cow<'static, str>),
    /// Opaque symbol, unique per allocation.
    Symbol(u64),
}

impl ServiceId {
    /// Named identifier.
    pub fn name(name: impl Into<Cow<'static, str>>) -> Self {
        ServiceId::Name(name.into())
    }

    /// Allocate a fresh opaque symbol.
    pub fn unique() -> Self {
        ServiceId::Symbol(NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceId::Name(name) => f.write_str(name),
            ServiceId::Symbol(n) => write!(f, "#{n}"),
        }
    }
}

impl From<&'static str> for ServiceId {
    fn from(name: &'static str) -> Self {
        ServiceId::Name(Cow::Borrowed(name))
    }
}

impl From<String> for ServiceId {
    fn from(name: String) -> Self {
        ServiceId::Name(Cow::Owned(name))
    }
}
