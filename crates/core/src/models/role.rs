//! Role model

use serde::{Deserialize, Serialize};

/// A named permission group, e.g. `Keyward.Backend:Editor`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub identifier: String,
}

impl Role {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }

    /// Part after the last `:`, or the whole identifier
    pub fn name(&self) -> &str {
        match self.identifier.rsplit_once(':') {
            Some((_, name)) => name,
            None => &self.identifier,
        }
    }

    /// Part before the last `:`, if any
    pub fn package_key(&self) -> Option<&str> {
        self.identifier.rsplit_once(':').map(|(package, _)| package)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier)
    }
}
