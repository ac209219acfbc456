use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier that addresses one form instance's subtree.
///
/// Randomly generated, not cryptographic. Rendered as `UID_<ulid>` so it is
/// always a valid HTML id and CSS identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(Ulid);

impl ScopeId {
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UID_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_differ() {
        let first = ScopeId::generate();
        let second = ScopeId::generate();
        assert_ne!(first, second);
        assert_ne!(first.to_string(), second.to_string());
    }

    #[test]
    fn display_starts_with_a_letter() {
        let scope = ScopeId::from_ulid(Ulid::from_parts(0, 7));
        let rendered = scope.to_string();
        assert!(rendered.starts_with("UID_"));
        assert_eq!(rendered.len(), 4 + 26);
    }
}
