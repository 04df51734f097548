//! Identifier types for mull.
//!
//! Identifiers are UUID-based so they remain unique without any
//! coordination between threads, and serialize cleanly when embedded
//! in application-level progress reports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a thinker.
///
/// A thinker is a unit of user-supplied background work. Its id is
/// assigned at construction and never changes; the engine keys its
/// registries on it, and every log line about a thinker carries it.
///
/// # UUID Strategy
///
/// Each `ThinkerId` is a random UUID v4: two thinkers constructed from
/// the same body are still distinct units of work.
///
/// # Example
///
/// ```
/// use mull_types::ThinkerId;
///
/// let a = ThinkerId::new();
/// let b = ThinkerId::new();
/// assert_ne!(a, b);
///
/// // The short form is what log lines print.
/// assert_eq!(a.short().len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThinkerId(Uuid);

impl ThinkerId {
    /// Creates a new random `ThinkerId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the first eight hex digits, the form used in log output.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ThinkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ThinkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ThinkerId::new();
        let b = ThinkerId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn short_form_is_eight_hex_digits() {
        let id = ThinkerId::new();
        let short = id.short();
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn display_matches_short() {
        let id = ThinkerId::new();
        assert_eq!(format!("{id}"), id.short());
    }

    #[test]
    fn serde_round_trip() {
        let id = ThinkerId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let back: ThinkerId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, back);
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = std::collections::HashMap::new();
        let id = ThinkerId::new();
        map.insert(id, "runner");
        assert_eq!(map.get(&id), Some(&"runner"));
    }
}
