//! # Game Identity Registry
//!
//! The set of games (sequencers) this client knows about and which one is
//! loaded. The registry is the only authority on the active game; nothing
//! else in the crate may assume a different one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

/// Number of key characters shown in selector labels.
pub const SHORT_KEY_LEN: usize = 16;

/// Label for the empty selection.
pub const NO_SELECTION_LABEL: &str = "No Key";

/// A game session known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameHandle {
    /// Unique sequencer key
    pub public_key: String,
    /// Human readable chain nickname
    pub display_name: String,
}

impl GameHandle {
    /// Create a handle
    pub fn new(public_key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            display_name: display_name.into(),
        }
    }

    /// First [`SHORT_KEY_LEN`] characters of the key.
    pub fn short_key(&self) -> &str {
        match self.public_key.char_indices().nth(SHORT_KEY_LEN) {
            Some((idx, _)) => &self.public_key[..idx],
            None => &self.public_key,
        }
    }

    /// Selector label, e.g. `alice -- 02a1b2c3d4e5f6a7...`.
    pub fn label(&self) -> String {
        format!("{} -- {}...", self.display_name, self.short_key())
    }
}

/// Full registry state pushed by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Every game the backend currently reports
    pub sequencers: Vec<GameHandle>,
    /// Key of the loaded game, if any
    pub loaded: Option<String>,
}

impl RegistrySnapshot {
    /// Build a snapshot from `(public_key, display_name)` pairs.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, String)>,
        loaded: Option<String>,
    ) -> Self {
        Self {
            sequencers: pairs
                .into_iter()
                .map(|(key, name)| GameHandle::new(key, name))
                .collect(),
            loaded,
        }
    }
}

/// Known games plus the active selection.
///
/// Invariant: `active`, when set, is the key of a member of `known`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameIdentityRegistry {
    known: IndexMap<String, GameHandle>,
    active: Option<String>,
}

impl GameIdentityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Queries ─────────────────────────────────────────────

    /// Handles in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &GameHandle> {
        self.known.values()
    }

    /// Look up a handle by key.
    pub fn get(&self, public_key: &str) -> Option<&GameHandle> {
        self.known.get(public_key)
    }

    /// Whether `public_key` is known.
    pub fn contains(&self, public_key: &str) -> bool {
        self.known.contains_key(public_key)
    }

    /// Number of known games.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether no games are known.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Key of the active game.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Handle of the active game.
    pub fn active_handle(&self) -> Option<&GameHandle> {
        self.active.as_deref().and_then(|key| self.known.get(key))
    }

    /// Label for the current selection.
    pub fn selection_label(&self) -> String {
        self.active_handle()
            .map_or_else(|| NO_SELECTION_LABEL.to_string(), GameHandle::label)
    }

    // ─── Mutations ───────────────────────────────────────────

    /// Insert or rename a handle.
    ///
    /// Re-inserting a key keeps its position and takes the new display name.
    /// Returns `true` if anything changed.
    pub fn upsert(&mut self, handle: GameHandle) -> bool {
        match self.known.get_mut(&handle.public_key) {
            Some(existing) if existing.display_name == handle.display_name => false,
            Some(existing) => {
                existing.display_name = handle.display_name;
                true
            }
            None => {
                self.known.insert(handle.public_key.clone(), handle);
                true
            }
        }
    }

    /// Set or clear the active game.
    ///
    /// `None` and `Some("")` both clear. Any other key must be known,
    /// otherwise [`AppError::UnknownHandle`] is returned and `active` is left
    /// untouched.
    pub fn set_active(&mut self, public_key: Option<&str>) -> Result<(), AppError> {
        match public_key {
            None | Some("") => {
                self.active = None;
                Ok(())
            }
            Some(key) if self.known.contains_key(key) => {
                self.active = Some(key.to_string());
                Ok(())
            }
            Some(key) => Err(AppError::unknown_handle(key)),
        }
    }

    /// Clear the selection. Returns `true` if a game was selected.
    pub fn clear_active(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Reconcile with a backend snapshot.
    ///
    /// Members still reported keep their position, new members are appended
    /// in snapshot order, and members the backend dropped are removed. A
    /// loaded key that does not resolve clears the selection.
    pub fn apply_snapshot(&mut self, snapshot: RegistrySnapshot) {
        let RegistrySnapshot { sequencers, loaded } = snapshot;

        let reported: IndexMap<String, GameHandle> = sequencers
            .into_iter()
            .map(|h| (h.public_key.clone(), h))
            .collect();
        self.known.retain(|key, _| reported.contains_key(key));
        for (_, handle) in reported {
            self.upsert(handle);
        }

        let loaded = loaded.filter(|key| !key.is_empty());
        self.active = match loaded {
            Some(key) if self.known.contains_key(&key) => Some(key),
            Some(key) => {
                debug!(public_key = %key, "loaded game missing from snapshot; clearing selection");
                None
            }
            None => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(key: &str, name: &str) -> GameHandle {
        GameHandle::new(key, name)
    }

    #[test]
    fn test_upsert_keeps_insertion_order() {
        let mut reg = GameIdentityRegistry::new();
        reg.upsert(handle("b", "bob"));
        reg.upsert(handle("a", "alice"));
        reg.upsert(handle("c", "carol"));

        let keys: Vec<_> = reg.list().map(|h| h.public_key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_upsert_renames_in_place() {
        let mut reg = GameIdentityRegistry::new();
        reg.upsert(handle("a", "alice"));
        reg.upsert(handle("b", "bob"));

        assert!(reg.upsert(handle("a", "alice-2")));
        assert!(!reg.upsert(handle("a", "alice-2")));

        let names: Vec<_> = reg.list().map(|h| h.display_name.as_str()).collect();
        assert_eq!(names, vec!["alice-2", "bob"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_set_active_unknown_leaves_selection() {
        let mut reg = GameIdentityRegistry::new();
        reg.upsert(handle("a", "alice"));
        reg.set_active(Some("a")).unwrap();

        let err = reg.set_active(Some("zzz")).unwrap_err();
        assert_eq!(err, AppError::unknown_handle("zzz"));
        assert_eq!(reg.active(), Some("a"));
    }

    #[test]
    fn test_set_active_empty_clears() {
        let mut reg = GameIdentityRegistry::new();
        reg.upsert(handle("a", "alice"));
        reg.set_active(Some("a")).unwrap();

        reg.set_active(Some("")).unwrap();
        assert_eq!(reg.active(), None);
        assert_eq!(reg.selection_label(), NO_SELECTION_LABEL);
    }

    #[test]
    fn test_snapshot_clears_stale_active() {
        let mut reg = GameIdentityRegistry::new();
        reg.apply_snapshot(RegistrySnapshot::from_pairs(
            [("a".to_string(), "alice".to_string())],
            Some("gone".to_string()),
        ));
        assert_eq!(reg.active(), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_snapshot_preserves_existing_order() {
        let mut reg = GameIdentityRegistry::new();
        reg.upsert(handle("a", "alice"));
        reg.upsert(handle("b", "bob"));
        reg.upsert(handle("c", "carol"));

        reg.apply_snapshot(RegistrySnapshot {
            sequencers: vec![handle("d", "dave"), handle("c", "carol"), handle("a", "al")],
            loaded: Some("c".to_string()),
        });

        let keys: Vec<_> = reg.list().map(|h| h.public_key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c", "d"]);
        assert_eq!(reg.get("a").map(|h| h.display_name.as_str()), Some("al"));
        assert_eq!(reg.active(), Some("c"));
    }

    #[test]
    fn test_label_truncates_key() {
        let h = handle("0123456789abcdef0123456789", "alice");
        assert_eq!(h.short_key(), "0123456789abcdef");
        assert_eq!(h.label(), "alice -- 0123456789abcdef...");

        let short = handle("abc", "bob");
        assert_eq!(short.short_key(), "abc");
    }
}
