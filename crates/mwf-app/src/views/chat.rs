//! # Chat View State
//!
//! The chat log is owned by the backend. Each update hands the core a full,
//! already ordered snapshot; the feed replaces its contents wholesale and
//! derives what a scroll view needs: render keys, the scroll anchor and how
//! many entries are new.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Default number of entries kept in the scroll view.
pub const DEFAULT_SCROLLBACK: usize = 500;

/// One chat line.
///
/// On the wire this is a `[sequence, author, text]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u64, String, String)", into = "(u64, String, String)")]
pub struct ChatMessage {
    /// Unique, strictly increasing position in the feed; the render key
    pub sequence: u64,
    /// Author nickname
    pub author: String,
    /// Message body
    pub text: String,
}

impl ChatMessage {
    /// Create a message
    pub fn new(sequence: u64, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sequence,
            author: author.into(),
            text: text.into(),
        }
    }
}

impl From<(u64, String, String)> for ChatMessage {
    fn from((sequence, author, text): (u64, String, String)) -> Self {
        Self {
            sequence,
            author,
            text,
        }
    }
}

impl From<ChatMessage> for (u64, String, String) {
    fn from(msg: ChatMessage) -> Self {
        (msg.sequence, msg.author, msg.text)
    }
}

/// What the chat scroll view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatView {
    /// Entries in display order, unique by sequence
    pub entries: Vec<ChatMessage>,
    /// Sequence the view scrolls to (the latest entry)
    pub scroll_anchor: Option<u64>,
    /// Entries newer than anything in the previous view
    pub new_since_last: usize,
}

/// Chat feed driven by external snapshots.
#[derive(Debug, Clone)]
pub struct ChatFeed {
    view: ChatView,
    scrollback: usize,
    /// Length and hash of the last applied snapshot, for no-op detection
    last_digest: Option<(usize, u64)>,
}

impl Default for ChatFeed {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK)
    }
}

impl ChatFeed {
    /// Create an empty feed keeping at most `scrollback` entries visible.
    pub fn new(scrollback: usize) -> Self {
        Self {
            view: ChatView::default(),
            scrollback: scrollback.max(1),
            last_digest: None,
        }
    }

    /// Current view.
    pub fn view(&self) -> &ChatView {
        &self.view
    }

    /// Replace the feed with `snapshot`.
    ///
    /// Returns `false` (and leaves the view alone) when the snapshot is
    /// identical to the previous one. Duplicate sequences keep their first
    /// occurrence.
    pub fn apply_snapshot(&mut self, snapshot: Vec<ChatMessage>) -> bool {
        let digest = snapshot_digest(&snapshot);
        if self.last_digest == Some(digest) {
            return false;
        }

        let previous_high = self.view.entries.last().map(|m| m.sequence);

        let mut seen = HashSet::with_capacity(snapshot.len());
        let mut entries: Vec<ChatMessage> = snapshot
            .iter()
            .filter(|m| seen.insert(m.sequence))
            .cloned()
            .collect();
        if entries.len() > self.scrollback {
            let excess = entries.len() - self.scrollback;
            entries.drain(..excess);
        }

        let new_since_last = entries
            .iter()
            .filter(|m| previous_high.map_or(true, |high| m.sequence > high))
            .count();

        self.view = ChatView {
            scroll_anchor: entries.last().map(|m| m.sequence),
            new_since_last,
            entries,
        };
        self.last_digest = Some(digest);
        true
    }
}

fn snapshot_digest(snapshot: &[ChatMessage]) -> (usize, u64) {
    let mut hasher = DefaultHasher::new();
    snapshot.hash(&mut hasher);
    (snapshot.len(), hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(seq: u64, author: &str, text: &str) -> ChatMessage {
        ChatMessage::new(seq, author, text)
    }

    #[test]
    fn test_snapshot_sets_scroll_to_latest() {
        let mut feed = ChatFeed::default();
        assert!(feed.apply_snapshot(vec![msg(1, "Bob", "hi"), msg(2, "Alice", "hey")]));
        assert_eq!(feed.view().entries.len(), 2);
        assert_eq!(feed.view().scroll_anchor, Some(2));
        assert_eq!(feed.view().new_since_last, 2);

        assert!(feed.apply_snapshot(vec![
            msg(1, "Bob", "hi"),
            msg(2, "Alice", "hey"),
            msg(3, "Bob", "yo"),
        ]));
        assert_eq!(feed.view().entries.len(), 3);
        assert_eq!(feed.view().scroll_anchor, Some(3));
        assert_eq!(feed.view().new_since_last, 1);
    }

    #[test]
    fn test_identical_snapshot_is_noop() {
        let mut feed = ChatFeed::default();
        let snap = vec![msg(1, "Bob", "hi")];
        assert!(feed.apply_snapshot(snap.clone()));
        assert!(!feed.apply_snapshot(snap));
        assert_eq!(feed.view().new_since_last, 1);
    }

    #[test]
    fn test_edited_message_is_not_a_noop() {
        let mut feed = ChatFeed::default();
        assert!(feed.apply_snapshot(vec![msg(1, "Bob", "hi"), msg(2, "Alice", "hey")]));
        assert!(feed.apply_snapshot(vec![msg(1, "Bob", "hi"), msg(2, "Alice", "hey!")]));
        assert_eq!(feed.view().entries[1].text, "hey!");
        assert_eq!(feed.view().new_since_last, 0);
    }

    #[test]
    fn test_noop_detection_survives_scrollback_trim() {
        let mut feed = ChatFeed::new(2);
        let snap: Vec<_> = (1..=10).map(|i| msg(i, "Bob", "x")).collect();
        assert!(feed.apply_snapshot(snap.clone()));
        assert!(!feed.apply_snapshot(snap));
        assert_eq!(feed.view().entries.len(), 2);
    }

    #[test]
    fn test_duplicate_sequence_keeps_first() {
        let mut feed = ChatFeed::default();
        feed.apply_snapshot(vec![msg(1, "Bob", "first"), msg(1, "Eve", "second")]);
        assert_eq!(feed.view().entries, vec![msg(1, "Bob", "first")]);
    }

    #[test]
    fn test_scrollback_keeps_tail() {
        let mut feed = ChatFeed::new(2);
        feed.apply_snapshot((1..=5).map(|i| msg(i, "Bob", "x")).collect());

        let seqs: Vec<_> = feed.view().entries.iter().map(|m| m.sequence).collect();
        assert_eq!(seqs, vec![4, 5]);
        assert_eq!(feed.view().scroll_anchor, Some(5));
    }

    #[test]
    fn test_empty_snapshot_clears_anchor() {
        let mut feed = ChatFeed::default();
        feed.apply_snapshot(vec![msg(1, "Bob", "hi")]);
        feed.apply_snapshot(Vec::new());
        assert!(feed.view().entries.is_empty());
        assert_eq!(feed.view().scroll_anchor, None);
    }

    #[test]
    fn test_wire_triple() {
        let parsed: Vec<ChatMessage> =
            serde_json::from_str(r#"[[1,"Bob","hi"],[2,"Alice","hey"]]"#).unwrap();
        assert_eq!(parsed[1], msg(2, "Alice", "hey"));
        assert_eq!(
            serde_json::to_string(&parsed[0]).unwrap(),
            r#"[1,"Bob","hi"]"#
        );
    }
}
