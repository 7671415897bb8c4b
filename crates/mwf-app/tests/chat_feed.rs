//! Chat feed integration tests through `AppCore`.

use mwf_app::{AppConfig, AppCore, ChatMessage};

fn msg(sequence: u64, author: &str, text: &str) -> ChatMessage {
    ChatMessage::new(sequence, author, text)
}

#[test]
fn test_growing_feed_moves_scroll_anchor() {
    let app = AppCore::offline(AppConfig::default()).unwrap();
    let mut sub = app.subscribe_chat();

    assert!(app.apply_chat_snapshot(vec![msg(1, "Bob", "hi"), msg(2, "Alice", "hey")]));
    let view = sub.poll().unwrap();
    let order: Vec<_> = view.entries.iter().map(|m| m.sequence).collect();
    assert_eq!(order, vec![1, 2]);
    assert_eq!(view.scroll_anchor, Some(2));
    assert_eq!(view.new_since_last, 2);

    assert!(app.apply_chat_snapshot(vec![
        msg(1, "Bob", "hi"),
        msg(2, "Alice", "hey"),
        msg(3, "Bob", "yo"),
    ]));
    let view = sub.poll().unwrap();
    assert_eq!(view.entries.len(), 3);
    assert_eq!(view.entries[2].text, "yo");
    assert_eq!(view.scroll_anchor, Some(3));
    assert_eq!(view.new_since_last, 1);
}

#[test]
fn test_repeated_snapshot_does_not_notify() {
    let app = AppCore::offline(AppConfig::default()).unwrap();
    let snapshot = vec![msg(1, "Bob", "hi")];
    assert!(app.apply_chat_snapshot(snapshot.clone()));

    let mut sub = app.subscribe_chat();
    assert!(!app.apply_chat_snapshot(snapshot));
    assert!(!sub.has_changed());
}

#[test]
fn test_wire_triples_decode() {
    let raw = r#"[[1,"Bob","hi"],[2,"Alice","hey"],[2,"Alice","dup"]]"#;
    let messages: Vec<ChatMessage> = serde_json::from_str(raw).unwrap();

    let app = AppCore::offline(AppConfig::default()).unwrap();
    app.apply_chat_snapshot(messages);

    let view = app.chat();
    assert_eq!(view.entries.len(), 2);
    assert_eq!(view.entries[1].text, "hey");
}
