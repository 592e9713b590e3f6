#![forbid(unsafe_code)]

//! Host-side persistence scenarios for `ArrayState` (feature
//! `state-persistence`).
//!
//! A host keeps its own storage document, mirrors the sequence into it from
//! the change hook, and restores from it on the next start.

use std::cell::RefCell;
use std::rc::Rc;

use ftui_array_state::persistence::{from_json, to_json};
use ftui_array_state::{ArrayPersistState, ArrayState, ArrayStateOptions, PERSIST_FORMAT};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Tag {
    label: String,
    pinned: bool,
}

fn tag(label: &str) -> Tag {
    Tag {
        label: label.to_string(),
        pinned: false,
    }
}

/// Controller whose every commit is written into a shared storage slot.
fn mirrored(initial: Vec<Tag>) -> (ArrayState<Tag>, Rc<RefCell<Value>>) {
    let storage = Rc::new(RefCell::new(Value::Null));
    let sink = Rc::clone(&storage);
    let state = ArrayState::with_options(
        ArrayStateOptions::new()
            .with_initial_value(initial)
            .with_on_change(move |items: &[Tag]| {
                if let Ok(text) = to_json(items) {
                    *sink.borrow_mut() = serde_json::from_str(&text).unwrap_or(Value::Null);
                }
            }),
    );
    (state, storage)
}

#[test]
fn storage_tracks_every_commit() {
    let (tags, storage) = mirrored(vec![tag("rust")]);
    assert_eq!(*storage.borrow(), Value::Null);

    tags.push([tag("tui")]);
    assert_eq!(
        *storage.borrow(),
        json!({
            "format": PERSIST_FORMAT,
            "items": [
                {"label": "rust", "pinned": false},
                {"label": "tui", "pinned": false}
            ]
        })
    );

    // Suppressed calls leave the stored document alone.
    let before = storage.borrow().clone();
    assert!(!tags.remove(10));
    assert_eq!(*storage.borrow(), before);
}

#[test]
fn restart_restores_stored_sequence() {
    let (tags, storage) = mirrored(Vec::new());
    tags.push([tag("a"), tag("b")]);
    tags.update(
        1,
        Tag {
            pinned: true,
            ..tag("b")
        },
    );
    let stored = storage.borrow().to_string();

    let restarted: ArrayState<Tag> = ArrayState::default();
    assert!(restarted.load_json(&stored).unwrap());
    assert_eq!(restarted.to_vec(), tags.to_vec());
    assert_eq!(restarted.find_index(|t, _| t.pinned), Some(1));
}

#[test]
fn document_written_by_host_is_accepted() {
    let document = json!({"format": 1, "items": [{"label": "x", "pinned": true}]});
    let state: ArrayPersistState<Tag> = serde_json::from_value(document).unwrap();
    assert_eq!(state.format, PERSIST_FORMAT);

    let tags = ArrayState::new([tag("y")]);
    assert!(tags.restore_state(state).unwrap());
    assert_eq!(tags.first().map(|t| t.label), Some("x".to_string()));
}

#[test]
fn future_format_is_rejected_without_side_effects() {
    let (tags, storage) = mirrored(vec![tag("keep")]);
    let before = tags.snapshot();
    let document = json!({"format": PERSIST_FORMAT + 1, "items": []}).to_string();

    assert!(tags.load_json(&document).is_err());
    assert!(from_json::<Tag>(&document).is_err());
    assert!(Rc::ptr_eq(&before, &tags.snapshot()));
    assert_eq!(*storage.borrow(), Value::Null);
}
