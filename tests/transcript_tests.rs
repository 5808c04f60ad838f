// Unit tests for transcription turn reconstruction

use sona_meet::session::{Sender, TurnBuffer};

#[test]
fn test_user_only_turn_emits_single_user_item() {
    let mut turn = TurnBuffer::new();
    turn.append_user("hello ");
    turn.append_user("there");

    let items = turn.complete_turn();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].sender, Sender::User);
    assert_eq!(items[0].text, "hello there");
    assert!(items[0].is_final);
    assert!(items[0].id.ends_with("-user"));
}

#[test]
fn test_both_sides_emit_user_before_agent() {
    let mut turn = TurnBuffer::new();
    turn.append_agent("Sure, ");
    turn.append_user("what time is it?");
    turn.append_agent("it's noon.");

    let items = turn.complete_turn();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].sender, Sender::User);
    assert_eq!(items[0].text, "what time is it?");
    assert_eq!(items[1].sender, Sender::Agent);
    assert_eq!(items[1].text, "Sure, it's noon.");
}

#[test]
fn test_whitespace_only_accumulator_is_suppressed() {
    let mut turn = TurnBuffer::new();
    turn.append_user("   \n\t ");
    turn.append_agent("An actual reply");

    let items = turn.complete_turn();

    assert_eq!(items.len(), 1, "whitespace-only side must emit nothing");
    assert_eq!(items[0].sender, Sender::Agent);
}

#[test]
fn test_empty_turn_emits_nothing() {
    let mut turn = TurnBuffer::new();
    assert!(turn.complete_turn().is_empty());
}

#[test]
fn test_buffers_reset_after_flush() {
    let mut turn = TurnBuffer::new();
    turn.append_user("first turn");
    let first = turn.complete_turn();
    assert_eq!(first.len(), 1);
    assert!(turn.is_empty());

    // A second completion with no new fragments emits nothing.
    assert!(turn.complete_turn().is_empty());

    turn.append_agent("second turn");
    let second = turn.complete_turn();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].sender, Sender::Agent);
    assert_eq!(second[0].text, "second turn");
}
