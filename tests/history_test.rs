// Test undo/redo behavior of the editing session end to end

use std::sync::Arc;

use editor_core::{Attrs, Editor, Node, Schema, Selection, Transaction, XmlParser};

fn editor_with(markup: &str) -> Editor {
    Editor::with_markup(
        Arc::new(Schema::default()),
        Box::new(XmlParser::new()),
        markup,
        0,
    )
    .expect("markup should parse")
}

/// Transaction replacing the document with one paragraph of text
fn edit(ed: &Editor, text: &str, cursor: usize) -> Transaction {
    let schema = ed.schema();
    let para = schema
        .node("paragraph", Attrs::new(), vec![Node::text(text, vec![])])
        .unwrap();
    let doc = schema.node("doc", Attrs::new(), vec![para]).unwrap();
    Transaction {
        doc: doc.to_value(),
        selection: Some(Selection::cursor(cursor)),
    }
}

#[test]
fn test_scenario_initial_edit_undo_redo() {
    // Start at <p></p>, captured at init
    let mut ed = editor_with("<p></p>");
    assert_eq!(ed.history().undo_depth(), 1);

    // Edit to <p>Hello</p>; debounce fires on the next tick past the gap
    let tr = edit(&ed, "Hello", 8);
    ed.dispatch(&tr, 100).unwrap();
    ed.tick(500);
    assert_eq!(ed.history().undo_depth(), 2);
    assert_eq!(ed.history().top_markup(), Some("<p>Hello</p>"));

    assert!(ed.undo(600).unwrap());
    ed.tick(601);
    assert_eq!(ed.document().to_html(), "<p></p>");
    assert_eq!(ed.history().undo_depth(), 1);
    assert_eq!(ed.history().redo_depth(), 1);

    assert!(ed.redo(700).unwrap());
    ed.tick(701);
    assert_eq!(ed.document().to_html(), "<p>Hello</p>");
    assert_eq!(ed.history().undo_depth(), 2);
    assert_eq!(ed.history().redo_depth(), 0);
}

#[test]
fn test_undo_redo_are_symmetric() {
    let mut ed = editor_with("<p>one</p>");
    ed.dispatch(&edit(&ed, "two", 5), 100).unwrap();
    ed.tick(500);

    assert!(ed.undo(600).unwrap());
    ed.tick(601);
    assert_eq!(ed.document().to_html(), "<p>one</p>");

    assert!(ed.redo(700).unwrap());
    ed.tick(701);
    assert_eq!(ed.document().to_html(), "<p>two</p>");

    // And back again: the stacks keep swapping cleanly
    assert!(ed.undo(800).unwrap());
    ed.tick(801);
    assert_eq!(ed.document().to_html(), "<p>one</p>");
}

#[test]
fn test_new_edit_after_undo_clears_redo() {
    let mut ed = editor_with("<p></p>");
    ed.dispatch(&edit(&ed, "first", 0), 100).unwrap();
    ed.tick(500);

    assert!(ed.undo(600).unwrap());
    ed.tick(601);
    assert_eq!(ed.history().redo_depth(), 1);

    // A divergent edit invalidates forward history
    ed.dispatch(&edit(&ed, "second", 0), 700).unwrap();
    ed.tick(1100);
    assert_eq!(ed.history().redo_depth(), 0);
    assert_eq!(ed.history().top_markup(), Some("<p>second</p>"));
    assert!(!ed.redo(1200).unwrap());
}

#[test]
fn test_rapid_edits_coalesce_into_one_snapshot() {
    let mut ed = editor_with("<p></p>");
    // Three dispatches inside one debounce gap
    ed.dispatch(&edit(&ed, "H", 3), 100).unwrap();
    ed.dispatch(&edit(&ed, "He", 4), 200).unwrap();
    ed.dispatch(&edit(&ed, "Hey", 5), 300).unwrap();

    // Gap after the first two has not elapsed when they were superseded
    ed.tick(450);
    assert_eq!(ed.history().undo_depth(), 1);

    // Only the final state of the burst is captured
    ed.tick(700);
    assert_eq!(ed.history().undo_depth(), 2);
    assert_eq!(ed.history().top_markup(), Some("<p>Hey</p>"));
}

#[test]
fn test_undo_restores_captured_cursor() {
    let mut ed = editor_with("<p></p>");
    ed.dispatch(&edit(&ed, "Hello", 7), 100).unwrap();
    ed.tick(500);
    ed.dispatch(&edit(&ed, "Hello world", 13), 1000).unwrap();
    ed.tick(1500);

    assert!(ed.undo(2000).unwrap());
    ed.tick(2001);
    assert_eq!(ed.document().to_html(), "<p>Hello</p>");
    assert_eq!(ed.selection(), Selection::cursor(7));

    assert!(ed.redo(3000).unwrap());
    ed.tick(3001);
    assert_eq!(ed.selection(), Selection::cursor(13));
}

#[test]
fn test_restore_never_schedules_a_capture() {
    let mut ed = editor_with("<p></p>");
    ed.dispatch(&edit(&ed, "Hello", 0), 100).unwrap();
    ed.tick(500);

    assert!(ed.undo(600).unwrap());
    ed.tick(601);

    // Plenty of idle time: if the restore had scheduled a capture it
    // would fire here and grow the stack
    ed.tick(10_000);
    assert_eq!(ed.history().undo_depth(), 1);
    assert_eq!(ed.history().redo_depth(), 1);
}

#[test]
fn test_duplicate_content_is_not_recaptured() {
    let mut ed = editor_with("<p>same</p>");
    // Dispatch replaces the document with identical content
    ed.dispatch(&edit(&ed, "same", 0), 100).unwrap();
    ed.tick(500);
    assert_eq!(ed.history().undo_depth(), 1);
}

#[test]
fn test_undo_at_bottom_of_stack_is_noop() {
    let mut ed = editor_with("<p>only</p>");
    assert!(!ed.undo(100).unwrap());
    assert!(!ed.redo(200).unwrap());
    assert_eq!(ed.document().to_html(), "<p>only</p>");
}

#[test]
fn test_selection_stays_in_range_across_restores() {
    let mut ed = editor_with("<p></p>");
    ed.dispatch(&edit(&ed, "a long paragraph", 18), 100).unwrap();
    ed.tick(500);
    ed.dispatch(&edit(&ed, "x", 3), 1000).unwrap();
    ed.tick(1500);

    assert!(ed.undo(2000).unwrap());
    // Before the deferred restore runs, the old cursor is clamped into
    // the restored document rather than left dangling
    assert!(ed.selection().to() <= ed.document().size());
    ed.tick(2001);
    assert_eq!(ed.document().to_html(), "<p>a long paragraph</p>");
    assert_eq!(ed.selection(), Selection::cursor(18));

    assert!(ed.redo(3000).unwrap());
    assert!(ed.selection().to() <= ed.document().size());
    ed.tick(3001);
    assert_eq!(ed.document().to_html(), "<p>x</p>");
    assert_eq!(ed.selection(), Selection::cursor(3));
}
