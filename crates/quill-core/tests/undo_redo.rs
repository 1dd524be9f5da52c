//! Integration tests for undo history: grouping, coalescing, save points,
//! and interaction with derived state.

use quill_core::Document;

#[test]
fn grouped_replace_and_insert_is_atomic() {
    // The autocomplete shape: remove the typed prefix, insert the full
    // candidate, as one user-visible action.
    let mut doc = Document::new("call mod");
    doc.begin_undo_group();
    doc.delete_chars(5, 3).unwrap();
    doc.insert_string(5, "module").unwrap();
    doc.end_undo_group();
    assert_eq!(doc.text(), "call module");

    assert!(doc.undo().unwrap());
    assert_eq!(doc.text(), "call mod");
    assert!(doc.redo().unwrap());
    assert_eq!(doc.text(), "call module");
}

#[test]
fn nested_groups_collapse_into_one() {
    let mut doc = Document::new("");
    doc.begin_undo_group();
    doc.insert_string(0, "a").unwrap();
    doc.begin_undo_group();
    doc.insert_string(1, "b").unwrap();
    doc.end_undo_group();
    doc.insert_string(2, "c").unwrap();
    doc.end_undo_group();
    assert_eq!(doc.text(), "abc");

    assert!(doc.undo().unwrap());
    assert_eq!(doc.text(), "");
}

#[test]
fn typing_coalesces_until_boundary() {
    let mut doc = Document::new("");
    for (i, ch) in ["f", "o", "o"].iter().enumerate() {
        doc.type_text(i, ch).unwrap();
    }
    // A non-coalescible edit closes the run.
    doc.insert_string(3, "\n").unwrap();
    for (i, ch) in ["b", "a", "r"].iter().enumerate() {
        doc.type_text(4 + i, ch).unwrap();
    }
    assert_eq!(doc.text(), "foo\nbar");

    assert!(doc.undo().unwrap());
    assert_eq!(doc.text(), "foo\n");
    assert!(doc.undo().unwrap());
    assert_eq!(doc.text(), "foo");
    assert!(doc.undo().unwrap());
    assert_eq!(doc.text(), "");
}

#[test]
fn redo_branch_clears_on_new_edit() {
    let mut doc = Document::new("");
    doc.insert_string(0, "one").unwrap();
    doc.insert_string(3, " two").unwrap();
    doc.undo().unwrap();
    assert!(doc.can_redo());

    doc.insert_string(3, " three").unwrap();
    assert!(!doc.can_redo());
    assert_eq!(doc.text(), "one three");

    doc.undo().unwrap();
    doc.undo().unwrap();
    assert_eq!(doc.text(), "");
    assert!(!doc.can_undo());
}

#[test]
fn save_point_survives_undo_redo_cycles() {
    let mut doc = Document::new("base");
    doc.insert_string(4, "!").unwrap();
    doc.mark_save_point();
    doc.insert_string(5, "?").unwrap();
    assert!(!doc.is_clean());

    doc.undo().unwrap();
    assert!(doc.is_clean());
    doc.undo().unwrap();
    assert!(!doc.is_clean());
    doc.redo().unwrap();
    assert!(doc.is_clean());
    doc.redo().unwrap();
    assert!(!doc.is_clean());
}

#[test]
fn save_point_in_cleared_redo_branch_is_unreachable() {
    let mut doc = Document::new("");
    doc.insert_string(0, "a").unwrap();
    doc.insert_string(1, "b").unwrap();
    doc.mark_save_point();
    doc.undo().unwrap();
    // The save point now sits in the redo branch; a fresh edit orphans it.
    doc.insert_string(1, "c").unwrap();
    assert!(!doc.is_clean());
    doc.undo().unwrap();
    assert!(!doc.is_clean());
    doc.redo().unwrap();
    assert!(!doc.is_clean());
}

#[test]
fn undo_restores_line_structure() {
    let mut doc = Document::new("alpha\nbeta\n");
    doc.delete_chars(5, 1).unwrap(); // join the first two lines
    assert_eq!(doc.line_count(), 2);
    doc.undo().unwrap();
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_start(1), 6);
    assert_eq!(doc.text(), "alpha\nbeta\n");
}

#[test]
fn undo_depth_is_bounded() {
    let mut doc = Document::new("");
    // More separate edits than the retained depth.
    for i in 0..1100 {
        doc.insert_string(i.min(doc.len()), "x").unwrap();
    }
    let mut undone = 0;
    while doc.undo().unwrap() {
        undone += 1;
        assert!(undone <= 1000, "history must be bounded");
    }
    assert_eq!(undone, 1000);
    // The oldest edits were evicted and can no longer be undone.
    assert_eq!(doc.len(), 100);
}
