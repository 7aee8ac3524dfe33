//! Region tracking tests
//!
//! After an update every edit reports where its span ended up.

mod common;

use common::{apply_with_regions, region_text};
use textedit::{EditProcessor, EditRange, EditStyle, Region, StringBuffer, TextEdit};

#[test]
fn test_regions_not_computed_by_default() {
    let mut buffer = StringBuffer::from_text("abcdef");
    let root = TextEdit::multi().with_child(TextEdit::replace(0, 2, "X"));
    let mut processor = EditProcessor::new(&mut buffer, root, EditStyle::CREATE_UNDO);
    processor.perform_edits().unwrap();
    let tree = processor.root().as_tree().unwrap();
    assert_eq!(tree.region(), None);
    assert_eq!(tree.children()[0].region(), None);
}

#[test]
fn test_replaced_text_region() {
    let root = TextEdit::multi()
        .with_child(TextEdit::replace(0, 5, "Hi"))
        .with_child(TextEdit::replace(6, 5, "there"));
    let (edited, tree) = apply_with_regions("Hello World", root);
    assert_eq!(edited, "Hi there");

    let first = tree.children()[0].region().unwrap();
    let second = tree.children()[1].region().unwrap();
    assert_eq!(first, Region::new(0, 2));
    assert_eq!(second, Region::new(3, 5));
    assert_eq!(region_text(&edited, second.offset, second.length), "there");
    assert_eq!(tree.region(), Some(Region::new(0, 8)));
}

#[test]
fn test_deleted_edit_collapses() {
    let root = TextEdit::multi()
        .with_child(TextEdit::delete(2, 3))
        .with_child(TextEdit::marker(6, 2));
    let (edited, tree) = apply_with_regions("0123456789", root);
    assert_eq!(edited, "0156789");

    assert_eq!(tree.children()[0].region(), Some(Region::new(2, 0)));
    let marker = tree.children()[1].region().unwrap();
    assert_eq!(marker, Region::new(3, 2));
    assert_eq!(region_text(&edited, marker.offset, marker.length), "67");
}

#[test]
fn test_insert_region_covers_inserted_text() {
    let root = TextEdit::multi()
        .with_child(TextEdit::insert(0, ">> "))
        .with_child(TextEdit::insert(4, "!"));
    let (edited, tree) = apply_with_regions("line", root);
    assert_eq!(edited, ">> line!");
    assert_eq!(tree.children()[0].region(), Some(Region::new(0, 3)));
    assert_eq!(tree.children()[1].region(), Some(Region::new(7, 1)));
}

#[test]
fn test_move_regions() {
    let root = TextEdit::multi()
        .with_child(TextEdit::move_text(EditRange::new(0, 2), 6))
        .with_child(TextEdit::marker(3, 2));
    let (edited, tree) = apply_with_regions("abcdefgh", root);
    assert_eq!(edited, "cdefabgh");

    let marker = tree.children()[0].region().unwrap();
    assert_eq!(region_text(&edited, marker.offset, marker.length), "de");
    let moved = tree.children()[1].region().unwrap();
    assert_eq!(moved, Region::new(4, 2));
    assert_eq!(region_text(&edited, moved.offset, moved.length), "ab");
}

#[test]
fn test_children_of_replace_are_deleted() {
    let root = TextEdit::replace(0, 5, "done").with_child(TextEdit::marker(1, 2));
    let (edited, tree) = apply_with_regions("hello!", root);
    assert_eq!(edited, "done!");

    assert_eq!(tree.region(), Some(Region::new(0, 4)));
    let marker = &tree.children()[0];
    assert!(marker.is_deleted());
    assert_eq!(marker.region(), None);
}

#[test]
fn test_siblings_of_deleted_subtree_keep_regions() {
    let root = TextEdit::multi()
        .with_child(TextEdit::delete(0, 3).with_child(TextEdit::insert(1, "zz")))
        .with_child(TextEdit::marker(4, 2));
    let (edited, tree) = apply_with_regions("abcdefg", root);
    assert_eq!(edited, "defg");

    assert!(tree.children()[0].children()[0].is_deleted());
    let marker = tree.children()[1].region().unwrap();
    assert_eq!(region_text(&edited, marker.offset, marker.length), "ef");
}

#[test]
fn test_nested_regions_follow_parent() {
    let root = TextEdit::multi()
        .with_child(TextEdit::insert(0, "##"))
        .with_child(
            TextEdit::marker(2, 6)
                .with_child(TextEdit::replace(2, 1, "CCC"))
                .with_child(TextEdit::marker(5, 2)),
        );
    let (edited, tree) = apply_with_regions("abcdefghij", root);
    assert_eq!(edited, "##abCCCdefghij");

    let group = &tree.children()[1];
    let outer = group.region().unwrap();
    assert_eq!(outer, Region::new(4, 8));
    assert_eq!(region_text(&edited, outer.offset, outer.length), "CCCdefgh");

    let inner = group.children()[1].region().unwrap();
    assert_eq!(region_text(&edited, inner.offset, inner.length), "fg");
}
