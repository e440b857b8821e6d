//! Callback Tests
//!
//! ## Scenarios Covered
//!
//! 1. Log callbacks fire per phase for matching edit kinds only
//! 2. Callbacks observe the document before and after the transition
//! 3. Per-edit callbacks fire after apply and revert, including on redo
//! 4. Removal by id and duplicate-id rejection

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{planner, set_status};
use reedit_core::ops::{attribute_ops, item_ops};
use reedit_core::{AttrValue, CallbackPhase, Command, Document, EditError, EditInfo};

type Seen = Rc<RefCell<Vec<String>>>;

fn recorder(seen: &Seen, tag: &'static str) -> impl FnMut(&EditInfo, &Document) {
    let seen = Rc::clone(seen);
    move |info, _doc| seen.borrow_mut().push(format!("{tag}:{}", info.name()))
}

#[test]
fn test_log_callbacks_fire_for_matching_kind() {
    // GIVEN callbacks on every phase of set_attributes edits
    let mut p = planner();
    let seen: Seen = Rc::default();
    let log = p.session.log_mut();
    for (phase, tag) in [
        (CallbackPhase::PreApply, "pre_apply"),
        (CallbackPhase::PostApply, "post_apply"),
        (CallbackPhase::PreRevert, "pre_revert"),
        (CallbackPhase::PostRevert, "post_revert"),
    ] {
        log
            .register_callback(
                phase,
                attribute_ops::SET_ATTRIBUTES,
                "recorder",
                recorder(&seen, tag),
            )
            .unwrap();
    }

    // WHEN a status edit and a move are committed, then the status edit undone
    p.session.execute(set_status(p.task_x, "Done")).unwrap();
    p.session
        .execute(Command::MoveItem {
            item: p.task_y,
            new_parent: p.root,
            new_index: 0,
        })
        .unwrap();
    p.session.undo().unwrap();
    p.session.undo().unwrap();

    // THEN only the status edit triggered them, in phase order
    assert_eq!(
        *seen.borrow(),
        vec![
            "pre_apply:Edit TaskX",
            "post_apply:Edit TaskX",
            "pre_revert:Edit TaskX",
            "post_revert:Edit TaskX",
        ]
    );
}

#[test]
fn test_callbacks_observe_document_state() {
    // GIVEN callbacks capturing TaskX's status before and after apply
    let mut p = planner();
    let seen: Seen = Rc::default();
    let task_x = p.task_x;
    for phase in [CallbackPhase::PreApply, CallbackPhase::PostApply] {
        let seen = Rc::clone(&seen);
        p.session
            .log_mut()
            .register_callback(
                phase,
                attribute_ops::SET_ATTRIBUTES,
                "status",
                move |_, doc| {
                    let status = doc
                        .attribute(task_x, "status")
                        .ok()
                        .flatten()
                        .and_then(AttrValue::as_text)
                        .unwrap_or("-")
                        .to_string();
                    seen.borrow_mut().push(format!("{phase}:{status}"));
                },
            )
            .unwrap();
    }

    // WHEN status is set
    p.session.execute(set_status(p.task_x, "Done")).unwrap();

    // THEN the pre-apply callback saw the old value and post-apply the new
    assert_eq!(
        *seen.borrow(),
        vec!["pre_apply:NotStarted", "post_apply:Done"]
    );
}

#[test]
fn test_failed_apply_skips_post_callback() {
    // GIVEN pre and post apply callbacks on moves
    let mut p = planner();
    let seen: Seen = Rc::default();
    let log = p.session.log_mut();
    log
        .register_callback(
            CallbackPhase::PreApply,
            item_ops::MOVE_ITEM,
            "r",
            recorder(&seen, "pre"),
        )
        .unwrap();
    log
        .register_callback(
            CallbackPhase::PostApply,
            item_ops::MOVE_ITEM,
            "r",
            recorder(&seen, "post"),
        )
        .unwrap();

    // WHEN a move built earlier no longer applies
    let edit = item_ops::move_item(p.session.document(), p.task_y, p.root, 2).unwrap();
    p.session
        .execute(Command::RemoveItem { item: p.calendar })
        .unwrap();
    let result = p.session.register(edit);

    // THEN only the pre-apply callback ran
    assert!(matches!(result, Err(EditError::IndexOutOfRange { .. })));
    assert_eq!(*seen.borrow(), vec!["pre:Move task"]);
}

#[test]
fn test_edit_callback_fires_on_apply_revert_and_redo() {
    // GIVEN an edit carrying its own callback
    let mut p = planner();
    let seen: Seen = Rc::default();
    let sink = Rc::clone(&seen);
    let edit = attribute_ops::set_attributes(
        p.session.document(),
        p.task_x,
        [("status", Some(AttrValue::from("Done")))],
    )
    .unwrap()
    .with_callback(move |phase, info, _doc| {
        sink.borrow_mut().push(format!("{phase}:{}", info.name()))
    });

    // WHEN registered, undone and redone
    p.session.register(edit).unwrap();
    p.session.undo().unwrap();
    p.session.redo().unwrap();

    // THEN the callback saw each completed transition
    assert_eq!(
        *seen.borrow(),
        vec![
            "post_apply:Edit TaskX",
            "post_revert:Edit TaskX",
            "post_apply:Edit TaskX",
        ]
    );
}

#[test]
fn test_remove_callbacks_by_id() {
    // GIVEN two callbacks under one id and one under another
    let mut p = planner();
    let seen: Seen = Rc::default();
    let log = p.session.log_mut();
    log
        .register_callback(
            CallbackPhase::PostApply,
            attribute_ops::SET_ATTRIBUTES,
            "panel",
            recorder(&seen, "attrs"),
        )
        .unwrap();
    log
        .register_callback(
            CallbackPhase::PostApply,
            item_ops::MOVE_ITEM,
            "panel",
            recorder(&seen, "move"),
        )
        .unwrap();
    log
        .register_callback(
            CallbackPhase::PostApply,
            attribute_ops::SET_ATTRIBUTES,
            "status_bar",
            recorder(&seen, "bar"),
        )
        .unwrap();
    assert_eq!(log.callbacks().len(), 3);

    // WHEN the "panel" id is removed
    let removed = p.session.log_mut().remove_callbacks("panel");

    // THEN only the other subscriber still fires
    assert_eq!(removed, 2);
    p.session.execute(set_status(p.task_x, "Done")).unwrap();
    assert_eq!(*seen.borrow(), vec!["bar:Edit TaskX"]);
}

#[test]
fn test_duplicate_callback_id_rejected() {
    // GIVEN a registered callback
    let mut p = planner();
    let log = p.session.log_mut();
    log.register_callback(CallbackPhase::PostApply, item_ops::MOVE_ITEM, "panel", |_, _| {})
        .unwrap();

    // WHEN the same id is registered again for the same phase and kind
    let result =
        log.register_callback(CallbackPhase::PostApply, item_ops::MOVE_ITEM, "panel", |_, _| {});

    // THEN it is rejected, but another phase is fine
    assert!(matches!(result, Err(EditError::DuplicateCallback { .. })));
    log.register_callback(CallbackPhase::PostRevert, item_ops::MOVE_ITEM, "panel", |_, _| {})
        .unwrap();
    assert_eq!(log.callbacks().len(), 2);
}
