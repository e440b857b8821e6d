//! Edit Session Demonstration
//!
//! This example walks an `EditSession` through a small planner document.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Key concepts illustrated:
//! 1. Command-based edits with undo/redo
//! 2. Removing a task clears the calendar entries pointing at it
//! 3. UI-only changes replaying alongside the edit they follow
//! 4. Stacked edits undone in one step
//! 5. Redo-tail truncation

use reedit_core::logging_facility::{init, Profile};
use reedit_core::ops::item_ops;
use reedit_core::{AttrValue, Command, EditSession, EngineConfig, ItemKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== Reedit Session Demo ===\n");

    let mut session = EditSession::new(EngineConfig::default());
    let root = session.document().tree().root();

    // ===== Part 1: Building the tree through commands =====
    println!("## Part 1: Commands\n");

    let tasks = session
        .execute(Command::InsertNewItem {
            parent: root,
            index: 0,
            kind: ItemKind::Category,
            name: "Tasks".to_string(),
        })?
        .expect("insert returns the new item");
    let report = session
        .execute(Command::InsertNewItem {
            parent: tasks,
            index: 0,
            kind: ItemKind::Task,
            name: "Write report".to_string(),
        })?
        .expect("insert returns the new item");
    let review = session
        .execute(Command::InsertNewItem {
            parent: tasks,
            index: 1,
            kind: ItemKind::Task,
            name: "Review".to_string(),
        })?
        .expect("insert returns the new item");
    println!("✓ Inserted Tasks, 'Write report' and 'Review'");

    session.execute(Command::SetAttributes {
        item: report,
        attrs: vec![("status".to_string(), Some(AttrValue::from("Done")))],
    })?;
    println!("✓ Marked 'Write report' done");

    session.undo()?;
    assert_eq!(session.document().attribute(report, "status")?, None);
    println!("✓ Undo cleared the status again");

    session.redo()?;
    println!("✓ Redo restored it\n");

    // ===== Part 2: Cascading removal =====
    println!("## Part 2: Cascades\n");

    let calendar = session
        .execute(Command::InsertNewItem {
            parent: root,
            index: 1,
            kind: ItemKind::Category,
            name: "Calendar".to_string(),
        })?
        .expect("insert returns the new item");
    let mut slots = Vec::new();
    for index in 0..2 {
        let slot = session
            .execute(Command::InsertNewItem {
                parent: calendar,
                index,
                kind: ItemKind::ScheduledItem,
                name: format!("Slot {}", index + 1),
            })?
            .expect("insert returns the new item");
        session.execute(Command::LinkReference {
            dependent: slot,
            ref_name: "task".to_string(),
            host: report,
        })?;
        slots.push(slot);
    }
    println!(
        "'Write report' has {} scheduled slots",
        session.document().cascades().dependents_of(report).len()
    );

    session.execute(Command::RemoveItem { item: report })?;
    let cleared = slots
        .iter()
        .filter(|slot| matches!(session.document().attribute(**slot, "task"), Ok(None)))
        .count();
    println!("✓ Removed 'Write report'; {} slot references cleared", cleared);

    session.undo()?;
    assert!(session.document().tree().is_attached(report)?);
    println!("✓ One undo restored the task and both references\n");

    // ===== Part 3: UI-state replay =====
    println!("## Part 3: UI state\n");

    session.execute(Command::SetUiState {
        key: "tab".to_string(),
        value: Some(AttrValue::from("calendar")),
    })?;
    session.execute(Command::RetypeItem {
        item: review,
        kind: ItemKind::Category,
    })?;
    println!("✓ Switched tab, then converted 'Review' to a category");

    session.undo()?;
    session.undo()?;
    println!(
        "After two undos the tab is {:?}",
        session.document().ui_value("tab")
    );
    session.redo()?;
    session.redo()?;
    println!(
        "After two redos the tab is {:?}\n",
        session.document().ui_value("tab")
    );

    // ===== Part 4: Stacked reorders =====
    println!("## Part 4: Stacking\n");

    for index in [0, 1, 0] {
        let edit = item_ops::move_item(session.document(), review, tasks, index)?
            .with_stack_key("drag:tasks");
        session.register(edit)?;
    }
    let cursor = session.log().cursor();
    session.undo()?;
    println!(
        "✓ Three drags undone at once (cursor {} -> {})\n",
        cursor,
        session.log().cursor()
    );

    // ===== Part 5: Truncation =====
    println!("## Part 5: Truncation\n");

    session.undo()?;
    println!("Redo available: {:?}", session.log().redo_name());
    session.execute(Command::SetAttributes {
        item: review,
        attrs: vec![("priority".to_string(), Some(AttrValue::Int(1)))],
    })?;
    println!("Redo after a new edit: {:?}", session.log().redo_name());

    print!("{}", session.log().render_text(true));
    Ok(())
}
