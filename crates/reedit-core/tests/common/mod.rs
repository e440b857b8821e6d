use std::collections::{BTreeMap, BTreeSet};

use reedit_core::{AttrValue, Command, Document, EditSession, EngineConfig, ItemId, ItemKind};

/// Handles into the planner fixture
///
/// ```text
/// Root
/// ├── Tasks (Category)
/// │   ├── TaskX (Task, status = NotStarted)
/// │   └── TaskY (Task, status = NotStarted)
/// └── Calendar (Category)
///     ├── Slot1 (ScheduledItem, task -> TaskX)
///     └── Slot2 (ScheduledItem, task -> TaskX)
/// ```
///
/// plus two detached tasks, `spare_a` and `spare_b`, for insertion.
#[allow(dead_code)]
pub struct Planner {
    pub session: EditSession,
    pub root: ItemId,
    pub tasks: ItemId,
    pub task_x: ItemId,
    pub task_y: ItemId,
    pub calendar: ItemId,
    pub slot_1: ItemId,
    pub slot_2: ItemId,
    pub spare_a: ItemId,
    pub spare_b: ItemId,
}

/// Build the planner fixture with the default configuration
#[allow(dead_code)]
pub fn planner() -> Planner {
    planner_with(EngineConfig::default())
}

/// Build the planner fixture; the tree is loaded directly, so the edit
/// log starts empty
#[allow(dead_code)]
pub fn planner_with(config: EngineConfig) -> Planner {
    let mut session = EditSession::new(config);
    let doc = session.document_mut();
    let root = doc.tree().root();

    let tasks = load(doc, root, ItemKind::Category, "Tasks");
    let task_x = load(doc, tasks, ItemKind::Task, "TaskX");
    let task_y = load(doc, tasks, ItemKind::Task, "TaskY");
    let calendar = load(doc, root, ItemKind::Category, "Calendar");
    let slot_1 = load(doc, calendar, ItemKind::ScheduledItem, "Slot1");
    let slot_2 = load(doc, calendar, ItemKind::ScheduledItem, "Slot2");

    for task in [task_x, task_y] {
        doc.write_attribute(task, "status", Some("NotStarted".into()))
            .unwrap();
    }
    for slot in [slot_1, slot_2] {
        doc.write_attribute(slot, "task", Some(AttrValue::Ref(task_x)))
            .unwrap();
    }

    let spare_a = doc.create_item(ItemKind::Task, "SpareA").unwrap();
    let spare_b = doc.create_item(ItemKind::Task, "SpareB").unwrap();

    Planner {
        session,
        root,
        tasks,
        task_x,
        task_y,
        calendar,
        slot_1,
        slot_2,
        spare_a,
        spare_b,
    }
}

/// Create an item and append it under `parent` without recording an edit
#[allow(dead_code)]
pub fn load(doc: &mut Document, parent: ItemId, kind: ItemKind, name: &str) -> ItemId {
    let item = doc.create_item(kind, name).unwrap();
    let index = doc.tree().get(parent).unwrap().children().len();
    doc.tree_mut().add_child(parent, item, index).unwrap();
    item
}

#[allow(dead_code)]
pub fn set_status(item: ItemId, status: &str) -> Command {
    Command::SetAttributes {
        item,
        attrs: vec![("status".to_string(), Some(AttrValue::from(status)))],
    }
}

#[allow(dead_code)]
pub fn set_ui(key: &str, value: &str) -> Command {
    Command::SetUiState {
        key: key.to_string(),
        value: Some(AttrValue::from(value)),
    }
}

#[allow(dead_code)]
pub fn status(session: &EditSession, item: ItemId) -> Option<String> {
    session
        .document()
        .attribute(item, "status")
        .unwrap()
        .and_then(AttrValue::as_text)
        .map(str::to_string)
}

/// One attached item as seen from the root: handle, kind, attributes, children
#[allow(dead_code)]
pub type ItemShape = (ItemId, ItemKind, BTreeMap<String, AttrValue>, Vec<ItemId>);

/// Everything observable through the root plus UI state
///
/// Detached items are left out, so shapes compare equal across arena
/// reclamation.
#[allow(dead_code)]
pub fn shape(doc: &Document) -> (Vec<ItemShape>, BTreeMap<String, AttrValue>) {
    let tree = doc.tree();
    let items = tree
        .subtree(tree.root())
        .unwrap()
        .into_iter()
        .map(|id| {
            let item = tree.get(id).unwrap();
            (
                id,
                item.kind(),
                item.attributes().clone(),
                item.children().to_vec(),
            )
        })
        .collect();
    (items, doc.ui_state().clone())
}

/// Assert the cascade registry mirrors exactly the `Ref` attributes held
/// by live items
#[allow(dead_code)]
pub fn assert_cascades_consistent(doc: &Document) {
    let mut held = BTreeSet::new();
    for item in doc.tree().iter() {
        for (name, value) in item.attributes() {
            if let Some(host) = value.as_ref_target() {
                held.insert((host, item.id(), name.clone()));
            }
        }
    }

    let mut registered = BTreeSet::new();
    for (host, _dependent, _name) in &held {
        for link in doc.cascades().dependents_of(*host) {
            registered.insert((*host, link.dependent, link.ref_name));
        }
    }

    assert_eq!(held, registered, "registry out of step with Ref attributes");
    assert_eq!(doc.cascades().len(), held.len(), "registry holds stale links");
}
