//! Shared icon/component registry transition helpers used by the desktop reducer.

use platform_host::ProcessId;

use crate::model::{
    ComponentId, ComponentRecord, CreateIconRequest, DesktopState, IconId, IconRecord,
};

/// Allocates the next icon id and appends a record for `request`.
pub fn insert_icon(state: &mut DesktopState, request: CreateIconRequest, at_ms: u64) -> IconId {
    let id = IconId(state.next_icon_id);
    state.next_icon_id = state.next_icon_id.saturating_add(1);
    state.icons.push(IconRecord {
        id,
        owner_program_ref: request.owner_program_ref,
        display_name: request.display_name,
        icon_asset_ref: request.icon_asset_ref,
        position: None,
        created_at_unix_ms: at_ms,
        exiting: false,
    });
    id
}

/// Starts an icon's exit transition. Returns whether the icon exists.
pub fn mark_icon_exiting(state: &mut DesktopState, id: IconId) -> bool {
    match state.icon_mut(id) {
        Some(icon) => {
            icon.exiting = true;
            true
        }
        None => false,
    }
}

/// Drops an exit-transitioning icon from the registry.
///
/// Lenient about unknown ids: the finalize timer may fire after a hydrate replaced
/// the registry. Returns whether a record was removed.
pub fn finalize_icon_removal(state: &mut DesktopState, id: IconId) -> bool {
    let before = state.icons.len();
    state.icons.retain(|icon| icon.id != id);
    state.icons.len() != before
}

/// Inserts a component record, indexing it under its owner.
pub fn insert_component(state: &mut DesktopState, record: ComponentRecord) {
    state
        .owner_index
        .entry(record.owner_pid)
        .or_default()
        .insert(record.id.clone());
    state.components.insert(record.id.clone(), record);
}

/// Removes one component, maintaining the owner index.
pub fn remove_component(state: &mut DesktopState, id: &ComponentId) -> Option<ComponentRecord> {
    let record = state.components.remove(id)?;
    if let Some(owned) = state.owner_index.get_mut(&record.owner_pid) {
        owned.remove(id);
        if owned.is_empty() {
            state.owner_index.remove(&record.owner_pid);
        }
    }
    Some(record)
}

/// Removes every non-persistent component owned by `pid` in one pass.
///
/// Returns the removed ids. Persistent components stay registered (and indexed)
/// even though their owner is gone.
pub fn purge_owner_components(state: &mut DesktopState, pid: ProcessId) -> Vec<ComponentId> {
    let Some(owned) = state.owner_index.get(&pid) else {
        return Vec::new();
    };
    let doomed: Vec<ComponentId> = owned
        .iter()
        .filter(|id| {
            state
                .components
                .get(*id)
                .is_some_and(|record| !record.persistent)
        })
        .cloned()
        .collect();
    for id in &doomed {
        remove_component(state, id);
    }
    doomed
}

/// Verifies the owner index and the component table agree; for tests and debugging.
pub fn owner_index_consistent(state: &DesktopState) -> bool {
    let indexed_total: usize = state.owner_index.values().map(|set| set.len()).sum();
    if indexed_total != state.components.len() {
        return false;
    }
    state.owner_index.iter().all(|(pid, owned)| {
        owned.iter().all(|id| {
            state
                .components
                .get(id)
                .is_some_and(|record| record.owner_pid == *pid)
        })
    })
}
