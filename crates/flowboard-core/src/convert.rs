// ── Boundary conversions ──
//
// Translate between the typed domain model and the simulator's wire
// types. Anything the remote sends back is validated here; a response
// that cannot be turned into a `WorkItem` is a backend fault.

use flowboard_api::{NewItem, RemoteItem};

use crate::model::{ItemId, Stage, WorkItem};

/// Wire payload for creating `item`.
pub(crate) fn to_new_item(item: &WorkItem) -> NewItem {
    NewItem {
        provisional_id: item.id.to_string(),
        title: item.title.clone(),
        stage: item.stage.as_str().to_owned(),
        created_at: item.created_at,
    }
}

/// Validate a created item returned by the remote.
pub(crate) fn item_from_remote(remote: RemoteItem) -> Result<WorkItem, String> {
    let id = ItemId::from(remote.id);
    if id.is_provisional() || id.as_canonical().is_some_and(str::is_empty) {
        return Err(format!("remote returned a non-canonical id {id}"));
    }
    if remote.title.trim().is_empty() {
        return Err(format!("remote returned an empty title for {id}"));
    }
    let stage: Stage = remote
        .stage
        .parse()
        .map_err(|_| format!("remote returned unknown stage '{}'", remote.stage))?;

    Ok(WorkItem {
        id,
        title: remote.title,
        stage,
        created_at: remote.created_at,
    })
}
