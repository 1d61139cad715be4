//! Participant/event linking rows.
//!
//! Both sides of the many-to-many relation read from and write to
//! `event_participants`, so saving either entity makes a link durable.
//! Links are only ever added here.

use super::RepoResult;
use crate::model::event::EventId;
use crate::model::participant::ParticipantId;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

pub(crate) fn link(
    conn: &Connection,
    participant_id: ParticipantId,
    event_id: EventId,
) -> RepoResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO event_participants (participant_id, event_id)
         VALUES (?1, ?2);",
        params![participant_id, event_id],
    )?;
    Ok(())
}

pub(crate) fn participant_ids_for_event(
    conn: &Connection,
    event_id: EventId,
) -> RepoResult<BTreeSet<ParticipantId>> {
    let mut stmt = conn.prepare(
        "SELECT participant_id
         FROM event_participants
         WHERE event_id = ?1;",
    )?;
    let mut rows = stmt.query([event_id])?;
    let mut ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        ids.insert(row.get(0)?);
    }
    Ok(ids)
}

pub(crate) fn event_ids_for_participant(
    conn: &Connection,
    participant_id: ParticipantId,
) -> RepoResult<BTreeSet<EventId>> {
    let mut stmt = conn.prepare(
        "SELECT event_id
         FROM event_participants
         WHERE participant_id = ?1;",
    )?;
    let mut rows = stmt.query([participant_id])?;
    let mut ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        ids.insert(row.get(0)?);
    }
    Ok(ids)
}
