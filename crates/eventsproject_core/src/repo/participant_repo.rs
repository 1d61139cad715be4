//! Participant repository contract and SQLite implementation.
//!
//! # Invariants
//! - `save` links every event in `Participant::events`; existing links are
//!   kept, so a participant saved with an empty set loses nothing.
//! - Loaded participants carry the full link set from `event_participants`.

use super::links::{event_ids_for_participant, link};
use super::{ensure_connection_ready, in_write_transaction, RepoError, RepoResult};
use crate::model::participant::{Participant, ParticipantId, Role};
use rusqlite::{params, Connection, Row};

const PARTICIPANT_SELECT_SQL: &str = "SELECT
    id,
    last_name,
    first_name,
    role
FROM participants";

/// Repository interface for participant persistence.
pub trait ParticipantRepository {
    /// Loads one participant with its linked event ids.
    fn find_by_id(&self, id: ParticipantId) -> RepoResult<Option<Participant>>;
    /// Inserts or updates by id and returns the stored participant.
    fn save(&self, participant: &Participant) -> RepoResult<Participant>;
}

/// SQLite-backed participant repository.
pub struct SqliteParticipantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipantRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParticipantRepository for SqliteParticipantRepository<'_> {
    fn find_by_id(&self, id: ParticipantId) -> RepoResult<Option<Participant>> {
        load_participant(self.conn, id)
    }

    fn save(&self, participant: &Participant) -> RepoResult<Participant> {
        participant.validate()?;

        in_write_transaction(self.conn, |conn| {
            let id = match participant.id {
                Some(id) => {
                    conn.execute(
                        "INSERT INTO participants (id, last_name, first_name, role)
                         VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(id) DO UPDATE SET
                            last_name = excluded.last_name,
                            first_name = excluded.first_name,
                            role = excluded.role,
                            updated_at = (strftime('%s', 'now') * 1000);",
                        params![
                            id,
                            participant.last_name.as_str(),
                            participant.first_name.as_str(),
                            participant.role.as_str(),
                        ],
                    )?;
                    id
                }
                None => {
                    conn.execute(
                        "INSERT INTO participants (last_name, first_name, role)
                         VALUES (?1, ?2, ?3);",
                        params![
                            participant.last_name.as_str(),
                            participant.first_name.as_str(),
                            participant.role.as_str(),
                        ],
                    )?;
                    conn.last_insert_rowid()
                }
            };

            for event_id in &participant.events {
                link(conn, id, *event_id)?;
            }

            load_participant(conn, id)?.ok_or(RepoError::NotFound {
                entity: "participant",
                id,
            })
        })
    }
}

fn load_participant(conn: &Connection, id: ParticipantId) -> RepoResult<Option<Participant>> {
    let mut stmt = conn.prepare(&format!("{PARTICIPANT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let mut participant = parse_participant_row(row)?;
    participant.events = event_ids_for_participant(conn, id)?;
    Ok(Some(participant))
}

fn parse_participant_row(row: &Row<'_>) -> RepoResult<Participant> {
    let role_text: String = row.get("role")?;
    let role = Role::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in participants.role"))
    })?;

    let mut participant = Participant::new(
        row.get::<_, String>("last_name")?,
        row.get::<_, String>("first_name")?,
        role,
    );
    participant.id = Some(row.get("id")?);
    participant.validate()?;
    Ok(participant)
}
