//! Event repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist event rows and the participant links held by `Event::participants`.
//! - Provide the lookups the event service needs: by description, by start
//!   date range, and by linked participant name/role.
//!
//! # Invariants
//! - Loaded events carry their full participant link set and all owned
//!   logistics items.
//! - Logistics rows are written by `LogisticsRepository`, never by `save`.
//! - Range and participant queries are ordered by `start_date ASC, id ASC`.

use super::links::{link, participant_ids_for_event};
use super::logistics_repo::logistics_for_event;
use super::{ensure_connection_ready, in_write_transaction, parse_decimal};
use super::{RepoError, RepoResult};
use crate::model::event::{Event, EventId};
use crate::model::participant::Role;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    description,
    start_date,
    end_date,
    cost
FROM events";

/// Repository interface for event persistence and queries.
pub trait EventRepository {
    /// Loads one event with participants and logistics.
    fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>>;
    /// Inserts or updates by id, links listed participants, returns the
    /// stored event.
    fn save(&self, event: &Event) -> RepoResult<Event>;
    /// Exact-match lookup on the unique description.
    fn find_by_description(&self, description: &str) -> RepoResult<Option<Event>>;
    /// Events whose start date lies in `[start, end]`, inclusive.
    fn find_by_start_date_between(&self, start: NaiveDate, end: NaiveDate)
        -> RepoResult<Vec<Event>>;
    /// Events linked to at least one participant with the given name and role.
    fn find_by_participant_name_and_role(
        &self,
        last_name: &str,
        first_name: &str,
        role: Role,
    ) -> RepoResult<Vec<Event>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>> {
        load_event(self.conn, id)
    }

    fn save(&self, event: &Event) -> RepoResult<Event> {
        event.validate()?;

        in_write_transaction(self.conn, |conn| {
            let cost = event.cost.to_string();
            let id = match event.id {
                Some(id) => {
                    conn.execute(
                        "INSERT INTO events (id, description, start_date, end_date, cost)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT(id) DO UPDATE SET
                            description = excluded.description,
                            start_date = excluded.start_date,
                            end_date = excluded.end_date,
                            cost = excluded.cost,
                            updated_at = (strftime('%s', 'now') * 1000);",
                        params![
                            id,
                            event.description.as_str(),
                            event.start_date,
                            event.end_date,
                            cost,
                        ],
                    )?;
                    id
                }
                None => {
                    conn.execute(
                        "INSERT INTO events (description, start_date, end_date, cost)
                         VALUES (?1, ?2, ?3, ?4);",
                        params![
                            event.description.as_str(),
                            event.start_date,
                            event.end_date,
                            cost,
                        ],
                    )?;
                    conn.last_insert_rowid()
                }
            };

            for participant_id in &event.participants {
                link(conn, *participant_id, id)?;
            }

            load_event(conn, id)?.ok_or(RepoError::NotFound {
                entity: "event",
                id,
            })
        })
    }

    fn find_by_description(&self, description: &str) -> RepoResult<Option<Event>> {
        let id: Option<EventId> = self
            .conn
            .query_row(
                "SELECT id FROM events WHERE description = ?1;",
                [description],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(id) => load_event(self.conn, id),
            None => Ok(None),
        }
    }

    fn find_by_start_date_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id
             FROM events
             WHERE start_date BETWEEN ?1 AND ?2
             ORDER BY start_date ASC, id ASC;",
        )?;
        let ids = collect_ids(stmt.query(params![start, end])?)?;
        load_events(self.conn, ids)
    }

    fn find_by_participant_name_and_role(
        &self,
        last_name: &str,
        first_name: &str,
        role: Role,
    ) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT e.id, e.start_date
             FROM events e
             INNER JOIN event_participants ep ON ep.event_id = e.id
             INNER JOIN participants p ON p.id = ep.participant_id
             WHERE p.last_name = ?1
               AND p.first_name = ?2
               AND p.role = ?3
             ORDER BY e.start_date ASC, e.id ASC;",
        )?;
        let ids = collect_ids(stmt.query(params![last_name, first_name, role.as_str()])?)?;
        load_events(self.conn, ids)
    }
}

fn collect_ids(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<EventId>> {
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

fn load_events(conn: &Connection, ids: Vec<EventId>) -> RepoResult<Vec<Event>> {
    let mut events = Vec::with_capacity(ids.len());
    for id in ids {
        let event = load_event(conn, id)?.ok_or(RepoError::NotFound { entity: "event", id })?;
        events.push(event);
    }
    Ok(events)
}

fn load_event(conn: &Connection, id: EventId) -> RepoResult<Option<Event>> {
    let mut stmt = conn.prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let mut event = parse_event_row(row)?;
    event.participants = participant_ids_for_event(conn, id)?;
    event.logistics = logistics_for_event(conn, id)?;
    Ok(Some(event))
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let cost_text: String = row.get("cost")?;
    let mut event = Event::new(
        row.get::<_, String>("description")?,
        row.get::<_, NaiveDate>("start_date")?,
        row.get::<_, NaiveDate>("end_date")?,
    );
    event.id = Some(row.get("id")?);
    event.cost = parse_decimal(&cost_text, "events.cost")?;
    event.validate()?;
    Ok(event)
}
