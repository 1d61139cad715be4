//! Logistics repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every stored item references exactly one event (`event_id NOT NULL`).
//! - Deleting an event cascades to its logistics rows.

use super::{bool_to_int, ensure_connection_ready, parse_bool, parse_decimal};
use super::{RepoError, RepoResult};
use crate::model::event::EventId;
use crate::model::logistics::{Logistics, LogisticsId};
use rusqlite::{params, Connection, Row};

const LOGISTICS_SELECT_SQL: &str = "SELECT
    id,
    event_id,
    description,
    reserved,
    unit_price,
    quantity
FROM logistics";

/// Repository interface for logistics persistence.
pub trait LogisticsRepository {
    /// Loads one item by id.
    fn find_by_id(&self, id: LogisticsId) -> RepoResult<Option<Logistics>>;
    /// Inserts or updates by id and returns the stored item.
    fn save(&self, logistics: &Logistics) -> RepoResult<Logistics>;
}

/// SQLite-backed logistics repository.
pub struct SqliteLogisticsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLogisticsRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl LogisticsRepository for SqliteLogisticsRepository<'_> {
    fn find_by_id(&self, id: LogisticsId) -> RepoResult<Option<Logistics>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOGISTICS_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_logistics_row(row)?));
        }
        Ok(None)
    }

    fn save(&self, logistics: &Logistics) -> RepoResult<Logistics> {
        logistics.validate()?;

        let unit_price = logistics.unit_price.to_string();
        let id = match logistics.id {
            Some(id) => {
                self.conn.execute(
                    "INSERT INTO logistics (id, event_id, description, reserved, unit_price, quantity)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                        event_id = excluded.event_id,
                        description = excluded.description,
                        reserved = excluded.reserved,
                        unit_price = excluded.unit_price,
                        quantity = excluded.quantity,
                        updated_at = (strftime('%s', 'now') * 1000);",
                    params![
                        id,
                        logistics.event_id,
                        logistics.description.as_str(),
                        bool_to_int(logistics.reserved),
                        unit_price,
                        logistics.quantity,
                    ],
                )?;
                id
            }
            None => {
                self.conn.execute(
                    "INSERT INTO logistics (event_id, description, reserved, unit_price, quantity)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        logistics.event_id,
                        logistics.description.as_str(),
                        bool_to_int(logistics.reserved),
                        unit_price,
                        logistics.quantity,
                    ],
                )?;
                self.conn.last_insert_rowid()
            }
        };

        self.find_by_id(id)?.ok_or(RepoError::NotFound {
            entity: "logistics",
            id,
        })
    }
}

/// Loads all items owned by `event_id` in id order.
pub(crate) fn logistics_for_event(conn: &Connection, event_id: EventId) -> RepoResult<Vec<Logistics>> {
    let mut stmt = conn.prepare(&format!(
        "{LOGISTICS_SELECT_SQL} WHERE event_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([event_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_logistics_row(row)?);
    }
    Ok(items)
}

fn parse_logistics_row(row: &Row<'_>) -> RepoResult<Logistics> {
    let unit_price_text: String = row.get("unit_price")?;
    let item = Logistics {
        id: Some(row.get("id")?),
        event_id: Some(row.get("event_id")?),
        description: row.get("description")?,
        reserved: parse_bool(row.get("reserved")?, "logistics.reserved")?,
        unit_price: parse_decimal(&unit_price_text, "logistics.unit_price")?,
        quantity: row.get("quantity")?,
    };
    item.validate()?;
    Ok(item)
}
