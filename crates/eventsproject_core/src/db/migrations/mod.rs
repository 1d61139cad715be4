//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_event_participants.sql"),
    },
    Migration {
        version: 3,
        sql: include_str!("0003_event_description_unique.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version currently recorded on `conn`.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = current_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }

    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    if let Err(err) = apply_pending(&tx, MIGRATIONS, current) {
        warn!(
            "event=db_migrate module=db status=error from_version={current} failed_version={}",
            err.failed_migration().unwrap_or_default()
        );
        return Err(err);
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={current} to_version={latest}");
    Ok(())
}

fn apply_pending(conn: &Connection, migrations: &[Migration], current: u32) -> DbResult<()> {
    for migration in migrations.iter().filter(|m| m.version > current) {
        conn.execute_batch(migration.sql)
            .and_then(|()| {
                conn.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| DbError::Migration {
                version: migration.version,
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_pending, current_version, Migration, MIGRATIONS};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn failing_step_names_its_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        let broken = [
            MIGRATIONS[0],
            Migration {
                version: 2,
                sql: "CREATE TABLE event_participants (;",
            },
        ];

        let tx = conn.transaction().unwrap();
        let err = apply_pending(&tx, &broken, 0).unwrap_err();
        drop(tx);

        assert!(matches!(err, DbError::Migration { version: 2, .. }));
        assert_eq!(err.failed_migration(), Some(2));
        assert!(err.to_string().starts_with("events schema migration 0002 failed"));
        assert_eq!(current_version(&conn).unwrap(), 0);
    }

    #[test]
    fn versions_are_strictly_increasing() {
        assert!(MIGRATIONS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
    }
}
