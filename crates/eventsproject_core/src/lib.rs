//! Core business logic for event organization records.
//! This crate owns the participant/event/logistics invariants and the
//! cost rules between them.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::event::{Event, EventId};
pub use model::logistics::{reserved_cost, Logistics, LogisticsId};
pub use model::participant::{Participant, ParticipantId, Role};
pub use model::ModelValidationError;
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::logistics_repo::{LogisticsRepository, SqliteLogisticsRepository};
pub use repo::participant_repo::{ParticipantRepository, SqliteParticipantRepository};
pub use repo::{RepoError, RepoResult};
pub use service::event_service::{
    EventService, EventServiceError, OrganizerFilter, ServiceResult,
};

/// Event service wired to the SQLite repositories of one connection.
pub type SqliteEventService<'conn> = EventService<
    SqliteParticipantRepository<'conn>,
    SqliteEventRepository<'conn>,
    SqliteLogisticsRepository<'conn>,
>;

/// Builds an event service over a migrated connection.
pub fn sqlite_event_service(conn: &rusqlite::Connection) -> RepoResult<SqliteEventService<'_>> {
    Ok(EventService::new(
        SqliteParticipantRepository::try_new(conn)?,
        SqliteEventRepository::try_new(conn)?,
        SqliteLogisticsRepository::try_new(conn)?,
    ))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
