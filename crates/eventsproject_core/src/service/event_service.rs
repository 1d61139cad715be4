//! Event organization use-case service.
//!
//! # Responsibility
//! - Link participants to events and logistics items to events.
//! - Query reserved logistics by event start date.
//! - Recompute event cost from reserved logistics.
//!
//! # Invariants
//! - The service never bypasses repository validation/persistence contracts.
//! - Repository errors are surfaced unchanged as `EventServiceError::Repo`.
//! - No operation retries; each one is a single read-modify-write pass whose
//!   transaction boundary, if any, belongs to the caller.

use crate::model::event::Event;
use crate::model::logistics::Logistics;
use crate::model::participant::{Participant, ParticipantId, Role};
use crate::model::ModelValidationError;
use crate::repo::event_repo::EventRepository;
use crate::repo::logistics_repo::LogisticsRepository;
use crate::repo::participant_repo::ParticipantRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, EventServiceError>;

/// Errors from event service operations.
#[derive(Debug)]
pub enum EventServiceError {
    /// The explicitly named participant does not exist.
    ParticipantNotFound(ParticipantId),
    /// No event carries the given description.
    EventNotFound { description: String },
    /// Date range with `start > end`.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Derived value could not be computed (e.g. cost overflow); nothing saved.
    Validation(ModelValidationError),
    /// Persistence failure, passed through unchanged.
    Repo(RepoError),
}

impl EventServiceError {
    /// Whether this is one of the not-found kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ParticipantNotFound(_) | Self::EventNotFound { .. }
        )
    }
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParticipantNotFound(id) => write!(f, "participant not found: {id}"),
            Self::EventNotFound { description } => {
                write!(f, "event not found for description `{description}`")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "invalid date range: start {start} is after end {end}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for EventServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Selects the events whose cost gets recomputed: every event linked to a
/// participant with this exact name and role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizerFilter {
    pub last_name: String,
    pub first_name: String,
    pub role: Role,
}

impl OrganizerFilter {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, role: Role) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            role,
        }
    }
}

impl Default for OrganizerFilter {
    /// The historical fixed query: organizer "Ahmed Tounsi".
    fn default() -> Self {
        Self::new("Tounsi", "Ahmed", Role::Organizer)
    }
}

/// Event service facade over the three record stores.
pub struct EventService<P, E, L>
where
    P: ParticipantRepository,
    E: EventRepository,
    L: LogisticsRepository,
{
    participants: P,
    events: E,
    logistics: L,
}

impl<P, E, L> EventService<P, E, L>
where
    P: ParticipantRepository,
    E: EventRepository,
    L: LogisticsRepository,
{
    /// Creates a service using the provided repository implementations.
    pub fn new(participants: P, events: E, logistics: L) -> Self {
        Self {
            participants,
            events,
            logistics,
        }
    }

    /// Persists a new or updated participant unconditionally.
    pub fn add_participant(&self, participant: &Participant) -> ServiceResult<Participant> {
        let saved = self.participants.save(participant)?;
        info!(
            "event=participant_save module=service status=ok participant_id={}",
            saved.id.unwrap_or_default()
        );
        Ok(saved)
    }

    /// Links one existing participant to `event` and persists the event.
    ///
    /// # Contract
    /// - Missing participant fails with `ParticipantNotFound` before any
    ///   write to the event store.
    /// - Linking is idempotent: repeated calls keep one link.
    /// - The event save is the write-of-record for the link.
    pub fn assign_participant(
        &self,
        mut event: Event,
        participant_id: ParticipantId,
    ) -> ServiceResult<Event> {
        if self.participants.find_by_id(participant_id)?.is_none() {
            warn!(
                "event=participant_assign module=service status=error error_code=participant_not_found participant_id={participant_id}"
            );
            return Err(EventServiceError::ParticipantNotFound(participant_id));
        }

        event.add_participant(participant_id);
        let saved = self.events.save(&event)?;
        info!(
            "event=participant_assign module=service status=ok event_id={} participant_id={}",
            saved.id.unwrap_or_default(),
            participant_id
        );
        Ok(saved)
    }

    /// Re-resolves every participant already on `event` and persists the
    /// event once.
    ///
    /// Participants missing from the store are dropped from the event and
    /// skipped; the others stay linked. An event without participants is
    /// still saved.
    pub fn sync_event_participants(&self, mut event: Event) -> ServiceResult<Event> {
        let mut skipped = 0usize;
        for participant_id in event.participants.clone() {
            if self.participants.find_by_id(participant_id)?.is_none() {
                warn!(
                    "event=participant_sync module=service status=skip participant_id={participant_id}"
                );
                event.participants.remove(&participant_id);
                skipped += 1;
            }
        }

        let saved = self.events.save(&event)?;
        info!(
            "event=participant_sync module=service status=ok event_id={} linked={} skipped={}",
            saved.id.unwrap_or_default(),
            saved.participants.len(),
            skipped
        );
        Ok(saved)
    }

    /// Attaches `logistics` to the event with this exact description.
    ///
    /// # Contract
    /// - Unknown description fails with `EventNotFound` and writes nothing.
    /// - The item is saved first (to obtain its id), then the event.
    /// - Returns the stored item, retrievable by id afterwards.
    pub fn attach_logistics(
        &self,
        mut logistics: Logistics,
        event_description: &str,
    ) -> ServiceResult<Logistics> {
        let Some(mut event) = self.events.find_by_description(event_description)? else {
            warn!(
                "event=logistics_attach module=service status=error error_code=event_not_found"
            );
            return Err(EventServiceError::EventNotFound {
                description: event_description.to_string(),
            });
        };

        logistics.event_id = event.id;
        let saved = self.logistics.save(&logistics)?;
        event.attach_logistics(saved.clone());
        let event = self.events.save(&event)?;
        info!(
            "event=logistics_attach module=service status=ok event_id={} logistics_id={} event_logistics={}",
            event.id.unwrap_or_default(),
            saved.id.unwrap_or_default(),
            event.logistics.len()
        );
        Ok(saved)
    }

    /// Reserved logistics of events starting within `[start, end]`.
    ///
    /// Ordered by event start date, then event id, then item id.
    pub fn reserved_logistics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<Logistics>> {
        if start > end {
            return Err(EventServiceError::InvalidRange { start, end });
        }

        let events = self.events.find_by_start_date_between(start, end)?;
        let items: Vec<Logistics> = events
            .iter()
            .flat_map(Event::reserved_logistics)
            .cloned()
            .collect();
        info!(
            "event=logistics_range module=service status=ok start={start} end={end} items={}",
            items.len()
        );
        Ok(items)
    }

    /// Recomputes and persists `cost` for every event matched by `filter`.
    ///
    /// Cost is the sum of `unit_price * quantity` over reserved logistics and
    /// overwrites any previous value, so re-running without data changes is a
    /// no-op on stored costs. Returns the saved events.
    pub fn recompute_costs(&self, filter: &OrganizerFilter) -> ServiceResult<Vec<Event>> {
        let events = self.events.find_by_participant_name_and_role(
            filter.last_name.as_str(),
            filter.first_name.as_str(),
            filter.role,
        )?;

        let mut updated = Vec::with_capacity(events.len());
        for mut event in events {
            if let Err(err) = event.recompute_cost() {
                warn!(
                    "event=cost_recompute module=service status=error event_id={} error={err}",
                    event.id.unwrap_or_default()
                );
                return Err(err.into());
            }
            updated.push(self.events.save(&event)?);
        }

        info!(
            "event=cost_recompute module=service status=ok role={} events={}",
            filter.role,
            updated.len()
        );
        Ok(updated)
    }

    /// `recompute_costs` with `OrganizerFilter::default()`.
    pub fn recompute_default_costs(&self) -> ServiceResult<Vec<Event>> {
        self.recompute_costs(&OrganizerFilter::default())
    }
}
