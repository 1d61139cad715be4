//! Participant domain model.
//!
//! # Invariants
//! - `events` holds each event id at most once.
//! - `role` is a closed set; unknown persisted values are rejected on read.

use super::event::EventId;
use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Storage key of a participant.
pub type ParticipantId = i64;

/// Responsibility a participant holds across their events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Runs the event; used by cost recomputation.
    Organizer,
    /// Presents at the event.
    Speaker,
    /// Attends the event.
    Guest,
}

impl Role {
    /// Stable text form used in storage and CLI input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organizer => "ORGANIZER",
            Self::Speaker => "SPEAKER",
            Self::Guest => "GUEST",
        }
    }

    /// Parses the stable text form, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ORGANIZER" => Some(Self::Organizer),
            "SPEAKER" => Some(Self::Speaker),
            "GUEST" => Some(Self::Guest),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person taking part in one or more events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Assigned by storage on first save.
    pub id: Option<ParticipantId>,
    pub last_name: String,
    pub first_name: String,
    pub role: Role,
    /// Events this participant is linked to.
    #[serde(default)]
    pub events: BTreeSet<EventId>,
}

impl Participant {
    /// Creates an unsaved participant with no linked events.
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            role,
            events: BTreeSet::new(),
        }
    }

    /// Links an event; returns `false` when it was already linked.
    pub fn join_event(&mut self, event_id: EventId) -> bool {
        self.events.insert(event_id)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.last_name.trim().is_empty() {
            return Err(ModelValidationError::BlankField("last_name"));
        }
        if self.first_name.trim().is_empty() {
            return Err(ModelValidationError::BlankField("first_name"));
        }
        Ok(())
    }
}
