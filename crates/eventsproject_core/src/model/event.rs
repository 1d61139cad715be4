//! Event domain model.
//!
//! # Invariants
//! - `description` is non-blank and unique across stored events.
//! - `end_date >= start_date`.
//! - `cost` is never negative and is only ever overwritten by a full
//!   recomputation, not accumulated.
//! - `logistics` holds each item id at most once.

use super::logistics::{reserved_cost, Logistics};
use super::participant::ParticipantId;
use super::ModelValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Storage key of an event.
pub type EventId = i64;

/// A dated event with its participants and owned logistics items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Assigned by storage on first save.
    pub id: Option<EventId>,
    /// Also used as a secondary lookup key.
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Derived from reserved logistics; see `recompute_cost`.
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    pub participants: BTreeSet<ParticipantId>,
    /// Items owned by this event, in storage id order when loaded.
    #[serde(default)]
    pub logistics: Vec<Logistics>,
}

impl Event {
    /// Creates an unsaved event with zero cost and no relations.
    pub fn new(description: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: None,
            description: description.into(),
            start_date,
            end_date,
            cost: Decimal::ZERO,
            participants: BTreeSet::new(),
            logistics: Vec::new(),
        }
    }

    /// Links a participant; returns `false` when already linked.
    pub fn add_participant(&mut self, participant_id: ParticipantId) -> bool {
        self.participants.insert(participant_id)
    }

    /// Adds an item with set semantics by id.
    ///
    /// An item with the same id replaces the existing entry. Unsaved items
    /// (`id = None`) are compared by value.
    pub fn attach_logistics(&mut self, item: Logistics) {
        let existing = self.logistics.iter_mut().find(|current| match item.id {
            Some(id) => current.id == Some(id),
            None => **current == item,
        });
        match existing {
            Some(slot) => *slot = item,
            None => self.logistics.push(item),
        }
    }

    /// Iterates over reserved items only.
    pub fn reserved_logistics(&self) -> impl Iterator<Item = &Logistics> {
        self.logistics.iter().filter(|item| item.reserved)
    }

    /// Overwrites `cost` with the reserved logistics total and returns it.
    ///
    /// On overflow `cost` is left untouched.
    pub fn recompute_cost(&mut self) -> Result<Decimal, ModelValidationError> {
        self.cost = reserved_cost(&self.logistics)?;
        Ok(self.cost)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.description.trim().is_empty() {
            return Err(ModelValidationError::BlankField("description"));
        }
        if self.end_date < self.start_date {
            return Err(ModelValidationError::EndBeforeStart);
        }
        if self.cost < Decimal::ZERO {
            return Err(ModelValidationError::NegativeAmount("cost"));
        }
        Ok(())
    }
}
