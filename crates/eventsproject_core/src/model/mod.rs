//! Domain model for participants, events and logistics items.
//!
//! # Responsibility
//! - Define canonical records used by repositories and the event service.
//! - Own entity-level validation shared by write and read paths.
//!
//! # Invariants
//! - Entities are identified by a storage-assigned integer key; `id = None`
//!   means "not saved yet".
//! - Relationships are held as id sets, never as nested object graphs, except
//!   for logistics items which are owned by exactly one event.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event;
pub mod logistics;
pub mod participant;

/// Validation failures for domain entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty after trimming.
    BlankField(&'static str),
    /// Event ends before it starts.
    EndBeforeStart,
    /// A monetary field holds a negative amount.
    NegativeAmount(&'static str),
    /// Logistics item has no owning event.
    MissingOwner,
    /// Cost arithmetic left the representable `Decimal` range.
    AmountOverflow(&'static str),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::EndBeforeStart => write!(f, "event end_date must not be earlier than start_date"),
            Self::NegativeAmount(field) => write!(f, "`{field}` must not be negative"),
            Self::MissingOwner => write!(f, "logistics item must belong to an event"),
            Self::AmountOverflow(field) => write!(f, "`{field}` overflows the decimal range"),
        }
    }
}

impl Error for ModelValidationError {}
