//! Logistics item domain model.
//!
//! # Invariants
//! - `unit_price` is never negative.
//! - A persisted item always has an owning event (`event_id`).
//! - Only `reserved` items count toward event cost and date-range queries.

use super::event::EventId;
use super::ModelValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Storage key of a logistics item.
pub type LogisticsId = i64;

/// A priced resource (room, catering, equipment...) booked for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logistics {
    /// Assigned by storage on first save.
    pub id: Option<LogisticsId>,
    /// Owning event. Set by the service when the item is attached.
    pub event_id: Option<EventId>,
    #[serde(default)]
    pub description: String,
    /// Confirmed items only are billed.
    pub reserved: bool,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl Logistics {
    /// Creates an unsaved, unattached item.
    pub fn new(
        description: impl Into<String>,
        reserved: bool,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: None,
            event_id: None,
            description: description.into(),
            reserved,
            unit_price,
            quantity,
        }
    }

    /// `unit_price * quantity`, regardless of reservation state.
    ///
    /// Fails with `AmountOverflow` when the product exceeds `Decimal` range.
    pub fn line_total(&self) -> Result<Decimal, ModelValidationError> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(ModelValidationError::AmountOverflow("line_total"))
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.unit_price < Decimal::ZERO {
            return Err(ModelValidationError::NegativeAmount("unit_price"));
        }
        if self.event_id.is_none() {
            return Err(ModelValidationError::MissingOwner);
        }
        Ok(())
    }
}

/// Sums `line_total` over reserved items; zero when none are reserved.
pub fn reserved_cost<'a>(
    items: impl IntoIterator<Item = &'a Logistics>,
) -> Result<Decimal, ModelValidationError> {
    items
        .into_iter()
        .filter(|item| item.reserved)
        .try_fold(Decimal::ZERO, |total, item| {
            total
                .checked_add(item.line_total()?)
                .ok_or(ModelValidationError::AmountOverflow("cost"))
        })
}

#[cfg(test)]
mod tests {
    use super::{reserved_cost, Logistics};
    use crate::model::ModelValidationError;
    use rust_decimal::Decimal;

    #[test]
    fn reserved_cost_ignores_unreserved_items() {
        let items = vec![
            Logistics::new("chairs", true, Decimal::new(50, 0), 10),
            Logistics::new("stage", false, Decimal::new(1000, 0), 1),
        ];
        assert_eq!(reserved_cost(&items), Ok(Decimal::new(500, 0)));
    }

    #[test]
    fn reserved_cost_of_nothing_is_zero() {
        assert_eq!(reserved_cost(&Vec::<Logistics>::new()), Ok(Decimal::ZERO));
    }

    #[test]
    fn line_total_keeps_decimal_precision() {
        let item = Logistics::new("coffee", true, Decimal::new(1_25, 2), 3);
        assert_eq!(item.line_total(), Ok(Decimal::new(3_75, 2)));
    }

    #[test]
    fn line_total_reports_overflow_instead_of_panicking() {
        let huge = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
        let item = Logistics::new("stadium", true, huge, 1_000_000_000);
        assert_eq!(
            item.line_total(),
            Err(ModelValidationError::AmountOverflow("line_total"))
        );
    }

    #[test]
    fn reserved_cost_reports_overflow_of_the_sum() {
        let item = Logistics::new("stadium", true, Decimal::MAX, 1);
        assert_eq!(
            reserved_cost(&[item.clone(), item]),
            Err(ModelValidationError::AmountOverflow("cost"))
        );
    }

    #[test]
    fn validate_requires_owner_and_non_negative_price() {
        let mut item = Logistics::new("projector", true, Decimal::new(-1, 0), 1);
        item.event_id = Some(1);
        assert_eq!(
            item.validate(),
            Err(ModelValidationError::NegativeAmount("unit_price"))
        );

        let orphan = Logistics::new("projector", true, Decimal::ONE, 1);
        assert_eq!(orphan.validate(), Err(ModelValidationError::MissingOwner));
    }
}
