use rust_decimal::Decimal;
use tracing::warn;

use super::weighted_average;
use crate::error::DomainError;

/// Running position for one batch of operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionState {
    /// Average cost of the held shares; only meaningful while `total_shares > 0`
    pub weighted_average_price: Decimal,
    pub total_shares: i64,
    /// Unrecovered loss available to offset future taxable profit
    pub accumulated_loss: Decimal,
}

impl PositionState {
    pub fn new() -> Self {
        Self {
            weighted_average_price: Decimal::ZERO,
            total_shares: 0,
            accumulated_loss: Decimal::ZERO,
        }
    }

    /// Clear everything carried over from a previous batch
    pub fn reset(&mut self) {
        self.weighted_average_price = Decimal::ZERO;
        self.total_shares = 0;
        self.accumulated_loss = Decimal::ZERO;
    }

    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    /// Add a purchase to the position, re-weighting the average price.
    /// The first purchase into an empty position takes its price as-is.
    /// On overflow the position is left as it was.
    pub fn add_purchase(&mut self, quantity: i64, unit_cost: Decimal) -> Result<(), DomainError> {
        if self.is_empty() {
            self.weighted_average_price = unit_cost;
            self.total_shares = quantity;
            return Ok(());
        }

        let average = weighted_average(
            self.total_shares,
            self.weighted_average_price,
            quantity,
            unit_cost,
        )?;
        self.total_shares = self
            .total_shares
            .checked_add(quantity)
            .ok_or(DomainError::Overflow("share count"))?;
        self.weighted_average_price = average;
        Ok(())
    }

    /// Remove sold shares. The average price is unaffected by sales.
    ///
    /// The share count never drops below zero; selling more than is held
    /// closes the position.
    pub fn remove_shares(&mut self, quantity: i64) -> Result<(), DomainError> {
        if quantity > self.total_shares {
            warn!(
                requested = quantity,
                held = self.total_shares,
                "selling more shares than held, closing position"
            );
        }
        let remaining = self
            .total_shares
            .checked_sub(quantity)
            .ok_or(DomainError::Overflow("share count"))?;
        self.total_shares = remaining.max(0);
        Ok(())
    }

    /// Record a loss for carry-forward
    pub fn record_loss(&mut self, loss: Decimal) -> Result<(), DomainError> {
        if loss <= Decimal::ZERO {
            return Ok(());
        }
        self.accumulated_loss = self
            .accumulated_loss
            .checked_add(loss)
            .ok_or(DomainError::Overflow("accumulated loss"))?;
        Ok(())
    }
}

impl Default for PositionState {
    fn default() -> Self {
        Self::new()
    }
}
