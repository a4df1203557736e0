use rust_decimal::Decimal;

use super::LossRecording;
use crate::error::DomainError;

/// Outcome of applying the accumulated loss to one sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LossOffset {
    /// Profit left to tax after the offset (never negative)
    pub taxable_profit: Decimal,
    /// Accumulated loss carried forward after this sale
    pub remaining_loss: Decimal,
    /// Part of the accumulated loss consumed by this sale
    pub loss_applied: Decimal,
}

/// Apply an accumulated loss to the profit of a non-exempt sale.
///
/// A losing sale (profit <= 0) leaves nothing to tax. Its loss joins the
/// carry-forward when a loss is already carried, or always under
/// `LossRecording::Always`. A profitable sale consumes as much of the
/// accumulated loss as it can.
pub fn offset_loss(
    profit: Decimal,
    accumulated_loss: Decimal,
    recording: LossRecording,
) -> Result<LossOffset, DomainError> {
    if profit <= Decimal::ZERO {
        let carrying = accumulated_loss > Decimal::ZERO;
        let remaining_loss = if carrying || recording == LossRecording::Always {
            accumulated_loss
                .checked_add(profit.abs())
                .ok_or(DomainError::Overflow("accumulated loss"))?
        } else {
            accumulated_loss
        };
        return Ok(LossOffset {
            taxable_profit: Decimal::ZERO,
            remaining_loss,
            loss_applied: Decimal::ZERO,
        });
    }

    if accumulated_loss <= Decimal::ZERO {
        return Ok(LossOffset {
            taxable_profit: profit,
            remaining_loss: accumulated_loss,
            loss_applied: Decimal::ZERO,
        });
    }

    if profit > accumulated_loss {
        Ok(LossOffset {
            taxable_profit: profit - accumulated_loss,
            remaining_loss: Decimal::ZERO,
            loss_applied: accumulated_loss,
        })
    } else {
        Ok(LossOffset {
            taxable_profit: Decimal::ZERO,
            remaining_loss: accumulated_loss - profit,
            loss_applied: profit,
        })
    }
}
