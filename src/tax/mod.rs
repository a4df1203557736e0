// Tax module - average cost basis, exemption threshold and loss carry-forward

pub mod calculator;
pub mod loss_carryforward;
pub mod position;

pub use calculator::{OperationOutcome, TaxCalculator};
pub use loss_carryforward::{offset_loss, LossOffset};
pub use position::PositionState;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Tax rate applied to taxable profit (20%)
pub const TAX_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Sales with a gross value up to and including this amount are exempt
pub const EXEMPTION_LIMIT: Decimal = Decimal::from_parts(20000, 0, 0, false, 0);

/// How sells reduce the held share count.
///
/// `AllSells` keeps the position consistent with what was actually sold.
/// `TaxableSellsOnly` leaves the share count untouched on exempt sells and
/// only decrements it on taxable ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SellAccounting {
    #[default]
    AllSells,
    TaxableSellsOnly,
}

impl SellAccounting {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellAccounting::AllSells => "all-sells",
            SellAccounting::TaxableSellsOnly => "taxable-sells-only",
        }
    }
}

impl std::str::FromStr for SellAccounting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all-sells" | "all" => Ok(SellAccounting::AllSells),
            "taxable-sells-only" | "taxable" => Ok(SellAccounting::TaxableSellsOnly),
            other => Err(format!(
                "unknown sell accounting '{}' (expected all-sells or taxable-sells-only)",
                other
            )),
        }
    }
}

/// When a losing non-exempt sale adds to the carried loss.
///
/// `WhileCarrying` only records it when a loss is already being carried, so the
/// first taxable loss of a batch is dropped. `Always` records every such loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LossRecording {
    #[default]
    WhileCarrying,
    Always,
}

impl LossRecording {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossRecording::WhileCarrying => "while-carrying",
            LossRecording::Always => "always",
        }
    }
}

impl std::str::FromStr for LossRecording {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "while-carrying" => Ok(LossRecording::WhileCarrying),
            "always" => Ok(LossRecording::Always),
            other => Err(format!(
                "unknown loss recording '{}' (expected while-carrying or always)",
                other
            )),
        }
    }
}

/// Whether a sale with gross value `sale_value` falls under the exemption
pub fn is_exempt_sale(sale_value: Decimal) -> bool {
    sale_value <= EXEMPTION_LIMIT
}

/// New average price after adding `quantity` shares at `unit_cost` to a
/// position of `held` shares averaging `average`.
///
/// The division is carried at full decimal precision; nothing is rounded here.
pub fn weighted_average(
    held: i64,
    average: Decimal,
    quantity: i64,
    unit_cost: Decimal,
) -> Result<Decimal, DomainError> {
    let total_shares = held
        .checked_add(quantity)
        .ok_or(DomainError::Overflow("share count"))?;
    if held == 0 || total_shares == 0 {
        return Ok(unit_cost);
    }

    let overflow = || DomainError::Overflow("weighted average");
    let held_value = Decimal::from(held).checked_mul(average).ok_or_else(overflow)?;
    let bought_value = Decimal::from(quantity)
        .checked_mul(unit_cost)
        .ok_or_else(overflow)?;
    held_value
        .checked_add(bought_value)
        .and_then(|total| total.checked_div(Decimal::from(total_shares)))
        .ok_or_else(overflow)
}

/// Profit (negative for a loss) of selling `quantity` shares at `unit_cost`
/// against an average cost of `average`
pub fn sale_profit(
    unit_cost: Decimal,
    average: Decimal,
    quantity: i64,
) -> Result<Decimal, DomainError> {
    unit_cost
        .checked_sub(average)
        .and_then(|margin| Decimal::from(quantity).checked_mul(margin))
        .ok_or(DomainError::Overflow("sale profit"))
}

/// Round a tax amount to cents using banker's rounding
pub fn round_tax(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

/// Tax owed on a taxable profit, zero when there is nothing to tax
pub fn tax_on_profit(taxable_profit: Decimal) -> Result<Decimal, DomainError> {
    if taxable_profit <= Decimal::ZERO {
        return Ok(round_tax(Decimal::ZERO));
    }
    taxable_profit
        .checked_mul(TAX_RATE)
        .map(round_tax)
        .ok_or(DomainError::Overflow("tax"))
}
