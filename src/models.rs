use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operation kind (buy or sell)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Buy,
    Sell,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Buy => "buy",
            OperationKind::Sell => "sell",
        }
    }
}

impl FromStr for OperationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(OperationKind::Buy),
            "sell" => Ok(OperationKind::Sell),
            _ => Err(()),
        }
    }
}

/// One trade event as it arrives on an input line.
///
/// `unit_cost` is decoded from the JSON literal without passing through `f64`,
/// so `20.01` stays exactly `20.01`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operation")]
    pub kind: OperationKind,
    #[serde(rename = "unit-cost", with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_cost: Decimal,
    pub quantity: i64,
}

impl Operation {
    pub fn buy(unit_cost: Decimal, quantity: i64) -> Self {
        Self {
            kind: OperationKind::Buy,
            unit_cost,
            quantity,
        }
    }

    pub fn sell(unit_cost: Decimal, quantity: i64) -> Self {
        Self {
            kind: OperationKind::Sell,
            unit_cost,
            quantity,
        }
    }

    /// Gross value of the operation (`unit_cost * quantity`), `None` on overflow
    pub fn total_value(&self) -> Option<Decimal> {
        self.unit_cost.checked_mul(Decimal::from(self.quantity))
    }
}

/// Tax owed for a single operation, in input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxResult {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub tax: Decimal,
}

impl TaxResult {
    pub fn new(tax: Decimal) -> Self {
        Self { tax }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_operation_kind_from_str() {
        assert_eq!(OperationKind::from_str("buy"), Ok(OperationKind::Buy));
        assert_eq!(OperationKind::from_str(" SELL "), Ok(OperationKind::Sell));
        assert!(OperationKind::from_str("hold").is_err());
    }

    #[test]
    fn test_total_value() {
        let op = Operation::sell(dec!(20.01), 1000);
        assert_eq!(op.total_value(), Some(dec!(20010)));
    }

    #[test]
    fn test_total_value_overflow() {
        let op = Operation::sell(Decimal::MAX, 2);
        assert_eq!(op.total_value(), None);
    }
}
