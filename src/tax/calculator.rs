use rust_decimal::Decimal;
use tracing::debug;

use super::loss_carryforward::offset_loss;
use super::position::PositionState;
use super::{
    is_exempt_sale, round_tax, sale_profit, tax_on_profit, LossRecording, SellAccounting,
};
use crate::error::{CapitalGainsError, DomainError};
use crate::models::{Operation, OperationKind, TaxResult};

/// Tax owed for one operation together with the position right after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub operation: Operation,
    pub tax: Decimal,
    pub position: PositionState,
}

/// Stateful tax calculator for a single position.
///
/// Operations must be applied in input order; each one depends on the position
/// left behind by every earlier operation in the same batch.
#[derive(Debug, Clone, Default)]
pub struct TaxCalculator {
    state: PositionState,
    sell_accounting: SellAccounting,
    loss_recording: LossRecording,
    strict: bool,
}

impl TaxCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(sell_accounting: SellAccounting, strict: bool) -> Self {
        Self {
            state: PositionState::new(),
            sell_accounting,
            loss_recording: LossRecording::default(),
            strict,
        }
    }

    pub fn with_loss_recording(mut self, loss_recording: LossRecording) -> Self {
        self.loss_recording = loss_recording;
        self
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Start a new, independent batch
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Apply one operation to the running position and return the tax it owes.
    ///
    /// Fails when strict validation rejects the operation or when a value
    /// overflows the decimal or share-count range.
    pub fn apply_operation(&mut self, operation: &Operation) -> Result<Decimal, DomainError> {
        if self.strict {
            self.validate(operation)?;
        }

        let tax = match operation.kind {
            OperationKind::Buy => self.handle_buy(operation)?,
            OperationKind::Sell => self.handle_sell(operation)?,
        };

        debug!(
            operation = operation.kind.as_str(),
            unit_cost = %operation.unit_cost,
            quantity = operation.quantity,
            tax = %tax,
            average = %self.state.weighted_average_price,
            shares = self.state.total_shares,
            loss = %self.state.accumulated_loss,
            "applied operation"
        );

        Ok(tax)
    }

    /// Reset, then apply every operation in order
    pub fn calculate_batch(
        &mut self,
        operations: &[Operation],
    ) -> Result<Vec<TaxResult>, CapitalGainsError> {
        self.reset();

        operations
            .iter()
            .enumerate()
            .map(|(index, op)| {
                self.apply_operation(op)
                    .map(TaxResult::new)
                    .map_err(|source| CapitalGainsError::Domain { index, source })
            })
            .collect()
    }

    /// Like `calculate_batch`, keeping a snapshot of the position after each operation
    pub fn calculate_batch_detailed(
        &mut self,
        operations: &[Operation],
    ) -> Result<Vec<OperationOutcome>, CapitalGainsError> {
        self.reset();

        let mut outcomes = Vec::with_capacity(operations.len());
        for (index, op) in operations.iter().enumerate() {
            let tax = self
                .apply_operation(op)
                .map_err(|source| CapitalGainsError::Domain { index, source })?;
            outcomes.push(OperationOutcome {
                operation: op.clone(),
                tax,
                position: self.state,
            });
        }

        Ok(outcomes)
    }

    fn validate(&self, operation: &Operation) -> Result<(), DomainError> {
        if operation.quantity < 0 {
            return Err(DomainError::NegativeQuantity(operation.quantity));
        }
        if operation.unit_cost < Decimal::ZERO {
            return Err(DomainError::NegativeUnitCost(operation.unit_cost));
        }
        if operation.kind == OperationKind::Sell && operation.quantity > self.state.total_shares {
            return Err(DomainError::InsufficientShares {
                requested: operation.quantity,
                held: self.state.total_shares,
            });
        }
        Ok(())
    }

    fn handle_buy(&mut self, operation: &Operation) -> Result<Decimal, DomainError> {
        self.state.add_purchase(operation.quantity, operation.unit_cost)?;
        Ok(round_tax(Decimal::ZERO))
    }

    fn handle_sell(&mut self, operation: &Operation) -> Result<Decimal, DomainError> {
        let sale_value = operation
            .total_value()
            .ok_or(DomainError::Overflow("sale value"))?;
        let profit = sale_profit(
            operation.unit_cost,
            self.state.weighted_average_price,
            operation.quantity,
        )?;

        if is_exempt_sale(sale_value) {
            // Exempt regardless of the result, but losses still carry forward
            if profit < Decimal::ZERO {
                self.state.record_loss(profit.abs())?;
            }
            if self.sell_accounting == SellAccounting::AllSells {
                self.state.remove_shares(operation.quantity)?;
            }
            return Ok(round_tax(Decimal::ZERO));
        }

        let offset = offset_loss(profit, self.state.accumulated_loss, self.loss_recording)?;
        let tax = tax_on_profit(offset.taxable_profit)?;
        self.state.remove_shares(operation.quantity)?;
        self.state.accumulated_loss = offset.remaining_loss;

        if offset.loss_applied > Decimal::ZERO {
            debug!(
                loss_applied = %offset.loss_applied,
                taxable = %offset.taxable_profit,
                "offset carried loss against profit"
            );
        }

        Ok(tax)
    }
}
