//! Output formatting module for explain mode
//!
//! Renders a batch's per-operation outcomes as a terminal table, separating
//! the calculation from its presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::tax::OperationOutcome;
use crate::utils::format_amount;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Unit Cost")]
    unit_cost: String,
    #[tabled(rename = "Quantity")]
    quantity: i64,
    #[tabled(rename = "Tax")]
    tax: String,
    #[tabled(rename = "Avg Price")]
    average: String,
    #[tabled(rename = "Shares")]
    shares: i64,
    #[tabled(rename = "Loss Carried")]
    loss: String,
}

/// Format one batch as a table followed by its total tax
pub fn format_batch_explain(line_number: usize, outcomes: &[OperationOutcome]) -> String {
    let mut output = format!("\n{} Batch {}\n", "▶".cyan().bold(), line_number);

    if outcomes.is_empty() {
        output.push_str("  (no operations)\n");
        return output;
    }

    let rows: Vec<OutcomeRow> = outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| OutcomeRow {
            index: i + 1,
            operation: o.operation.kind.as_str().to_string(),
            unit_cost: format_amount(o.operation.unit_cost),
            quantity: o.operation.quantity,
            tax: if o.tax > Decimal::ZERO {
                format_amount(o.tax).yellow().to_string()
            } else {
                format_amount(o.tax)
            },
            average: if o.position.is_empty() {
                "-".to_string()
            } else {
                format_amount(o.position.weighted_average_price)
            },
            shares: o.position.total_shares,
            loss: format_amount(o.position.accumulated_loss),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align everything after the Operation column
    table.modify(Columns::new(2..), Alignment::right());

    output.push_str(&table.to_string());

    let total_tax: Decimal = outcomes.iter().map(|o| o.tax).sum();
    output.push_str(&format!(
        "\n{:<12} {}\n",
        "Total tax:".bold(),
        format_amount(total_tax)
    ));

    output
}
