//! JSON line codec
//!
//! One input line holds a JSON array of operations; one output line holds a
//! JSON array of `{"tax": ...}` records in the same order.

use crate::error::CapitalGainsError;
use crate::models::{Operation, TaxResult};

/// Decode one input line into operations
pub fn parse_operations(line: &str) -> Result<Vec<Operation>, CapitalGainsError> {
    serde_json::from_str(line.trim()).map_err(|e| CapitalGainsError::Parse(e.to_string()))
}

/// Encode a batch of results as a compact JSON array
pub fn format_tax_results(results: &[TaxResult]) -> Result<String, CapitalGainsError> {
    serde_json::to_string(results).map_err(|e| CapitalGainsError::Encode(e.to_string()))
}
