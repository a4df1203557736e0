//! Capital gains - tax owed on sequences of stock buy/sell operations
//!
//! This library tracks a single running position (weighted average price,
//! share count, accumulated loss) across one batch of operations and computes
//! the tax owed by each operation under a fixed 20% rate with a 20,000
//! exemption threshold per sale.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod tax;
pub mod utils;
