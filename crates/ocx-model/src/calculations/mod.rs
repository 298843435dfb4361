//! Share-count arithmetic.
//!
//! Everything here works on exact decimals; conversion to `f64` only happens at
//! the spreadsheet boundary.

mod outstanding;
mod ratio;

pub use outstanding::{OutstandingSharesCalculator, PlanPoolCalculator};
pub use ratio::{convert_ratio_to_decimal_number, ConversionRatio, RatioInput};
