//! `ocx-model` turns a stream of Open Cap Table (OCF) records into an in-memory
//! capitalization table.
//!
//! Records are decoded once into [`OcfRecord`], folded into a [`Model`], and read
//! back through the [`CapTable`] trait by report writers (see `ocx-workbook`).

pub mod calculations;
mod cap_table;
mod collation;
mod error;
mod model;
pub mod record;

pub use calculations::{
    convert_ratio_to_decimal_number, ConversionRatio, OutstandingSharesCalculator,
    PlanPoolCalculator, RatioInput,
};
pub use cap_table::{CapTable, RoundingType, Stakeholder, StockClass, StockPlan};
pub use collation::compare_names;
pub use error::{DecodeError, ModelError, RatioError};
pub use model::{Model, UNAPPROVED_SENTINEL};
pub use record::{OcfRecord, Transaction, TransactionKind};

pub use rust_decimal::Decimal;
