use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::formula::normalize_formula_text;

/// Literal value of a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    String(String),
    Boolean(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        // Share counts are well inside f64's exact integer range.
        CellValue::Number(value.to_f64().unwrap_or(f64::NAN))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// What a layout component asks to put into a cell: a literal or a formula.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    Value(CellValue),
    /// Canonical formula text (no leading `'='`).
    Formula(String),
}

impl CellContent {
    pub const EMPTY: CellContent = CellContent::Value(CellValue::Empty);

    pub fn formula(text: impl AsRef<str>) -> Self {
        CellContent::Formula(normalize_formula_text(text.as_ref()))
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::EMPTY
    }
}

macro_rules! content_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CellContent {
                fn from(value: $ty) -> Self {
                    CellContent::Value(value.into())
                }
            }
        )*
    };
}

content_from_value!(CellValue, f64, Decimal, bool, String, &str, NaiveDate);
