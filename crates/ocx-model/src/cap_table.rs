use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::ConversionRatio;

/// A person or entity that can hold securities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub id: String,
    pub display_name: String,
    /// OCF `current_relationship` (e.g. `FOUNDER`, `INVESTOR`), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

impl Stakeholder {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            relationship: None,
        }
    }
}

/// How as-converted share counts are rounded to whole shares.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingType {
    /// Round half away from zero. OCF: `NORMAL`.
    #[default]
    #[serde(rename = "NORMAL", alias = "NEAREST")]
    Nearest,
    Floor,
    Ceiling,
}

impl RoundingType {
    /// Parse an OCF `rounding_type` value.
    #[must_use]
    pub fn from_ocf(value: &str) -> Option<Self> {
        match value {
            "NORMAL" | "NEAREST" => Some(Self::Nearest),
            "FLOOR" => Some(Self::Floor),
            "CEILING" => Some(Self::Ceiling),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockClass {
    pub id: String,
    pub display_name: String,
    pub is_preferred: bool,
    pub conversion_ratio: ConversionRatio,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_approval_date: Option<NaiveDate>,
    #[serde(default)]
    pub rounding_type: RoundingType,
}

impl StockClass {
    /// A class with no conversion rights and no approval date.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, is_preferred: bool) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_preferred,
            conversion_ratio: ConversionRatio::ONE,
            board_approval_date: None,
            rounding_type: RoundingType::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPlan {
    pub id: String,
    pub plan_name: String,
    pub initial_shares_reserved: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_approval_date: Option<NaiveDate>,
}

impl StockPlan {
    pub fn new(
        id: impl Into<String>,
        plan_name: impl Into<String>,
        initial_shares_reserved: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            plan_name: plan_name.into(),
            initial_shares_reserved,
            board_approval_date: None,
        }
    }
}

/// Read-only view of a capitalization table, as consumed by report writers.
///
/// [`crate::Model`] is the production implementation; report code only depends on this
/// trait so it can be exercised against hand-built tables.
pub trait CapTable {
    fn issuer_name(&self) -> &str;

    /// Effective date of the report, if known.
    fn as_of_date(&self) -> Option<NaiveDate> {
        None
    }

    fn stakeholders(&self) -> &[Stakeholder];

    /// Stock classes in report order.
    fn stock_classes(&self) -> &[StockClass];

    /// Stock plans in the order they were recorded.
    fn stock_plans(&self) -> &[StockPlan];

    fn stakeholder_stock_holdings(&self, stakeholder: &Stakeholder, stock_class: &StockClass)
        -> Decimal;

    fn stock_class_conversion_ratio(&self, stock_class: &StockClass) -> f64 {
        stock_class.conversion_ratio.to_f64()
    }

    /// Whether holdings of this class convert into a different number of
    /// common shares. Decided on the same `f64` the report multiplies by, so a
    /// ratio that rounds to 1 never gets an as-converted column.
    fn stock_class_converts(&self, stock_class: &StockClass) -> bool {
        self.stock_class_conversion_ratio(stock_class) != 1.0
    }

    fn stakeholder_stock_plan_holdings(&self, stakeholder: &Stakeholder, stock_plan: &StockPlan)
        -> Decimal;

    fn options_remaining_for_issuance(&self, stock_plan: &StockPlan) -> Decimal;
}
