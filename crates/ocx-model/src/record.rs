//! Typed OCF records.
//!
//! Raw OCF objects arrive as JSON values discriminated by their `object_type`
//! string. They are decoded exactly once, here, into the closed [`OcfRecord`] sum
//! type; the capitalization model never looks at untyped maps.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::calculations::RatioInput;
use crate::error::DecodeError;

const STOCK_TRANSACTION_PREFIX: &str = "TX_STOCK_";
const EQUITY_COMPENSATION_PREFIX: &str = "TX_EQUITY_COMPENSATION_";
const POOL_ADJUSTMENT_TYPE: &str = "TX_STOCK_PLAN_POOL_ADJUSTMENT";

/// One decoded OCF object.
#[derive(Clone, Debug, PartialEq)]
pub enum OcfRecord {
    Issuer(IssuerRecord),
    Stakeholder(StakeholderRecord),
    StockClass(StockClassRecord),
    StockPlan(StockPlanRecord),
    StockPlanPoolAdjustment(PoolAdjustmentRecord),
    /// Any `TX_STOCK_*` object other than a pool adjustment.
    StockTransaction(Transaction),
    /// Any `TX_EQUITY_COMPENSATION_*` object.
    EquityCompensationTransaction(Transaction),
    /// An object kind this crate does not model. Kept so callers can count or log
    /// it; never an error.
    Unrecognized { object_type: String },
}

impl OcfRecord {
    /// Decode a raw OCF object.
    ///
    /// Objects without a string `object_type` decode to [`OcfRecord::Unrecognized`].
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let object_type = match value.get("object_type").and_then(Value::as_str) {
            Some(object_type) => object_type.to_string(),
            None => {
                return Ok(OcfRecord::Unrecognized {
                    object_type: String::new(),
                })
            }
        };

        let invalid = |source| DecodeError::InvalidRecord {
            object_type: object_type.clone(),
            source,
        };

        let record = match object_type.as_str() {
            "ISSUER" => OcfRecord::Issuer(serde_json::from_value(value).map_err(invalid)?),
            "STAKEHOLDER" => {
                OcfRecord::Stakeholder(serde_json::from_value(value).map_err(invalid)?)
            }
            "STOCK_CLASS" => {
                OcfRecord::StockClass(serde_json::from_value(value).map_err(invalid)?)
            }
            "STOCK_PLAN" => OcfRecord::StockPlan(serde_json::from_value(value).map_err(invalid)?),
            POOL_ADJUSTMENT_TYPE => {
                OcfRecord::StockPlanPoolAdjustment(serde_json::from_value(value).map_err(invalid)?)
            }
            tag if tag.starts_with(STOCK_TRANSACTION_PREFIX) => {
                let kind = TransactionKind::from_suffix(&tag[STOCK_TRANSACTION_PREFIX.len()..]);
                let body: TransactionBody = serde_json::from_value(value).map_err(invalid)?;
                OcfRecord::StockTransaction(body.into_transaction(kind))
            }
            tag if tag.starts_with(EQUITY_COMPENSATION_PREFIX) => {
                let kind = TransactionKind::from_suffix(&tag[EQUITY_COMPENSATION_PREFIX.len()..]);
                let body: TransactionBody = serde_json::from_value(value).map_err(invalid)?;
                OcfRecord::EquityCompensationTransaction(body.into_transaction(kind))
            }
            _ => OcfRecord::Unrecognized {
                object_type: object_type.clone(),
            },
        };
        Ok(record)
    }

    /// Decode a single JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(json).map_err(|source| DecodeError::InvalidRecord {
            object_type: String::new(),
            source,
        })?;
        Self::from_value(value)
    }

    /// The OCF `object_type` tag this record was decoded from (best effort for
    /// transactions, whose tag is rebuilt from their kind).
    pub fn object_type(&self) -> String {
        match self {
            OcfRecord::Issuer(_) => "ISSUER".to_string(),
            OcfRecord::Stakeholder(_) => "STAKEHOLDER".to_string(),
            OcfRecord::StockClass(_) => "STOCK_CLASS".to_string(),
            OcfRecord::StockPlan(_) => "STOCK_PLAN".to_string(),
            OcfRecord::StockPlanPoolAdjustment(_) => POOL_ADJUSTMENT_TYPE.to_string(),
            OcfRecord::StockTransaction(tx) => {
                format!("{STOCK_TRANSACTION_PREFIX}{}", tx.kind.as_suffix())
            }
            OcfRecord::EquityCompensationTransaction(tx) => {
                format!("{EQUITY_COMPENSATION_PREFIX}{}", tx.kind.as_suffix())
            }
            OcfRecord::Unrecognized { object_type } => object_type.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for OcfRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        OcfRecord::from_value(value).map_err(D::Error::custom)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct IssuerRecord {
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub dba: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StakeholderRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<StakeholderName>,
    #[serde(default)]
    pub current_relationship: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct StakeholderName {
    #[serde(default)]
    pub legal_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StockClassRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_type: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub board_approval_date: Option<NaiveDate>,
    /// OCF allows either a list or a single object here.
    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub conversion_rights: Vec<ConversionRight>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConversionRight {
    #[serde(default)]
    pub conversion_mechanism: Option<ConversionMechanism>,
    #[serde(default)]
    pub rounding_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConversionMechanism {
    #[serde(rename = "type", default)]
    pub mechanism_type: String,
    #[serde(default, deserialize_with = "deserialize_optional_ratio")]
    pub ratio: Option<RatioInput>,
    #[serde(default)]
    pub rounding_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StockPlanRecord {
    pub id: String,
    #[serde(default)]
    pub plan_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub initial_shares_reserved: Option<Decimal>,
    /// Deprecated OCF field, used when `initial_shares_reserved` is absent.
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub current_shares_reserved: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub board_approval_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PoolAdjustmentRecord {
    pub stock_plan_id: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub shares_reserved: Decimal,
}

/// What a transaction does to the security it references.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Issuance,
    Cancellation,
    Transfer,
    Retraction,
    Repurchase,
    Conversion,
    Reissuance,
    Acceptance,
    Exercise,
    Release,
    Other(String),
}

impl TransactionKind {
    /// Parse the part of the `object_type` that follows the `TX_..._` prefix.
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "ISSUANCE" => Self::Issuance,
            "CANCELLATION" => Self::Cancellation,
            "TRANSFER" => Self::Transfer,
            "RETRACTION" => Self::Retraction,
            "REPURCHASE" => Self::Repurchase,
            "CONVERSION" => Self::Conversion,
            "REISSUANCE" => Self::Reissuance,
            "ACCEPTANCE" => Self::Acceptance,
            "EXERCISE" => Self::Exercise,
            "RELEASE" => Self::Release,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_suffix(&self) -> &str {
        match self {
            Self::Issuance => "ISSUANCE",
            Self::Cancellation => "CANCELLATION",
            Self::Transfer => "TRANSFER",
            Self::Retraction => "RETRACTION",
            Self::Repurchase => "REPURCHASE",
            Self::Conversion => "CONVERSION",
            Self::Reissuance => "REISSUANCE",
            Self::Acceptance => "ACCEPTANCE",
            Self::Exercise => "EXERCISE",
            Self::Release => "RELEASE",
            Self::Other(other) => other,
        }
    }
}

/// A stock or equity-compensation transaction against one security.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub id: Option<String>,
    pub security_id: Option<String>,
    pub stakeholder_id: Option<String>,
    pub stock_class_id: Option<String>,
    pub stock_plan_id: Option<String>,
    pub quantity: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

impl Transaction {
    /// A transaction with only a kind and a security id set.
    pub fn new(kind: TransactionKind, security_id: impl Into<String>) -> Self {
        Self {
            kind,
            id: None,
            security_id: Some(security_id.into()),
            stakeholder_id: None,
            stock_class_id: None,
            stock_plan_id: None,
            quantity: None,
            date: None,
        }
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

#[derive(Deserialize)]
struct TransactionBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    security_id: Option<String>,
    #[serde(default)]
    stakeholder_id: Option<String>,
    #[serde(default)]
    stock_class_id: Option<String>,
    #[serde(default)]
    stock_plan_id: Option<String>,
    #[serde(
        default,
        alias = "quantity_converted",
        deserialize_with = "deserialize_optional_decimal"
    )]
    quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    date: Option<NaiveDate>,
}

impl TransactionBody {
    fn into_transaction(self, kind: TransactionKind) -> Transaction {
        Transaction {
            kind,
            id: self.id,
            security_id: self.security_id,
            stakeholder_id: self.stakeholder_id,
            stock_class_id: self.stock_class_id,
            stock_plan_id: self.stock_plan_id,
            quantity: self.quantity,
            date: self.date,
        }
    }
}

/// OCF numerics are usually strings, but plain JSON numbers show up in the wild.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    String(String),
    Number(serde_json::Number),
}

impl Numeric {
    fn into_string(self) -> String {
        match self {
            Numeric::String(s) => s,
            Numeric::Number(n) => n.to_string(),
        }
    }
}

fn parse_numeric<E: serde::de::Error>(raw: &str) -> Result<Decimal, E> {
    let trimmed = raw.trim();
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };
    parsed.map_err(|err| E::custom(format!("invalid numeric {raw:?}: {err}")))
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Numeric::deserialize(deserializer)?.into_string();
    parse_numeric(&raw)
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Numeric>::deserialize(deserializer)? {
        None => Ok(None),
        Some(numeric) => parse_numeric(&numeric.into_string()).map(Some),
    }
}

fn deserialize_optional_ratio<'de, D>(deserializer: D) -> Result<Option<RatioInput>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Helper {
        numerator: Numeric,
        denominator: Numeric,
    }

    Ok(Option::<Helper>::deserialize(deserializer)?.map(|helper| {
        RatioInput::new(
            helper.numerator.into_string(),
            helper.denominator.into_string(),
        )
    }))
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (only the date is kept).
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| Some(timestamp.date_naive()))
        .map_err(|err| D::Error::custom(format!("invalid date {raw:?}: {err}")))
}

fn deserialize_one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_kind_suffix_roundtrip() {
        for suffix in ["ISSUANCE", "CANCELLATION", "RETRACTION", "SPLIT"] {
            assert_eq!(TransactionKind::from_suffix(suffix).as_suffix(), suffix);
        }
    }

    #[test]
    fn pool_adjustment_is_not_a_security_transaction() {
        let record = OcfRecord::from_value(json!({
            "object_type": "TX_STOCK_PLAN_POOL_ADJUSTMENT",
            "stock_plan_id": "plan",
            "date": "2021-03-01",
            "shares_reserved": "5000"
        }))
        .unwrap();
        assert_eq!(
            record,
            OcfRecord::StockPlanPoolAdjustment(PoolAdjustmentRecord {
                stock_plan_id: "plan".to_string(),
                date: NaiveDate::from_ymd_opt(2021, 3, 1),
                shares_reserved: Decimal::from(5000),
            })
        );
        assert_eq!(record.object_type(), "TX_STOCK_PLAN_POOL_ADJUSTMENT");
    }

    #[test]
    fn object_type_is_rebuilt_for_transactions() {
        let record = OcfRecord::from_value(json!({
            "object_type": "TX_EQUITY_COMPENSATION_RETRACTION",
            "security_id": "opt-1"
        }))
        .unwrap();
        assert_eq!(record.object_type(), "TX_EQUITY_COMPENSATION_RETRACTION");

        let record = OcfRecord::from_value(json!({ "object_type": "VALUATION" })).unwrap();
        assert_eq!(record.object_type(), "VALUATION");
    }

    #[test]
    fn timestamps_keep_only_the_date() {
        let record = OcfRecord::from_value(json!({
            "object_type": "STOCK_CLASS",
            "id": "cs",
            "name": "Common",
            "class_type": "COMMON",
            "board_approval_date": "2022-07-14T10:20:30.000Z"
        }))
        .unwrap();
        let OcfRecord::StockClass(class) = record else {
            panic!("expected a stock class");
        };
        assert_eq!(class.board_approval_date, NaiveDate::from_ymd_opt(2022, 7, 14));
    }
}
