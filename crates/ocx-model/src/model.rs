use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::calculations::{
    convert_ratio_to_decimal_number, ConversionRatio, OutstandingSharesCalculator,
    PlanPoolCalculator,
};
use crate::cap_table::{CapTable, RoundingType, Stakeholder, StockClass, StockPlan};
use crate::collation::compare_names;
use crate::error::{ModelError, RatioError};
use crate::record::{
    IssuerRecord, OcfRecord, PoolAdjustmentRecord, StakeholderRecord, StockClassRecord,
    StockPlanRecord, Transaction, TransactionKind,
};

const RATIO_CONVERSION: &str = "RATIO_CONVERSION";
const COMMON_CLASS_TYPE: &str = "COMMON";
const MISSING_STAKEHOLDER_NAME: &str = " - ";

/// Approval date used for stock classes that have none; sorts after every real date.
pub const UNAPPROVED_SENTINEL: NaiveDate = NaiveDate::MAX;

/// In-memory capitalization table built from a stream of OCF records.
///
/// The model is filled through [`Model::consume`] (records may arrive in any order)
/// and then read through the [`CapTable`] queries.
#[derive(Debug)]
pub struct Model {
    as_of_date: NaiveDate,
    generated_at: DateTime<Utc>,
    issuer_name: String,
    stakeholders: Vec<Stakeholder>,
    stock_classes: Vec<StockClass>,
    /// Sorted copy of `stock_classes`. Emptied on every insert, rebuilt on read.
    sorted_stock_classes: OnceCell<Vec<StockClass>>,
    stock_plans: Vec<StockPlan>,
    stock_transactions: TransactionLog,
    stock_issuances: IssuanceIndex,
    plan_transactions: TransactionLog,
    plan_issuances: IssuanceIndex,
    plan_securities: HashMap<String, BTreeSet<String>>,
    pool_adjustments: HashMap<String, Vec<PoolAdjustmentRecord>>,
}

impl Model {
    pub fn new(as_of_date: NaiveDate, generated_at: DateTime<Utc>) -> Self {
        Self {
            as_of_date,
            generated_at,
            issuer_name: String::new(),
            stakeholders: Vec::new(),
            stock_classes: Vec::new(),
            sorted_stock_classes: OnceCell::new(),
            stock_plans: Vec::new(),
            stock_transactions: TransactionLog::default(),
            stock_issuances: IssuanceIndex::default(),
            plan_transactions: TransactionLog::default(),
            plan_issuances: IssuanceIndex::default(),
            plan_securities: HashMap::new(),
            pool_adjustments: HashMap::new(),
        }
    }

    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of_date
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Fold one record into the model.
    ///
    /// Unrecognized object types are ignored. A stock class whose conversion ratio
    /// is malformed is rejected and not added.
    pub fn consume(&mut self, record: OcfRecord) -> Result<(), ModelError> {
        log::trace!("consuming {}", record.object_type());
        match record {
            OcfRecord::Issuer(issuer) => self.consume_issuer(issuer),
            OcfRecord::Stakeholder(stakeholder) => self.consume_stakeholder(stakeholder),
            OcfRecord::StockClass(stock_class) => self.consume_stock_class(stock_class)?,
            OcfRecord::StockPlan(stock_plan) => self.consume_stock_plan(stock_plan),
            OcfRecord::StockPlanPoolAdjustment(adjustment) => {
                self.pool_adjustments
                    .entry(adjustment.stock_plan_id.clone())
                    .or_default()
                    .push(adjustment);
            }
            OcfRecord::StockTransaction(transaction) => self.consume_stock_transaction(transaction),
            OcfRecord::EquityCompensationTransaction(transaction) => {
                self.consume_equity_compensation_transaction(transaction)
            }
            OcfRecord::Unrecognized { object_type } => {
                log::trace!("ignoring OCF object of type {object_type:?}");
            }
        }
        Ok(())
    }

    /// Decode a raw OCF object and fold it into the model.
    pub fn consume_value(&mut self, value: Value) -> Result<(), ModelError> {
        let record = OcfRecord::from_value(value)?;
        self.consume(record)
    }

    pub fn consume_all<I>(&mut self, records: I) -> Result<(), ModelError>
    where
        I: IntoIterator<Item = OcfRecord>,
    {
        records.into_iter().try_for_each(|record| self.consume(record))
    }

    pub fn issuer_name(&self) -> &str {
        &self.issuer_name
    }

    pub fn stakeholders(&self) -> &[Stakeholder] {
        &self.stakeholders
    }

    /// Stock classes ordered common-first, then by board approval date, then by name.
    pub fn stock_classes(&self) -> &[StockClass] {
        self.sorted_stock_classes.get_or_init(|| {
            let mut sorted = self.stock_classes.clone();
            sorted.sort_by(compare_classes_for_sort);
            sorted
        })
    }

    pub fn stock_plans(&self) -> &[StockPlan] {
        &self.stock_plans
    }

    pub fn stakeholder_stock_holdings(
        &self,
        stakeholder: &Stakeholder,
        stock_class: &StockClass,
    ) -> Decimal {
        let mut calculator = OutstandingSharesCalculator::new();
        for security_id in self.stock_issuances.securities(&stakeholder.id, &stock_class.id) {
            for transaction in self.stock_transactions.for_security(security_id) {
                calculator.apply(transaction);
            }
        }
        calculator.value()
    }

    pub fn stock_class_conversion_ratio(&self, stock_class: &StockClass) -> f64 {
        stock_class.conversion_ratio.to_f64()
    }

    pub fn stakeholder_stock_plan_holdings(
        &self,
        stakeholder: &Stakeholder,
        stock_plan: &StockPlan,
    ) -> Decimal {
        let mut calculator = OutstandingSharesCalculator::new();
        for security_id in self.plan_issuances.securities(&stakeholder.id, &stock_plan.id) {
            for transaction in self.plan_transactions.for_security(security_id) {
                calculator.apply(transaction);
            }
        }
        calculator.value()
    }

    /// Shares still available for grants under `stock_plan`.
    pub fn options_remaining_for_issuance(&self, stock_plan: &StockPlan) -> Decimal {
        let mut pool = PlanPoolCalculator::new();
        for security_id in self.plan_securities.get(&stock_plan.id).into_iter().flatten() {
            for transaction in self.plan_transactions.for_security(security_id) {
                pool.apply(transaction);
            }
        }
        self.shares_reserved(stock_plan) - pool.value()
    }

    /// Current reserve of a plan: its latest pool adjustment, else its initial reserve.
    pub fn shares_reserved(&self, stock_plan: &StockPlan) -> Decimal {
        self.pool_adjustments
            .get(&stock_plan.id)
            .and_then(|adjustments| {
                adjustments.iter().max_by(|a, b| {
                    a.date
                        .unwrap_or(NaiveDate::MIN)
                        .cmp(&b.date.unwrap_or(NaiveDate::MIN))
                        .then_with(|| a.shares_reserved.cmp(&b.shares_reserved))
                })
            })
            .map_or(stock_plan.initial_shares_reserved, |latest| {
                latest.shares_reserved
            })
    }

    fn consume_issuer(&mut self, issuer: IssuerRecord) {
        if let Some(name) = issuer.dba.or(issuer.legal_name) {
            self.issuer_name = name;
        }
    }

    fn consume_stakeholder(&mut self, stakeholder: StakeholderRecord) {
        // Duplicate ids are kept: each STAKEHOLDER record becomes a row.
        let display_name = stakeholder
            .name
            .and_then(|name| name.legal_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| MISSING_STAKEHOLDER_NAME.to_string());
        self.stakeholders.push(Stakeholder {
            id: stakeholder.id,
            display_name,
            relationship: stakeholder.current_relationship,
        });
    }

    fn consume_stock_class(&mut self, stock_class: StockClassRecord) -> Result<(), ModelError> {
        let (conversion_ratio, rounding_type) = conversion_terms(&stock_class).map_err(|source| {
            ModelError::ConversionRatio {
                stock_class_id: stock_class.id.clone(),
                source,
            }
        })?;

        self.stock_classes.push(StockClass {
            is_preferred: stock_class.class_type != COMMON_CLASS_TYPE,
            id: stock_class.id,
            display_name: stock_class.name,
            conversion_ratio,
            board_approval_date: stock_class.board_approval_date,
            rounding_type,
        });
        self.sorted_stock_classes.take();
        Ok(())
    }

    fn consume_stock_plan(&mut self, stock_plan: StockPlanRecord) {
        let initial_shares_reserved = stock_plan
            .initial_shares_reserved
            .or(stock_plan.current_shares_reserved)
            .unwrap_or(Decimal::ZERO);
        self.stock_plans.push(StockPlan {
            id: stock_plan.id,
            plan_name: stock_plan.plan_name,
            initial_shares_reserved,
            board_approval_date: stock_plan.board_approval_date,
        });
    }

    fn consume_stock_transaction(&mut self, transaction: Transaction) {
        let Some(security_id) = transaction.security_id.clone() else {
            log::debug!(
                "skipping TX_STOCK_{} without a security_id",
                transaction.kind.as_suffix()
            );
            return;
        };

        if transaction.kind == TransactionKind::Issuance {
            match (&transaction.stakeholder_id, &transaction.stock_class_id) {
                (Some(stakeholder_id), Some(stock_class_id)) => {
                    self.stock_issuances
                        .register(stakeholder_id, stock_class_id, &security_id)
                }
                _ => log::debug!(
                    "stock issuance for security {security_id:?} has no stakeholder or stock class"
                ),
            }
        }

        self.stock_transactions.record(security_id, transaction);
    }

    fn consume_equity_compensation_transaction(&mut self, transaction: Transaction) {
        let Some(security_id) = transaction.security_id.clone() else {
            log::debug!(
                "skipping TX_EQUITY_COMPENSATION_{} without a security_id",
                transaction.kind.as_suffix()
            );
            return;
        };

        if transaction.kind == TransactionKind::Issuance {
            if let Some(stock_plan_id) = &transaction.stock_plan_id {
                self.plan_securities
                    .entry(stock_plan_id.clone())
                    .or_default()
                    .insert(security_id.clone());
                if let Some(stakeholder_id) = &transaction.stakeholder_id {
                    self.plan_issuances
                        .register(stakeholder_id, stock_plan_id, &security_id);
                }
            }
        }

        self.plan_transactions.record(security_id, transaction);
    }
}

/// Common before preferred, then by approval date (unapproved last), then by name.
fn compare_classes_for_sort(a: &StockClass, b: &StockClass) -> Ordering {
    a.is_preferred
        .cmp(&b.is_preferred)
        .then_with(|| {
            let a_date = a.board_approval_date.unwrap_or(UNAPPROVED_SENTINEL);
            let b_date = b.board_approval_date.unwrap_or(UNAPPROVED_SENTINEL);
            a_date.cmp(&b_date)
        })
        .then_with(|| compare_names(&a.display_name, &b.display_name))
}

impl CapTable for Model {
    fn issuer_name(&self) -> &str {
        Model::issuer_name(self)
    }

    fn as_of_date(&self) -> Option<NaiveDate> {
        Some(self.as_of_date)
    }

    fn stakeholders(&self) -> &[Stakeholder] {
        Model::stakeholders(self)
    }

    fn stock_classes(&self) -> &[StockClass] {
        Model::stock_classes(self)
    }

    fn stock_plans(&self) -> &[StockPlan] {
        Model::stock_plans(self)
    }

    fn stakeholder_stock_holdings(
        &self,
        stakeholder: &Stakeholder,
        stock_class: &StockClass,
    ) -> Decimal {
        Model::stakeholder_stock_holdings(self, stakeholder, stock_class)
    }

    fn stock_class_conversion_ratio(&self, stock_class: &StockClass) -> f64 {
        Model::stock_class_conversion_ratio(self, stock_class)
    }

    fn stakeholder_stock_plan_holdings(
        &self,
        stakeholder: &Stakeholder,
        stock_plan: &StockPlan,
    ) -> Decimal {
        Model::stakeholder_stock_plan_holdings(self, stakeholder, stock_plan)
    }

    fn options_remaining_for_issuance(&self, stock_plan: &StockPlan) -> Decimal {
        Model::options_remaining_for_issuance(self, stock_plan)
    }
}

/// Conversion ratio and rounding policy from the first conversion right.
///
/// Only a `RATIO_CONVERSION` mechanism with a ratio is honored; anything else means
/// the class does not convert.
fn conversion_terms(
    stock_class: &StockClassRecord,
) -> Result<(ConversionRatio, RoundingType), RatioError> {
    let Some(right) = stock_class.conversion_rights.first() else {
        return Ok((ConversionRatio::ONE, RoundingType::default()));
    };

    let rounding_type = right
        .conversion_mechanism
        .as_ref()
        .and_then(|mechanism| mechanism.rounding_type.as_deref())
        .or(right.rounding_type.as_deref())
        .and_then(RoundingType::from_ocf)
        .unwrap_or_default();

    let ratio = match &right.conversion_mechanism {
        Some(mechanism) if mechanism.mechanism_type == RATIO_CONVERSION => {
            match &mechanism.ratio {
                Some(ratio) => convert_ratio_to_decimal_number(ratio)?,
                None => ConversionRatio::ONE,
            }
        }
        _ => ConversionRatio::ONE,
    };

    Ok((ratio, rounding_type))
}

/// Every transaction seen so far, grouped by the security it references.
#[derive(Debug, Default)]
struct TransactionLog {
    by_security: HashMap<String, Vec<Transaction>>,
}

impl TransactionLog {
    fn record(&mut self, security_id: String, transaction: Transaction) {
        self.by_security
            .entry(security_id)
            .or_default()
            .push(transaction);
    }

    fn for_security(&self, security_id: &str) -> impl Iterator<Item = &Transaction> {
        self.by_security.get(security_id).into_iter().flatten()
    }
}

/// `(holder, target)` -> ids of the securities issued to that holder in that target
/// (a stock class or a stock plan).
#[derive(Debug, Default)]
struct IssuanceIndex {
    by_holder: HashMap<String, HashMap<String, BTreeSet<String>>>,
}

impl IssuanceIndex {
    fn register(&mut self, holder_id: &str, target_id: &str, security_id: &str) {
        self.by_holder
            .entry(holder_id.to_string())
            .or_default()
            .entry(target_id.to_string())
            .or_default()
            .insert(security_id.to_string());
    }

    fn securities(&self, holder_id: &str, target_id: &str) -> impl Iterator<Item = &String> {
        self.by_holder
            .get(holder_id)
            .and_then(|targets| targets.get(target_id))
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        Model::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), Utc::now())
    }

    #[test]
    fn sorted_cache_is_invalidated_by_inserts() {
        let mut model = model();
        model.consume_stock_class(StockClassRecord {
            id: "b".into(),
            name: "B".into(),
            class_type: "COMMON".into(),
            board_approval_date: None,
            conversion_rights: Vec::new(),
        })
        .unwrap();
        assert_eq!(model.stock_classes().len(), 1);

        model.consume_stock_class(StockClassRecord {
            id: "a".into(),
            name: "A".into(),
            class_type: "COMMON".into(),
            board_approval_date: None,
            conversion_rights: Vec::new(),
        })
        .unwrap();
        let ids: Vec<_> = model.stock_classes().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn latest_pool_adjustment_wins_regardless_of_order() {
        let mut model = model();
        model.consume_stock_plan(StockPlanRecord {
            id: "plan".into(),
            plan_name: "Plan".into(),
            initial_shares_reserved: Some(Decimal::from(100)),
            current_shares_reserved: None,
            board_approval_date: None,
        });
        for (month, reserved) in [(6, 300), (3, 200)] {
            model
                .consume(OcfRecord::StockPlanPoolAdjustment(PoolAdjustmentRecord {
                    stock_plan_id: "plan".into(),
                    date: NaiveDate::from_ymd_opt(2023, month, 1),
                    shares_reserved: Decimal::from(reserved),
                }))
                .unwrap();
        }
        let plan = model.stock_plans()[0].clone();
        assert_eq!(model.shares_reserved(&plan), Decimal::from(300));
    }
}
