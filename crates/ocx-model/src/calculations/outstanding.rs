use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::record::{Transaction, TransactionKind};

/// Net share count of a set of securities, rebuilt from their transactions.
///
/// Every transaction contributes a commutative effect, so the value does not depend
/// on the order transactions are applied in:
/// - issuances add their quantity;
/// - cancellations, transfers, repurchases, conversions, exercises and releases
///   subtract theirs;
/// - a retraction or reissuance voids the security it references.
///
/// Voiding is tracked per security, so the calculator can be fed transactions for
/// several securities at once.
#[derive(Clone, Debug, Default)]
pub struct OutstandingSharesCalculator {
    securities: HashMap<String, SecurityBalance>,
}

#[derive(Clone, Debug, Default)]
struct SecurityBalance {
    issued: Decimal,
    reduced: Decimal,
    voided: bool,
}

impl OutstandingSharesCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, transaction: &Transaction) {
        let quantity = transaction.quantity.unwrap_or(Decimal::ZERO);
        let balance = self
            .securities
            .entry(transaction.security_id.clone().unwrap_or_default())
            .or_default();
        match transaction.kind {
            TransactionKind::Issuance => balance.issued += quantity,
            TransactionKind::Cancellation
            | TransactionKind::Transfer
            | TransactionKind::Repurchase
            | TransactionKind::Conversion
            | TransactionKind::Exercise
            | TransactionKind::Release => balance.reduced += quantity,
            TransactionKind::Retraction | TransactionKind::Reissuance => balance.voided = true,
            TransactionKind::Acceptance | TransactionKind::Other(_) => {}
        }
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.securities
            .values()
            .filter(|balance| !balance.voided)
            .map(|balance| balance.issued - balance.reduced)
            .sum()
    }
}

/// Shares drawn from a stock plan's reserve by the plan's securities.
///
/// Issuances draw from the pool and cancellations return shares to it. A retracted
/// security never drew anything. Exercises, releases and transfers leave the pool
/// untouched: those shares were already granted.
#[derive(Clone, Debug, Default)]
pub struct PlanPoolCalculator {
    securities: HashMap<String, SecurityBalance>,
}

impl PlanPoolCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, transaction: &Transaction) {
        let quantity = transaction.quantity.unwrap_or(Decimal::ZERO);
        let balance = self
            .securities
            .entry(transaction.security_id.clone().unwrap_or_default())
            .or_default();
        match transaction.kind {
            TransactionKind::Issuance => balance.issued += quantity,
            TransactionKind::Cancellation => balance.reduced += quantity,
            TransactionKind::Retraction => balance.voided = true,
            _ => {}
        }
    }

    /// Net shares granted out of the pool.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.securities
            .values()
            .filter(|balance| !balance.voided)
            .map(|balance| balance.issued - balance.reduced)
            .sum()
    }
}
