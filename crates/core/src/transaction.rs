use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, ContactId, TransactionId};
use super::money::Money;

/// Which way money moved on a bank transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Income,
    Expense,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Income => write!(f, "income"),
            Direction::Expense => write!(f, "expense"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Direction::Income),
            "expense" => Ok(Direction::Expense),
            other => Err(format!("Unknown direction: '{other}'")),
        }
    }
}

/// A bank feed transaction awaiting review. Owned by the caller; rules only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub spent: Option<Money>,
    #[serde(default)]
    pub received: Option<Money>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    pub account_id: AccountId,
}

impl BankTransaction {
    pub fn new(
        id: impl Into<TransactionId>,
        date: NaiveDate,
        description: &str,
        account_id: impl Into<AccountId>,
    ) -> Self {
        BankTransaction {
            id: id.into(),
            date,
            description: description.to_string(),
            spent: None,
            received: None,
            reference_number: None,
            contact_id: None,
            account_id: account_id.into(),
        }
    }

    pub fn with_spent(mut self, amount: Money) -> Self {
        self.spent = Some(amount);
        self
    }

    pub fn with_received(mut self, amount: Money) -> Self {
        self.received = Some(amount);
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference_number = Some(reference.to_string());
        self
    }

    pub fn with_contact(mut self, contact_id: impl Into<ContactId>) -> Self {
        self.contact_id = Some(contact_id.into());
        self
    }

    /// `Income` when money was received, `Expense` when spent, `None` for a zero
    /// transaction. A populated `received` takes precedence over `spent`.
    pub fn direction(&self) -> Option<Direction> {
        if self.received.map(Money::abs).is_some_and(Money::is_positive) {
            Some(Direction::Income)
        } else if self.spent.map(Money::abs).is_some_and(Money::is_positive) {
            Some(Direction::Expense)
        } else {
            None
        }
    }

    /// Unsigned amount of the side that determined [`Self::direction`]. Never negative.
    pub fn amount(&self) -> Money {
        match self.direction() {
            Some(Direction::Income) => self.received.unwrap_or_default().abs(),
            Some(Direction::Expense) => self.spent.unwrap_or_default().abs(),
            None => Money::zero(),
        }
    }

    /// Positive for money received, negative for money spent.
    pub fn signed_amount(&self) -> Money {
        match self.direction() {
            Some(Direction::Expense) => Money::zero() - self.amount(),
            _ => self.amount(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base() -> BankTransaction {
        BankTransaction::new("tx-1", date(2024, 1, 15), "Test", "acc-checking")
    }

    #[test]
    fn received_is_income() {
        let tx = base().with_received(Money::from_cents(5000));
        assert_eq!(tx.direction(), Some(Direction::Income));
        assert_eq!(tx.amount(), Money::from_cents(5000));
        assert_eq!(tx.signed_amount(), Money::from_cents(5000));
    }

    #[test]
    fn spent_is_expense() {
        let tx = base().with_spent(Money::from_cents(15_000));
        assert_eq!(tx.direction(), Some(Direction::Expense));
        assert_eq!(tx.amount(), Money::from_cents(15_000));
        assert_eq!(tx.signed_amount(), Money::from_cents(-15_000));
    }

    #[test]
    fn zero_transaction_has_no_direction() {
        let tx = base()
            .with_spent(Money::zero())
            .with_received(Money::zero());
        assert_eq!(tx.direction(), None);
        assert_eq!(tx.amount(), Money::zero());
    }

    #[test]
    fn zero_received_falls_through_to_spent() {
        let tx = base()
            .with_received(Money::zero())
            .with_spent(Money::from_cents(250));
        assert_eq!(tx.direction(), Some(Direction::Expense));
        assert_eq!(tx.amount(), Money::from_cents(250));
    }

    #[test]
    fn negative_boundary_value_is_treated_as_magnitude() {
        let tx = base().with_spent(Money::from_cents(-999));
        assert_eq!(tx.direction(), Some(Direction::Expense));
        assert_eq!(tx.amount(), Money::from_cents(999));
    }

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let json = r#"{
            "id": "tx-9",
            "date": "2024-03-01",
            "description": "SUN LIFE",
            "spent": "42.10",
            "account_id": "acc-1"
        }"#;
        let tx: BankTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount(), Money::from_cents(4210));
        assert!(tx.contact_id.is_none());
        assert!(tx.reference_number.is_none());
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("Income".parse::<Direction>(), Ok(Direction::Income));
        assert!("transfer".parse::<Direction>().is_err());
    }
}
