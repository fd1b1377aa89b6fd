use bankrules_core::{AccountId, BankTransaction, Direction, RuleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::action::Action;
use crate::condition::Condition;

/// Which transaction directions a rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Any,
    Income,
    Expense,
}

impl TransactionType {
    /// `Any` admits every transaction, including zero-amount ones that have no direction.
    pub fn admits(self, direction: Option<Direction>) -> bool {
        match self {
            TransactionType::Any => true,
            TransactionType::Income => direction == Some(Direction::Income),
            TransactionType::Expense => direction == Some(Direction::Expense),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountScope {
    #[default]
    All,
    Selected(BTreeSet<AccountId>),
}

impl AccountScope {
    pub fn covers(&self, account_id: &AccountId) -> bool {
        match self {
            AccountScope::All => true,
            AccountScope::Selected(ids) => ids.contains(account_id),
        }
    }
}

/// How a rule combines its condition results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    #[default]
    All,
    Any,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub account_scope: AccountScope,
    #[serde(default)]
    pub match_type: MatchType,
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default)]
    pub stop_on_match: bool,
    /// Lower runs first.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Rule {
    /// A new active rule that matches all of `conditions` on any account.
    pub fn new(id: impl Into<RuleId>, name: &str, conditions: Vec<Condition>) -> Self {
        Rule {
            id: id.into(),
            name: name.to_string(),
            description: None,
            transaction_type: TransactionType::Any,
            account_scope: AccountScope::All,
            match_type: MatchType::All,
            conditions,
            actions: Vec::new(),
            auto_apply: false,
            stop_on_match: false,
            priority: 0,
            active: true,
        }
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn with_accounts<I, A>(mut self, account_ids: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AccountId>,
    {
        self.account_scope =
            AccountScope::Selected(account_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn stop_on_match(mut self) -> Self {
        self.stop_on_match = true;
        self
    }

    pub fn auto_apply(mut self) -> Self {
        self.auto_apply = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Direction and account checks that run before any condition is evaluated.
    pub fn admits(&self, tx: &BankTransaction) -> bool {
        self.transaction_type.admits(tx.direction()) && self.account_scope.covers(&tx.account_id)
    }
}
