use bankrules_core::BankTransaction;

use crate::rule::{MatchType, Rule};

/// Proof that a rule matched a transaction. Only [`check`] creates one, and
/// the resolver requires one, so effects are never computed for a rule that
/// did not match.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRule<'a> {
    rule: &'a Rule,
    tx: &'a BankTransaction,
}

impl<'a> MatchedRule<'a> {
    pub fn rule(&self) -> &'a Rule {
        self.rule
    }

    pub fn transaction(&self) -> &'a BankTransaction {
        self.tx
    }
}

/// Returns a [`MatchedRule`] when `rule` matches `tx`.
pub fn check<'a>(rule: &'a Rule, tx: &'a BankTransaction) -> Option<MatchedRule<'a>> {
    if !rule.admits(tx) {
        tracing::trace!(
            rule = %rule.id,
            tx = %tx.id,
            "rule skipped by direction or account filter"
        );
        return None;
    }

    let matched = match rule.match_type {
        // An empty condition list never matches, even though `all` over nothing is vacuously true.
        MatchType::All => {
            !rule.conditions.is_empty() && rule.conditions.iter().all(|c| c.evaluate(tx))
        }
        MatchType::Any => rule.conditions.iter().any(|c| c.evaluate(tx)),
    };

    matched.then_some(MatchedRule { rule, tx })
}

pub fn matches(rule: &Rule, tx: &BankTransaction) -> bool {
    check(rule, tx).is_some()
}
