use bankrules_core::{BankTransaction, Money};
use thiserror::Error;

use crate::action::{Action, SplitMode};
use crate::condition::{AmountTest, Condition, ConditionField};
use crate::config::EngineConfig;
use crate::rule::{AccountScope, Rule};
use crate::split::{self, SplitError};

/// A problem with a rule definition, reported at authoring time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Rule name must not be empty")]
    EmptyName,
    #[error("Rule must have at least one condition")]
    NoConditions,
    #[error("Condition {condition} ({field}) has an empty value")]
    EmptyConditionValue {
        condition: usize,
        field: ConditionField,
    },
    #[error("Condition {condition} has an inverted amount range: {from} to {to}")]
    InvertedRange {
        condition: usize,
        from: Money,
        to: Money,
    },
    #[error("Condition {condition} has unknown field '{field}'")]
    UnknownField { condition: usize, field: String },
    #[error("Condition {condition}: operator '{operator}' is not supported for {field}")]
    UnsupportedOperator {
        condition: usize,
        field: ConditionField,
        operator: String,
    },
    #[error("Condition {condition}: {field} expects {expected}")]
    ValueTypeMismatch {
        condition: usize,
        field: ConditionField,
        expected: &'static str,
    },
    #[error("Rule is limited to selected accounts but none are selected")]
    NoAccountsSelected,
    #[error("Action {action} has unknown type '{kind}'")]
    UnknownAction { action: usize, kind: String },
    #[error("Action {action} ({kind}) has an empty payload")]
    EmptyPayload { action: usize, kind: &'static str },
    #[error("Action {action} lists a blank tax id at position {position}")]
    BlankTaxId { action: usize, position: usize },
    #[error("Action {action} has an invalid payload: {reason}")]
    InvalidPayload { action: usize, reason: String },
    #[error("Action {action} has an invalid split: {source}")]
    Split {
        action: usize,
        #[source]
        source: SplitError,
    },
}

impl ValidationError {
    /// Maps condition and action positions back through `conditions` and
    /// `actions`, which hold the original position of each kept entry.
    pub(crate) fn renumbered(mut self, conditions: &[usize], actions: &[usize]) -> Self {
        match &mut self {
            ValidationError::EmptyConditionValue { condition, .. }
            | ValidationError::InvertedRange { condition, .. }
            | ValidationError::UnknownField { condition, .. }
            | ValidationError::UnsupportedOperator { condition, .. }
            | ValidationError::ValueTypeMismatch { condition, .. } => {
                if let Some(&original) = conditions.get(*condition) {
                    *condition = original;
                }
            }
            ValidationError::UnknownAction { action, .. }
            | ValidationError::EmptyPayload { action, .. }
            | ValidationError::BlankTaxId { action, .. }
            | ValidationError::InvalidPayload { action, .. }
            | ValidationError::Split { action, .. } => {
                if let Some(&original) = actions.get(*action) {
                    *action = original;
                }
            }
            ValidationError::EmptyName
            | ValidationError::NoConditions
            | ValidationError::NoAccountsSelected => {}
        }
        self
    }
}

/// Checks everything about `rule` that does not depend on a particular
/// transaction. Returns every problem found, in rule order.
pub fn validate_rule(rule: &Rule, config: &EngineConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if rule.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if let AccountScope::Selected(ids) = &rule.account_scope {
        if ids.is_empty() {
            errors.push(ValidationError::NoAccountsSelected);
        }
    }

    if rule.conditions.is_empty() {
        errors.push(ValidationError::NoConditions);
    }
    for (idx, condition) in rule.conditions.iter().enumerate() {
        check_condition(idx, condition, &mut errors);
    }

    for (idx, action) in rule.actions.iter().enumerate() {
        if action.has_empty_payload() {
            // An empty split is reported once, as an empty payload.
            errors.push(ValidationError::EmptyPayload {
                action: idx,
                kind: action.name(),
            });
            continue;
        }
        if let Action::SetTaxes { tax_ids } = action {
            errors.extend(
                tax_ids
                    .iter()
                    .enumerate()
                    .filter(|(_, id)| id.is_blank())
                    .map(|(position, _)| ValidationError::BlankTaxId {
                        action: idx,
                        position,
                    }),
            );
        }
        if let Action::SetSplits { mode, lines } = action {
            errors.extend(
                split::shape_problems(*mode, lines, config)
                    .into_iter()
                    .map(|source| ValidationError::Split { action: idx, source }),
            );
        }
    }

    errors
}

/// [`validate_rule`] plus the checks that need a concrete transaction: amount
/// splits must add up to the transaction amount.
pub fn validate_rule_for(
    rule: &Rule,
    tx: &BankTransaction,
    config: &EngineConfig,
) -> Vec<ValidationError> {
    let mut errors = validate_rule(rule, config);

    for (idx, action) in rule.actions.iter().enumerate() {
        let Action::SetSplits {
            mode: SplitMode::Amount,
            lines,
        } = action
        else {
            continue;
        };
        // Shape problems were already reported above.
        if !split::shape_problems(SplitMode::Amount, lines, config).is_empty() {
            continue;
        }
        if let Err(source) = split::allocate(SplitMode::Amount, lines, tx.amount(), config) {
            errors.push(ValidationError::Split { action: idx, source });
        }
    }

    errors
}

fn check_condition(idx: usize, condition: &Condition, errors: &mut Vec<ValidationError>) {
    match condition {
        Condition::Description(text) | Condition::Reference(text) => {
            if text.value.is_empty() {
                errors.push(ValidationError::EmptyConditionValue {
                    condition: idx,
                    field: condition.field(),
                });
            }
        }
        Condition::Amount {
            test: AmountTest::Between { from, to },
        } => {
            if from > to {
                errors.push(ValidationError::InvertedRange {
                    condition: idx,
                    from: *from,
                    to: *to,
                });
            }
        }
        Condition::Amount { .. } => {}
        Condition::Contact { value } => {
            if value.is_blank() {
                errors.push(ValidationError::EmptyConditionValue {
                    condition: idx,
                    field: ConditionField::ContactId,
                });
            }
        }
    }
}
