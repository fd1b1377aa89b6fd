//! Conversion from the rule editor's form state into typed rules.
//!
//! The editor keeps every condition as a flat record with both a text and a
//! numeric value slot, and every action as a type string plus a bag of optional
//! payload fields. Nothing here is trusted until it has been converted.

use bankrules_core::{AccountId, CategoryId, ContactId, Direction, Money, RuleId, TaxId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{Action, SplitLine, SplitMode};
use crate::condition::{AmountTest, Condition, ConditionField, TextCondition, TextOperator};
use crate::config::EngineConfig;
use crate::rule::{AccountScope, MatchType, Rule, TransactionType};
use crate::validate::{validate_rule, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDraft {
    /// Editor correlation id; not used for matching.
    #[serde(default)]
    pub id: Option<String>,
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value_string: Option<String>,
    #[serde(default)]
    pub value_number: Option<Decimal>,
    #[serde(default)]
    pub value_number_to: Option<Decimal>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl ConditionDraft {
    /// `index` is the condition's position, used in error reports.
    pub fn into_condition(self, index: usize) -> Result<Condition, ValidationError> {
        let field: ConditionField = self.field.parse().map_err(|_| ValidationError::UnknownField {
            condition: index,
            field: self.field.clone(),
        })?;
        let unsupported = || ValidationError::UnsupportedOperator {
            condition: index,
            field,
            operator: self.operator.clone(),
        };
        let mismatch = |expected| ValidationError::ValueTypeMismatch {
            condition: index,
            field,
            expected,
        };

        // Only the value slot that suits the field may be filled.
        let has_text = self.value_string.is_some();
        let has_number = self.value_number.is_some() || self.value_number_to.is_some();

        match field {
            ConditionField::Description | ConditionField::Reference => {
                let operator: TextOperator = self.operator.parse().map_err(|_| unsupported())?;
                if has_number {
                    return Err(mismatch("a text value"));
                }
                let value = self.value_string.clone().unwrap_or_default();
                let text = TextCondition {
                    operator,
                    value,
                    case_sensitive: self.case_sensitive,
                };
                Ok(if field == ConditionField::Description {
                    Condition::Description(text)
                } else {
                    Condition::Reference(text)
                })
            }
            ConditionField::Amount => {
                if has_text {
                    return Err(mismatch("a numeric value"));
                }
                let value = self
                    .value_number
                    .map(Money::from_decimal)
                    .ok_or_else(|| mismatch("a numeric value"))?;
                let test = match self.operator.as_str() {
                    "equals" => AmountTest::Equals { value },
                    "greater_than" => AmountTest::GreaterThan { value },
                    "less_than" => AmountTest::LessThan { value },
                    "between" => {
                        let to = self
                            .value_number_to
                            .map(Money::from_decimal)
                            .ok_or_else(|| mismatch("a numeric range"))?;
                        AmountTest::Between { from: value, to }
                    }
                    _ => return Err(unsupported()),
                };
                Ok(Condition::Amount { test })
            }
            ConditionField::ContactId => {
                if self.operator != "equals" {
                    return Err(unsupported());
                }
                if has_number {
                    return Err(mismatch("a contact id"));
                }
                let value = self
                    .value_string
                    .clone()
                    .ok_or_else(|| mismatch("a contact id"))?;
                Ok(Condition::Contact {
                    value: ContactId::new(value),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitLineDraft {
    #[serde(default)]
    pub percent: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tax_ids: Option<Vec<String>>,
}

impl SplitLineDraft {
    fn into_line(self) -> SplitLine {
        SplitLine {
            percent: self.percent,
            amount: self.amount.map(Money::from_decimal),
            category_id: non_blank(self.category_id).map(CategoryId::new),
            description: non_blank(self.description),
            tax_ids: self.tax_ids.map(tax_ids).filter(|ids| !ids.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayloadDraft {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub tax_ids: Option<Vec<String>>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub lines: Option<Vec<SplitLineDraft>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub payload: ActionPayloadDraft,
}

impl ActionDraft {
    /// `Ok(None)` when the action has nothing to apply and should be dropped.
    pub fn into_action(self, index: usize) -> Result<Option<Action>, ValidationError> {
        let payload = self.payload;
        let invalid = |reason: String| ValidationError::InvalidPayload {
            action: index,
            reason,
        };

        let action = match self.action_type.as_str() {
            "set_type" => match non_blank(payload.transaction_type) {
                None => None,
                Some(value) => {
                    let direction: Direction = value.parse().map_err(invalid)?;
                    Some(Action::SetType { direction })
                }
            },
            "set_category" => non_blank(payload.category_id).map(Action::set_category),
            "set_contact" => non_blank(payload.contact_id).map(Action::set_contact),
            "set_memo" => non_blank(payload.memo).map(|memo| Action::SetMemo { memo }),
            "set_taxes" => {
                let ids = payload.tax_ids.map(tax_ids).unwrap_or_default();
                (!ids.is_empty()).then_some(Action::SetTaxes { tax_ids: ids })
            }
            "set_splits" => {
                let lines = payload.lines.unwrap_or_default();
                if lines.is_empty() {
                    None
                } else {
                    let mode = match payload.mode.as_deref() {
                        Some("percent") => SplitMode::Percent,
                        Some("amount") => SplitMode::Amount,
                        Some(other) => return Err(invalid(format!("unknown split mode '{other}'"))),
                        None => return Err(invalid("split mode is missing".to_string())),
                    };
                    Some(Action::SetSplits {
                        mode,
                        lines: lines.into_iter().map(SplitLineDraft::into_line).collect(),
                    })
                }
            }
            "exclude" => Some(Action::Exclude),
            other => {
                return Err(ValidationError::UnknownAction {
                    action: index,
                    kind: other.to_string(),
                })
            }
        };

        Ok(action)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountScopeKind {
    #[default]
    All,
    Selected,
}

fn default_active() -> bool {
    true
}

/// The whole rule editor form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDraft {
    /// Missing for a rule that has never been saved.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub account_scope: AccountScopeKind,
    #[serde(default)]
    pub account_ids: Vec<String>,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub conditions: Vec<ConditionDraft>,
    #[serde(default)]
    pub actions: Vec<ActionDraft>,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default)]
    pub stop_on_match: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl RuleDraft {
    /// Converts the form into a rule ready to store. Empty actions are dropped;
    /// anything else wrong is reported, all at once. Positions in the errors
    /// refer to the draft's own condition and action lists.
    pub fn into_rule(self, config: &EngineConfig) -> Result<Rule, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let mut conditions = Vec::with_capacity(self.conditions.len());
        let mut condition_positions = Vec::with_capacity(self.conditions.len());
        for (idx, draft) in self.conditions.into_iter().enumerate() {
            match draft.into_condition(idx) {
                Ok(condition) => {
                    conditions.push(condition);
                    condition_positions.push(idx);
                }
                Err(e) => errors.push(e),
            }
        }
        let conditions_failed = !errors.is_empty();

        let mut actions = Vec::with_capacity(self.actions.len());
        let mut action_positions = Vec::with_capacity(self.actions.len());
        for (idx, draft) in self.actions.into_iter().enumerate() {
            match draft.into_action(idx) {
                Ok(Some(action)) => {
                    actions.push(action);
                    action_positions.push(idx);
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        let account_scope = match self.account_scope {
            AccountScopeKind::All => AccountScope::All,
            AccountScopeKind::Selected => AccountScope::Selected(
                self.account_ids
                    .into_iter()
                    .filter(|id| !id.trim().is_empty())
                    .map(AccountId::new)
                    .collect(),
            ),
        };

        let rule = Rule {
            id: match non_blank(self.id) {
                Some(id) => RuleId::new(id),
                None => RuleId::new(Uuid::new_v4().to_string()),
            },
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            transaction_type: self.transaction_type,
            account_scope,
            match_type: self.match_type,
            conditions,
            actions,
            auto_apply: self.auto_apply,
            stop_on_match: self.stop_on_match,
            priority: self.priority,
            active: self.active,
        };

        // A rule whose conditions all failed to convert is not also "without conditions".
        errors.extend(
            validate_rule(&rule, config)
                .into_iter()
                .filter(|e| !(conditions_failed && *e == ValidationError::NoConditions))
                .map(|e| e.renumbered(&condition_positions, &action_positions)),
        );
        if errors.is_empty() {
            Ok(rule)
        } else {
            Err(errors)
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn tax_ids(ids: Vec<String>) -> Vec<TaxId> {
    ids.into_iter()
        .filter(|id| !id.trim().is_empty())
        .map(TaxId::new)
        .collect()
}
