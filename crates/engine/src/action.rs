use bankrules_core::{CategoryId, ContactId, Direction, Money, TaxId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Percent,
    Amount,
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMode::Percent => write!(f, "percent"),
            SplitMode::Amount => write!(f, "amount"),
        }
    }
}

/// One line of a split as authored. Only the numeric field named by the parent's
/// [`SplitMode`] is read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitLine {
    #[serde(default)]
    pub percent: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tax_ids: Option<Vec<TaxId>>,
}

impl SplitLine {
    pub fn percent(percent: Decimal) -> Self {
        SplitLine {
            percent: Some(percent),
            ..Default::default()
        }
    }

    pub fn amount(amount: Money) -> Self {
        SplitLine {
            amount: Some(amount),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_taxes<I, T>(mut self, tax_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaxId>,
    {
        self.tax_ids = Some(tax_ids.into_iter().map(Into::into).collect());
        self
    }
}

/// What a rule does to a transaction it matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetType {
        #[serde(rename = "type")]
        direction: Direction,
    },
    SetCategory {
        category_id: CategoryId,
    },
    SetContact {
        contact_id: ContactId,
    },
    SetMemo {
        memo: String,
    },
    SetTaxes {
        tax_ids: Vec<TaxId>,
    },
    SetSplits {
        mode: SplitMode,
        lines: Vec<SplitLine>,
    },
    /// Void the transaction. Overrides every other action on the rule.
    Exclude,
}

impl Action {
    pub fn set_category(category_id: impl Into<CategoryId>) -> Self {
        Action::SetCategory {
            category_id: category_id.into(),
        }
    }

    pub fn set_contact(contact_id: impl Into<ContactId>) -> Self {
        Action::SetContact {
            contact_id: contact_id.into(),
        }
    }

    pub fn set_memo(memo: &str) -> Self {
        Action::SetMemo {
            memo: memo.to_string(),
        }
    }

    pub fn set_taxes<I, T>(tax_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaxId>,
    {
        Action::SetTaxes {
            tax_ids: tax_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SetType { .. } => "set_type",
            Action::SetCategory { .. } => "set_category",
            Action::SetContact { .. } => "set_contact",
            Action::SetMemo { .. } => "set_memo",
            Action::SetTaxes { .. } => "set_taxes",
            Action::SetSplits { .. } => "set_splits",
            Action::Exclude => "exclude",
        }
    }

    /// True when the payload carries nothing to apply (blank ids, empty memo, no
    /// taxes, no split lines). Such actions are dropped before a rule is stored.
    pub fn has_empty_payload(&self) -> bool {
        match self {
            Action::SetType { .. } | Action::Exclude => false,
            Action::SetCategory { category_id } => category_id.is_blank(),
            Action::SetContact { contact_id } => contact_id.is_blank(),
            Action::SetMemo { memo } => memo.trim().is_empty(),
            Action::SetTaxes { tax_ids } => tax_ids.iter().all(TaxId::is_blank),
            Action::SetSplits { lines, .. } => lines.is_empty(),
        }
    }
}

/// Keeps only actions with something to apply, preserving order.
pub fn retain_meaningful(actions: Vec<Action>) -> Vec<Action> {
    actions
        .into_iter()
        .filter(|action| !action.has_empty_payload())
        .collect()
}

/// A split line with its final amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSplitLine {
    pub amount: Money,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    pub tax_ids: Vec<TaxId>,
}

/// A concrete instruction for the caller to apply to one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    SetType {
        #[serde(rename = "type")]
        direction: Direction,
    },
    SetCategory {
        category_id: CategoryId,
    },
    SetContact {
        contact_id: ContactId,
    },
    SetMemo {
        memo: String,
    },
    SetTaxes {
        tax_ids: Vec<TaxId>,
    },
    ApplySplits {
        lines: Vec<ResolvedSplitLine>,
    },
    Exclude,
}

impl Effect {
    pub fn is_exclude(&self) -> bool {
        matches!(self, Effect::Exclude)
    }
}
