use bankrules_core::{BankTransaction, ContactId, Money};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// The transaction field a condition reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    Description,
    Amount,
    Reference,
    ContactId,
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionField::Description => write!(f, "description"),
            ConditionField::Amount => write!(f, "amount"),
            ConditionField::Reference => write!(f, "reference"),
            ConditionField::ContactId => write!(f, "contactId"),
        }
    }
}

impl std::str::FromStr for ConditionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "description" => Ok(ConditionField::Description),
            "amount" => Ok(ConditionField::Amount),
            "reference" => Ok(ConditionField::Reference),
            "contactId" | "contact_id" => Ok(ConditionField::ContactId),
            other => Err(format!("Unknown condition field: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOperator {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
}

impl std::str::FromStr for TextOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains" => Ok(TextOperator::Contains),
            "equals" => Ok(TextOperator::Equals),
            "starts_with" => Ok(TextOperator::StartsWith),
            "ends_with" => Ok(TextOperator::EndsWith),
            other => Err(format!("Unknown text operator: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCondition {
    pub operator: TextOperator,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl TextCondition {
    pub fn new(operator: TextOperator, value: &str) -> Self {
        Self {
            operator,
            value: value.to_string(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// An empty `contains` matches everything; any other empty pattern matches nothing.
    pub fn matches(&self, text: &str) -> bool {
        if self.value.is_empty() {
            return self.operator == TextOperator::Contains;
        }

        let (text, pattern): (Cow<'_, str>, Cow<'_, str>) = if self.case_sensitive {
            (Cow::Borrowed(text), Cow::Borrowed(self.value.as_str()))
        } else {
            (Cow::Owned(fold_case(text)), Cow::Owned(fold_case(&self.value)))
        };

        match self.operator {
            TextOperator::Contains => text.contains(pattern.as_ref()),
            TextOperator::Equals => text == pattern,
            TextOperator::StartsWith => text.starts_with(pattern.as_ref()),
            TextOperator::EndsWith => text.ends_with(pattern.as_ref()),
        }
    }
}

/// Locale-independent case fold. Upper-casing first maps characters such as `ß`
/// to the same form as their upper-case spelling (`SS`). Each character folds on its
/// own, so a final `Σ` folds the same as any other.
pub(crate) fn fold_case(s: &str) -> String {
    s.chars()
        .flat_map(char::to_uppercase)
        .flat_map(char::to_lowercase)
        .collect()
}

/// A numeric test against the unsigned transaction amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountTest {
    /// Equal at cent precision.
    Equals { value: Money },
    GreaterThan { value: Money },
    LessThan { value: Money },
    /// Inclusive on both ends; an inverted range never matches.
    Between { from: Money, to: Money },
}

impl AmountTest {
    pub fn matches(&self, amount: Money) -> bool {
        match *self {
            AmountTest::Equals { value } => {
                amount.to_cents_precision() == value.to_cents_precision()
            }
            AmountTest::GreaterThan { value } => amount > value,
            AmountTest::LessThan { value } => amount < value,
            AmountTest::Between { from, to } => from <= to && amount >= from && amount <= to,
        }
    }
}

/// One comparison within a rule, keyed by the field it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Condition {
    Description(TextCondition),
    Reference(TextCondition),
    Amount {
        test: AmountTest,
    },
    #[serde(rename = "contact_id")]
    Contact {
        value: ContactId,
    },
}

impl Condition {
    pub fn description(operator: TextOperator, value: &str) -> Self {
        Condition::Description(TextCondition::new(operator, value))
    }

    pub fn reference(operator: TextOperator, value: &str) -> Self {
        Condition::Reference(TextCondition::new(operator, value))
    }

    pub fn amount(test: AmountTest) -> Self {
        Condition::Amount { test }
    }

    pub fn contact(contact_id: impl Into<ContactId>) -> Self {
        Condition::Contact {
            value: contact_id.into(),
        }
    }

    pub fn field(&self) -> ConditionField {
        match self {
            Condition::Description(_) => ConditionField::Description,
            Condition::Reference(_) => ConditionField::Reference,
            Condition::Amount { .. } => ConditionField::Amount,
            Condition::Contact { .. } => ConditionField::ContactId,
        }
    }

    /// Tests this condition against `tx`. Missing transaction fields read as empty
    /// and never cause an error.
    pub fn evaluate(&self, tx: &BankTransaction) -> bool {
        match self {
            Condition::Description(text) => text.matches(&tx.description),
            Condition::Reference(text) => {
                text.matches(tx.reference_number.as_deref().unwrap_or_default())
            }
            Condition::Amount { test } => test.matches(tx.amount()),
            Condition::Contact { value } => {
                !value.is_blank() && tx.contact_id.as_ref() == Some(value)
            }
        }
    }
}

/// Free-function form of [`Condition::evaluate`].
pub fn evaluate(condition: &Condition, tx: &BankTransaction) -> bool {
    condition.evaluate(tx)
}
