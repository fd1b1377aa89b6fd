pub mod action;
pub mod condition;
pub mod config;
pub mod draft;
pub mod file;
pub mod matcher;
pub mod resolver;
pub mod rule;
pub mod runner;
pub mod split;
pub mod validate;

pub use action::{Action, Effect, ResolvedSplitLine, SplitLine, SplitMode};
pub use condition::{AmountTest, Condition, ConditionField, TextCondition, TextOperator};
pub use config::{ConfigError, EngineConfig};
pub use draft::{ActionDraft, ConditionDraft, RuleDraft};
pub use file::{RuleFile, RuleFileError};
pub use matcher::{check, matches, MatchedRule};
pub use resolver::resolve;
pub use rule::{AccountScope, MatchType, Rule, TransactionType};
pub use runner::{evaluate_rule, run_rule_set, Evaluation, RuleEngine, RuleHit, RunOptions};
pub use split::{allocate, SplitError};
pub use validate::{validate_rule, validate_rule_for, ValidationError};
