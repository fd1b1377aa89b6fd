use bankrules_core::{BankTransaction, RuleId};
use serde::{Deserialize, Serialize};

use crate::action::Effect;
use crate::config::EngineConfig;
use crate::matcher;
use crate::resolver;
use crate::rule::Rule;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Only consider rules flagged `auto_apply`.
    pub auto_apply_only: bool,
}

impl RunOptions {
    pub fn auto_apply_only() -> Self {
        Self {
            auto_apply_only: true,
        }
    }
}

/// Result of evaluating a single rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub matched: bool,
    pub effects: Vec<Effect>,
}

/// A rule that fired during a run, with the effects it contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleHit {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub effects: Vec<Effect>,
}

/// Evaluates one rule regardless of its `active` flag, e.g. to preview it
/// against a transaction while the rule is being edited.
pub fn evaluate_rule(rule: &Rule, tx: &BankTransaction, config: &EngineConfig) -> Evaluation {
    match matcher::check(rule, tx) {
        Some(matched) => Evaluation {
            matched: true,
            effects: resolver::resolve(&matched, config),
        },
        None => Evaluation {
            matched: false,
            effects: Vec::new(),
        },
    }
}

/// Active rules in evaluation order: ascending priority, ties kept in input order.
pub struct RuleEngine {
    rules: Vec<Rule>,
    config: EngineConfig,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>, config: EngineConfig) -> Self {
        let mut rules: Vec<Rule> = rules.into_iter().filter(|r| r.active).collect();
        // Stable, so equal priorities keep their input order.
        rules.sort_by_key(|r| r.priority);
        Self { rules, config }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All effects for `tx`, in rule order.
    pub fn run(&self, tx: &BankTransaction, options: RunOptions) -> Vec<Effect> {
        self.run_detailed(tx, options)
            .into_iter()
            .flat_map(|hit| hit.effects)
            .collect()
    }

    /// Like [`Self::run`], grouped by the rule that produced each effect.
    ///
    /// Stops after the first matching rule with `stop_on_match`. A rule that
    /// resolves to `exclude` also stops the run and replaces all earlier
    /// effects, since the transaction is being voided.
    pub fn run_detailed(&self, tx: &BankTransaction, options: RunOptions) -> Vec<RuleHit> {
        let mut hits = Vec::new();

        for rule in &self.rules {
            if options.auto_apply_only && !rule.auto_apply {
                continue;
            }
            let Some(matched) = matcher::check(rule, tx) else {
                continue;
            };

            let effects = resolver::resolve(&matched, &self.config);
            tracing::debug!(
                rule = %rule.id,
                tx = %tx.id,
                effects = effects.len(),
                "rule matched"
            );

            let excluded = effects.iter().any(Effect::is_exclude);
            let hit = RuleHit {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                effects,
            };

            if excluded {
                return vec![hit];
            }
            hits.push(hit);
            if rule.stop_on_match {
                break;
            }
        }

        hits
    }

    /// Runs every transaction and returns `(index, effects)` for those that
    /// received at least one effect, in input order.
    pub fn run_batch(
        &self,
        transactions: &[BankTransaction],
        options: RunOptions,
    ) -> Vec<(usize, Vec<Effect>)> {
        let results: Vec<(usize, Vec<Effect>)> = transactions
            .iter()
            .enumerate()
            .map(|(idx, tx)| (idx, self.run(tx, options)))
            .filter(|(_, effects)| !effects.is_empty())
            .collect();
        tracing::debug!(
            transactions = transactions.len(),
            matched = results.len(),
            "batch evaluated"
        );
        results
    }
}

/// Free-function form of [`RuleEngine::run`] for a one-off rule list.
pub fn run_rule_set(
    rules: &[Rule],
    tx: &BankTransaction,
    options: RunOptions,
    config: &EngineConfig,
) -> Vec<Effect> {
    RuleEngine::new(rules.to_vec(), config.clone()).run(tx, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::condition::{Condition, TextOperator};
    use bankrules_core::Money;
    use chrono::NaiveDate;

    fn make_tx(desc: &str) -> BankTransaction {
        BankTransaction::new(
            "tx-1",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            desc,
            "acc-checking",
        )
        .with_spent(Money::from_cents(4_999))
    }

    fn make_rule(id: &str, pattern: &str, category: &str, priority: i32) -> Rule {
        Rule::new(
            id,
            id,
            vec![Condition::description(TextOperator::Contains, pattern)],
        )
        .with_actions(vec![Action::set_category(category)])
        .with_priority(priority)
    }

    fn category(id: &str) -> Effect {
        Effect::SetCategory {
            category_id: id.into(),
        }
    }

    #[test]
    fn lowest_priority_number_runs_first() {
        let engine = RuleEngine::new(
            vec![
                make_rule("late", "amazon", "cat-late", 10),
                make_rule("early", "amazon", "cat-early", 1),
            ],
            EngineConfig::default(),
        );
        assert_eq!(
            engine.run(&make_tx("AMAZON"), RunOptions::default()),
            vec![category("cat-early"), category("cat-late")]
        );
    }

    #[test]
    fn equal_priorities_keep_input_order() {
        let engine = RuleEngine::new(
            vec![
                make_rule("a", "amazon", "cat-a", 5),
                make_rule("b", "amazon", "cat-b", 5),
                make_rule("c", "amazon", "cat-c", 5),
            ],
            EngineConfig::default(),
        );
        let ids: Vec<&str> = engine.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn stop_on_match_ignores_later_rules() {
        let engine = RuleEngine::new(
            vec![
                make_rule("first", "amazon", "cat-first", 1).stop_on_match(),
                make_rule("second", "amazon", "cat-second", 2),
            ],
            EngineConfig::default(),
        );
        assert_eq!(
            engine.run(&make_tx("AMAZON"), RunOptions::default()),
            vec![category("cat-first")]
        );
    }

    #[test]
    fn non_matching_stop_rule_does_not_stop() {
        let engine = RuleEngine::new(
            vec![
                make_rule("first", "starbucks", "cat-coffee", 1).stop_on_match(),
                make_rule("second", "amazon", "cat-shopping", 2),
            ],
            EngineConfig::default(),
        );
        assert_eq!(
            engine.run(&make_tx("AMAZON"), RunOptions::default()),
            vec![category("cat-shopping")]
        );
    }

    #[test]
    fn inactive_rules_are_dropped() {
        let engine = RuleEngine::new(
            vec![make_rule("off", "amazon", "cat-off", 1).inactive()],
            EngineConfig::default(),
        );
        assert!(engine.rules().is_empty());
        assert!(engine.run(&make_tx("AMAZON"), RunOptions::default()).is_empty());
    }

    #[test]
    fn auto_apply_only_filters_rules() {
        let engine = RuleEngine::new(
            vec![
                make_rule("manual", "amazon", "cat-manual", 1).stop_on_match(),
                make_rule("auto", "amazon", "cat-auto", 2).auto_apply(),
            ],
            EngineConfig::default(),
        );
        assert_eq!(
            engine.run(&make_tx("AMAZON"), RunOptions::auto_apply_only()),
            vec![category("cat-auto")]
        );
        assert_eq!(
            engine.run(&make_tx("AMAZON"), RunOptions::default()),
            vec![category("cat-manual")]
        );
    }

    #[test]
    fn exclude_ends_the_run() {
        let engine = RuleEngine::new(
            vec![
                make_rule("categorize", "amazon", "cat-shopping", 1),
                make_rule("void", "amazon", "unused", 2).with_actions(vec![Action::Exclude]),
                make_rule("after", "amazon", "cat-after", 3),
            ],
            EngineConfig::default(),
        );
        let hits = engine.run_detailed(&make_tx("AMAZON"), RunOptions::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rule_id.as_str(), "void");
        assert_eq!(engine.run(&make_tx("AMAZON"), RunOptions::default()), vec![Effect::Exclude]);
    }

    #[test]
    fn no_match_yields_no_effects() {
        let engine = RuleEngine::new(
            vec![make_rule("r", "amazon", "cat", 1)],
            EngineConfig::default(),
        );
        assert!(engine.run(&make_tx("STARBUCKS"), RunOptions::default()).is_empty());
    }

    #[test]
    fn run_detailed_names_rules() {
        let engine = RuleEngine::new(
            vec![make_rule("amazon-rule", "amazon", "cat-shopping", 1)],
            EngineConfig::default(),
        );
        let hits = engine.run_detailed(&make_tx("AMAZON"), RunOptions::default());
        assert_eq!(
            hits,
            vec![RuleHit {
                rule_id: "amazon-rule".into(),
                rule_name: "amazon-rule".to_string(),
                effects: vec![category("cat-shopping")],
            }]
        );
    }

    #[test]
    fn batch_returns_matched_indices() {
        let engine = RuleEngine::new(
            vec![make_rule("github", "github", "cat-software", 1)],
            EngineConfig::default(),
        );
        let txs = vec![
            make_tx("GITHUB SUBSCRIPTION"),
            make_tx("STARBUCKS"),
            make_tx("GITHUB ACTIONS"),
        ];
        let results = engine.run_batch(&txs, RunOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, 0);
        assert_eq!(results[1].0, 2);
    }

    #[test]
    fn evaluate_rule_ignores_active_flag() {
        let rule = make_rule("draft", "amazon", "cat-shopping", 1).inactive();
        let evaluation = evaluate_rule(&rule, &make_tx("AMAZON"), &EngineConfig::default());
        assert!(evaluation.matched);
        assert_eq!(evaluation.effects, vec![category("cat-shopping")]);

        let miss = evaluate_rule(&rule, &make_tx("STARBUCKS"), &EngineConfig::default());
        assert!(!miss.matched);
        assert!(miss.effects.is_empty());
    }

    #[test]
    fn run_rule_set_matches_engine() {
        let rules = vec![
            make_rule("b", "amazon", "cat-b", 2),
            make_rule("a", "amazon", "cat-a", 1).stop_on_match(),
        ];
        let config = EngineConfig::default();
        assert_eq!(
            run_rule_set(&rules, &make_tx("AMAZON"), RunOptions::default(), &config),
            vec![category("cat-a")]
        );
    }
}
