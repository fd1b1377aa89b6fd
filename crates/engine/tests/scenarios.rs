use bankrules_core::{BankTransaction, Money};
use bankrules_engine::{
    allocate, evaluate_rule, matches, run_rule_set, Action, AmountTest, Condition, Effect,
    EngineConfig, Rule, RunOptions, SplitLine, SplitMode, TextOperator,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

fn make_tx(desc: &str) -> BankTransaction {
    BankTransaction::new(
        "tx-1",
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        desc,
        "acc-checking",
    )
}

fn percent_lines(values: &[&str]) -> Vec<SplitLine> {
    values
        .iter()
        .map(|v| SplitLine::percent(Decimal::from_str(v).unwrap()))
        .collect()
}

#[test]
fn description_contains_ignores_case() {
    let rule = Rule::new(
        "sun-life",
        "Sun Life",
        vec![Condition::description(TextOperator::Contains, "Sun Life")],
    );
    let tx = make_tx("Payment from SUN LIFE INSURANCE").with_received(Money::from_cents(12_000));
    assert!(matches(&rule, &tx));
}

#[test]
fn amount_between_boundaries() {
    let rule = Rule::new(
        "mid",
        "Mid-size",
        vec![Condition::amount(AmountTest::Between {
            from: Money::from_cents(10_000),
            to: Money::from_cents(20_000),
        })],
    );
    assert!(matches(&rule, &make_tx("x").with_spent(Money::from_cents(15_000))));
    assert!(!matches(&rule, &make_tx("x").with_spent(Money::from_cents(25_000))));
}

#[test]
fn percent_split_of_one_hundred() {
    let resolved = allocate(
        SplitMode::Percent,
        &percent_lines(&["33", "33", "34"]),
        Money::from_cents(10_000),
        &EngineConfig::default(),
    )
    .unwrap();
    let amounts: Vec<Money> = resolved.iter().map(|l| l.amount).collect();
    assert_eq!(
        amounts,
        vec![Money::from_cents(3300), Money::from_cents(3300), Money::from_cents(3400)]
    );
    assert_eq!(amounts.iter().sum::<Money>(), Money::from_cents(10_000));
}

#[test]
fn percent_split_rounding_lands_on_last_line() {
    let resolved = allocate(
        SplitMode::Percent,
        &percent_lines(&["33.33", "33.33", "33.34"]),
        Money::from_cents(1000),
        &EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(
        resolved.iter().map(|l| l.amount).sum::<Money>(),
        Money::from_cents(1000)
    );
}

#[test]
fn exclude_wins_over_category() {
    let rule = Rule::new(
        "void",
        "Void transfers",
        vec![Condition::description(TextOperator::StartsWith, "transfer")],
    )
    .with_actions(vec![Action::set_category("cat-transfers"), Action::Exclude]);
    let evaluation = evaluate_rule(
        &rule,
        &make_tx("TRANSFER TO SAVINGS").with_spent(Money::from_cents(50_000)),
        &EngineConfig::default(),
    );
    assert!(evaluation.matched);
    assert_eq!(evaluation.effects, vec![Effect::Exclude]);
}

#[test]
fn effects_accumulate_until_a_stopping_rule() {
    let rule1 = Rule::new(
        "contact",
        "Tag contact",
        vec![Condition::description(TextOperator::Contains, "sun life")],
    )
    .with_priority(1)
    .with_actions(vec![Action::set_contact("contact-sunlife")]);
    let rule2 = Rule::new(
        "category",
        "Categorize",
        vec![Condition::description(TextOperator::Contains, "insurance")],
    )
    .with_priority(2)
    .stop_on_match()
    .with_actions(vec![Action::set_category("cat-insurance")]);
    let rule3 = Rule::new(
        "memo",
        "Never reached",
        vec![Condition::description(TextOperator::Contains, "")],
    )
    .with_priority(3)
    .with_actions(vec![Action::set_memo("unreachable")]);

    let tx = make_tx("SUN LIFE INSURANCE").with_spent(Money::from_cents(8_450));
    let effects = run_rule_set(
        &[rule3, rule2, rule1],
        &tx,
        RunOptions::default(),
        &EngineConfig::default(),
    );
    assert_eq!(
        effects,
        vec![
            Effect::SetContact {
                contact_id: "contact-sunlife".into()
            },
            Effect::SetCategory {
                category_id: "cat-insurance".into()
            },
        ]
    );
}
