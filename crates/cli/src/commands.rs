use anyhow::{bail, Context, Result};
use bankrules_core::{BankTransaction, TransactionId};
use bankrules_engine::{Effect, RuleFile, RunOptions};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct TransactionEffects {
    pub transaction_id: TransactionId,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Serialize)]
pub struct RuleProblems {
    pub rule_id: String,
    pub rule_name: String,
    pub errors: Vec<String>,
}

pub fn load_rule_file(path: &Path) -> Result<RuleFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let file = if is_json {
        RuleFile::from_json(&content)
    } else {
        RuleFile::from_toml(&content)
    }
    .with_context(|| format!("Invalid rule file {}", path.display()))?;
    tracing::info!("Loaded {} rules from {}", file.rules.len(), path.display());
    Ok(file)
}

pub fn load_transactions(path: &Path) -> Result<Vec<BankTransaction>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transactions {}", path.display()))?;
    let transactions: Vec<BankTransaction> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid transactions file {}", path.display()))?;
    tracing::info!("Loaded {} transactions from {}", transactions.len(), path.display());
    Ok(transactions)
}

pub fn run(rules: &Path, transactions: &Path, auto_apply_only: bool) -> Result<String> {
    let engine = load_rule_file(rules)?.into_engine();
    let transactions = load_transactions(transactions)?;

    let options = RunOptions { auto_apply_only };
    let results: Vec<TransactionEffects> = engine
        .run_batch(&transactions, options)
        .into_iter()
        .map(|(idx, effects)| TransactionEffects {
            transaction_id: transactions[idx].id.clone(),
            effects,
        })
        .collect();

    tracing::info!(
        "{} of {} transactions matched a rule",
        results.len(),
        transactions.len()
    );
    Ok(serde_json::to_string_pretty(&results)?)
}

/// Prints problems for every invalid rule, then fails if there were any.
pub fn validate(rules: &Path) -> Result<String> {
    let file = load_rule_file(rules)?;
    let problems: Vec<RuleProblems> = file
        .validate()
        .into_iter()
        .map(|(rule, errors)| RuleProblems {
            rule_id: rule.id.to_string(),
            rule_name: rule.name.clone(),
            errors: errors.iter().map(ToString::to_string).collect(),
        })
        .collect();

    let output = serde_json::to_string_pretty(&problems)?;
    if problems.is_empty() {
        Ok(output)
    } else {
        println!("{output}");
        bail!("{} of {} rules failed validation", problems.len(), file.rules.len())
    }
}
