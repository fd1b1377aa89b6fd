use bankrules_core::Money;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::action::{ResolvedSplitLine, SplitLine, SplitMode};
use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("Split has no lines")]
    NoLines,
    #[error("Split line {line} has no {mode} value")]
    MissingValue { line: usize, mode: SplitMode },
    #[error("Split line {line} has a negative {mode} value")]
    NegativeValue { line: usize, mode: SplitMode },
    #[error("Split percentages add up to {total}, expected 100")]
    PercentTotal { total: Decimal },
    #[error("Split amounts add up to {total}, expected {expected}")]
    AmountTotal { total: Money, expected: Money },
}

/// Every shape problem in `lines` that can be found without knowing the
/// transaction amount: missing or negative values, and the percent total.
pub fn shape_problems(
    mode: SplitMode,
    lines: &[SplitLine],
    config: &EngineConfig,
) -> Vec<SplitError> {
    if lines.is_empty() {
        return vec![SplitError::NoLines];
    }

    let mut problems = Vec::new();
    let mut complete = true;
    for (idx, line) in lines.iter().enumerate() {
        let value = match mode {
            SplitMode::Percent => line.percent,
            SplitMode::Amount => line.amount.map(Money::as_decimal),
        };
        match value {
            None => {
                complete = false;
                problems.push(SplitError::MissingValue { line: idx, mode });
            }
            Some(v) if v < Decimal::ZERO => {
                problems.push(SplitError::NegativeValue { line: idx, mode });
            }
            Some(_) => {}
        }
    }

    if complete && mode == SplitMode::Percent {
        let total: Decimal = lines.iter().filter_map(|l| l.percent).sum();
        if (total - Decimal::ONE_HUNDRED).abs() > config.percent_tolerance {
            problems.push(SplitError::PercentTotal { total });
        }
    }

    problems
}

/// Turns authored split lines into absolute amounts that add up to `total`.
///
/// Percent lines are rounded to cents and the last line takes whatever is left,
/// so the result always reconciles exactly. Amount lines pass through unchanged
/// once their sum is confirmed to match `total`.
///
/// The remainder can be negative when `total` is only a few cents and the other
/// lines all round up: ten lines of 10% of $0.05 give nine lines of $0.01 and a
/// last line of -$0.04. It is never negative while the last line's exact share
/// is at least half a cent per other line.
pub fn allocate(
    mode: SplitMode,
    lines: &[SplitLine],
    total: Money,
    config: &EngineConfig,
) -> Result<Vec<ResolvedSplitLine>, SplitError> {
    if let Some(problem) = shape_problems(mode, lines, config).into_iter().next() {
        return Err(problem);
    }

    match mode {
        SplitMode::Percent => allocate_percent(lines, total),
        SplitMode::Amount => allocate_amount(lines, total, config),
    }
}

fn allocate_percent(
    lines: &[SplitLine],
    total: Money,
) -> Result<Vec<ResolvedSplitLine>, SplitError> {
    let last = lines.len() - 1;
    let mut allocated = Money::zero();
    let mut resolved = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let amount = if idx == last {
            total - allocated
        } else {
            let percent = line.percent.ok_or(SplitError::MissingValue {
                line: idx,
                mode: SplitMode::Percent,
            })?;
            let share =
                Money::round_cents(total.as_decimal() * percent / Decimal::ONE_HUNDRED);
            allocated = allocated + share;
            share
        };
        resolved.push(resolve_line(line, amount));
    }

    Ok(resolved)
}

fn allocate_amount(
    lines: &[SplitLine],
    total: Money,
    config: &EngineConfig,
) -> Result<Vec<ResolvedSplitLine>, SplitError> {
    let mut resolved = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let amount = line.amount.ok_or(SplitError::MissingValue {
            line: idx,
            mode: SplitMode::Amount,
        })?;
        resolved.push(resolve_line(line, amount));
    }

    let sum: Money = resolved.iter().map(|l| l.amount).sum();
    let difference = (sum.to_cents_precision() - total.to_cents_precision()).abs();
    if difference > config.amount_tolerance {
        return Err(SplitError::AmountTotal {
            total: sum,
            expected: total,
        });
    }

    Ok(resolved)
}

fn resolve_line(line: &SplitLine, amount: Money) -> ResolvedSplitLine {
    ResolvedSplitLine {
        amount,
        category_id: line.category_id.clone(),
        description: line.description.clone(),
        tax_ids: line.tax_ids.clone().unwrap_or_default(),
    }
}
