use crate::action::{Action, Effect};
use crate::config::EngineConfig;
use crate::matcher::MatchedRule;
use crate::split;

/// Turns a matched rule's actions into effects, in stored order.
///
/// An `exclude` anywhere in the list wins: the result is exactly `[Exclude]`.
/// Actions with empty payloads are skipped, and so is a split that cannot be
/// allocated against this transaction's amount.
pub fn resolve(matched: &MatchedRule<'_>, config: &EngineConfig) -> Vec<Effect> {
    let rule = matched.rule();
    let tx = matched.transaction();

    if rule.actions.iter().any(|a| matches!(a, Action::Exclude)) {
        return vec![Effect::Exclude];
    }

    let mut effects = Vec::with_capacity(rule.actions.len());
    for action in &rule.actions {
        if action.has_empty_payload() {
            tracing::debug!(
                rule = %rule.id,
                action = action.name(),
                "skipping action with empty payload"
            );
            continue;
        }

        let effect = match action {
            Action::SetType { direction } => Effect::SetType {
                direction: *direction,
            },
            Action::SetCategory { category_id } => Effect::SetCategory {
                category_id: category_id.clone(),
            },
            Action::SetContact { contact_id } => Effect::SetContact {
                contact_id: contact_id.clone(),
            },
            Action::SetMemo { memo } => Effect::SetMemo { memo: memo.clone() },
            Action::SetTaxes { tax_ids } => Effect::SetTaxes {
                tax_ids: tax_ids.clone(),
            },
            Action::SetSplits { mode, lines } => {
                match split::allocate(*mode, lines, tx.amount(), config) {
                    Ok(lines) => Effect::ApplySplits { lines },
                    Err(e) => {
                        tracing::warn!(rule = %rule.id, tx = %tx.id, "skipping split: {e}");
                        continue;
                    }
                }
            }
            Action::Exclude => Effect::Exclude,
        };
        effects.push(effect);
    }

    effects
}
