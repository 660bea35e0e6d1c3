use super::{Chain, ResolvedModifier, fold_flag, nullify};
use crate::data::RuleSource;
use crate::error::Result;
use crate::formula::Scope;

/// Whether damage uses whichever defence axis favours the attacker.
///
/// `<adaptive>` / `<adaptiveeval>` on the item and attacker chain;
/// `<nulladaptive>` on the defender chain cancels.
pub fn resolve_adaptive<'s>(
    item: &RuleSource,
    attacker: &Chain<'_>,
    defender: &Chain<'_>,
    scope: &dyn Fn() -> Scope<'s>,
) -> Result<ResolvedModifier<bool>> {
    let mut resolved = fold_flag(Some(item), attacker, "adaptive", "adaptiveeval", scope)?;
    if resolved.value {
        nullify(&mut resolved, defender, &["nulladaptive"], false);
    }
    tracing::debug!("adaptive = {resolved}");
    Ok(resolved)
}
