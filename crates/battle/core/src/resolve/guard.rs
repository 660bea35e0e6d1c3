use super::{Chain, ResolvedModifier};
use crate::data::RuleSource;

/// Whether guard mitigation is skipped: `<nullguard>` on the item or any
/// attacker source.
pub fn resolve_guard_bypass(item: &RuleSource, attacker: &Chain<'_>) -> ResolvedModifier<bool> {
    let mut resolved = ResolvedModifier::stock(false);
    for source in std::iter::once(item).chain(attacker.iter()) {
        if source.flag("nullguard") {
            resolved.set_by(true, source.origin());
        }
    }
    resolved
}
