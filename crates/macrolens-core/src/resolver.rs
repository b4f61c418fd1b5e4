//! Macro resolver: exact static-table lookup with linear quantity scaling.

use crate::models::{MacroRecord, NormalizedLabel, ResolvedMacros};
use crate::normalizer::LabelNormalizer;
use crate::nutrition_table;

/// Look up `canonical_key` and scale by `quantity`.
///
/// Returns `None` on a miss, which sends the caller down the external
/// fallback chain. No partial or fuzzy matching.
pub fn resolve(canonical_key: &str, quantity: u32) -> Option<ResolvedMacros> {
    let base = nutrition_table::lookup(canonical_key)?;
    Some(scale(base, canonical_key, quantity))
}

/// Attach quantity context and scale when `quantity > 1`.
pub fn scale(base: MacroRecord, base_item: &str, quantity: u32) -> ResolvedMacros {
    if quantity > 1 {
        ResolvedMacros {
            macros: base.scaled(f64::from(quantity)),
            quantity: Some(quantity),
            base_item: Some(base_item.to_lowercase()),
        }
    } else {
        ResolvedMacros::plain(base)
    }
}

/// Normalizer plus static table, the first stage of every lookup.
#[derive(Debug, Clone, Default)]
pub struct MacroResolver {
    normalizer: LabelNormalizer,
}

impl MacroResolver {
    pub fn new(normalizer: LabelNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &LabelNormalizer {
        &self.normalizer
    }

    pub fn normalize(&self, label: &str) -> NormalizedLabel {
        self.normalizer.normalize(label)
    }

    /// Normalize a raw phrase and look it up in the static table.
    pub fn resolve_label(&self, label: &str) -> (NormalizedLabel, Option<ResolvedMacros>) {
        let normalized = self.normalizer.normalize(label);
        let resolved = resolve(&normalized.canonical_key, normalized.quantity);
        (normalized, resolved)
    }
}
