//! Label normalizer: leading-quantity extraction and synonym canonicalization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{FoodLabel, NormalizedLabel};
use crate::synonyms::SynonymTable;

/// `<digits><whitespace><word>` over the whole phrase.
static QUANTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+(\w+)$").expect("quantity pattern is valid"));

/// Split a raw phrase into its quantity and base term.
///
/// `"3 tacos"` becomes quantity 3 and base term `"taco"`. Phrases without a
/// leading count (or with a count of zero) keep quantity 1 and use the
/// trimmed lowercase phrase as the base term.
pub fn parse_quantity(raw: &str) -> FoodLabel {
    let original = raw.trim().to_lowercase();

    if let Some(caps) = QUANTITY_RE.captures(&original) {
        let quantity = caps[1].parse::<u32>().ok().filter(|q| *q >= 1);
        if let Some(quantity) = quantity {
            let word = &caps[2];
            let base_term = word.strip_suffix('s').unwrap_or(word).to_string();
            return FoodLabel {
                quantity,
                base_term,
                original,
            };
        }
    }

    FoodLabel {
        quantity: 1,
        base_term: original.clone(),
        original,
    }
}

/// Turns free-text food phrases into table lookup keys.
#[derive(Debug, Clone, Default)]
pub struct LabelNormalizer {
    synonyms: SynonymTable,
}

impl LabelNormalizer {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Produce `(quantity, canonical_key)` for a raw phrase.
    ///
    /// Synonym keywords are matched against the full lowercase phrase. With
    /// no match, the base term itself is the lookup key.
    pub fn normalize(&self, raw: &str) -> NormalizedLabel {
        let label = parse_quantity(raw);
        let canonical_key = match self.synonyms.canonicalize(&label.original) {
            Some(key) => key.to_string(),
            None => label.base_term.clone(),
        };

        tracing::trace!(
            label = %label.original,
            quantity = label.quantity,
            canonical_key = %canonical_key,
            "Normalized food label"
        );

        NormalizedLabel {
            quantity: label.quantity,
            base_term: label.base_term,
            canonical_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synonyms::MatchStrategy;

    #[test]
    fn test_parse_quantity_plural() {
        let label = parse_quantity("3 tacos");
        assert_eq!(label.quantity, 3);
        assert_eq!(label.base_term, "taco");
        assert_eq!(label.original, "3 tacos");
    }

    #[test]
    fn test_parse_quantity_singular_word() {
        let label = parse_quantity("1 apple");
        assert_eq!(label.quantity, 1);
        assert_eq!(label.base_term, "apple");
    }

    #[test]
    fn test_parse_quantity_strips_only_one_s() {
        let label = parse_quantity("2 glasss");
        assert_eq!(label.base_term, "glass");
    }

    #[test]
    fn test_parse_quantity_no_count() {
        let label = parse_quantity("  Fried Rice ");
        assert_eq!(label.quantity, 1);
        assert_eq!(label.base_term, "fried rice");
    }

    #[test]
    fn test_parse_quantity_multi_word_is_not_counted() {
        // The count only applies to a single trailing word.
        let label = parse_quantity("2 fried eggs");
        assert_eq!(label.quantity, 1);
        assert_eq!(label.base_term, "2 fried eggs");
    }

    #[test]
    fn test_parse_quantity_zero_is_ignored() {
        let label = parse_quantity("0 tacos");
        assert_eq!(label.quantity, 1);
        assert_eq!(label.base_term, "0 tacos");
    }

    #[test]
    fn test_parse_quantity_overflow_is_ignored() {
        let label = parse_quantity("99999999999 tacos");
        assert_eq!(label.quantity, 1);
    }

    #[test]
    fn test_normalize_synonym() {
        let normalizer = LabelNormalizer::default();
        let n = normalizer.normalize("cheeseburger");
        assert_eq!(n.quantity, 1);
        assert_eq!(n.canonical_key, "hamburger");
    }

    #[test]
    fn test_normalize_quantity_and_synonym() {
        let normalizer = LabelNormalizer::default();
        let n = normalizer.normalize("3 tacos");
        assert_eq!(n.quantity, 3);
        assert_eq!(n.base_term, "taco");
        assert_eq!(n.canonical_key, "taco");
    }

    #[test]
    fn test_normalize_unknown_falls_back_to_base_term() {
        let normalizer = LabelNormalizer::default();
        let n = normalizer.normalize("2 apples");
        assert_eq!(n.canonical_key, "apple");
        let n = normalizer.normalize("Dragonfruit");
        assert_eq!(n.canonical_key, "dragonfruit");
    }

    #[test]
    fn test_normalize_respects_strategy() {
        let legacy =
            LabelNormalizer::new(SynonymTable::builtin().with_strategy(MatchStrategy::FirstDeclared));
        assert_eq!(legacy.normalize("salmon salad").canonical_key, "salad");
        let specific = LabelNormalizer::default();
        assert_eq!(specific.normalize("salmon salad").canonical_key, "fish");
    }
}
