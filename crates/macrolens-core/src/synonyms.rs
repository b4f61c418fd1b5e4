//! Synonym table mapping free-text food phrases to canonical table keys.
//!
//! Matching is plain substring containment of a keyword in the lowercase
//! phrase. When keywords of several canonical foods match, the
//! [`MatchStrategy`] decides which one wins.

use serde::{Deserialize, Serialize};

/// One canonical food and the keywords that select it.
#[derive(Debug, Clone, Copy)]
pub struct SynonymEntry {
    pub canonical: &'static str,
    pub keywords: &'static [&'static str],
}

/// Built-in synonym entries, in declaration order.
pub const SYNONYM_ENTRIES: &[SynonymEntry] = &[
    SynonymEntry {
        canonical: "pizza",
        keywords: &["pizza", "pepperoni", "cheese pizza", "slice"],
    },
    SynonymEntry {
        canonical: "hamburger",
        keywords: &["burger", "cheeseburger", "hamburger", "beef burger"],
    },
    SynonymEntry {
        canonical: "salad",
        keywords: &["salad", "garden salad", "caesar salad", "greek salad"],
    },
    SynonymEntry {
        canonical: "pasta",
        keywords: &[
            "pasta",
            "spaghetti",
            "noodle",
            "macaroni",
            "fettuccine",
            "linguine",
        ],
    },
    SynonymEntry {
        canonical: "rice",
        keywords: &["rice", "fried rice", "white rice", "brown rice"],
    },
    SynonymEntry {
        canonical: "bread",
        keywords: &["bread", "toast", "baguette", "sourdough", "roll"],
    },
    SynonymEntry {
        canonical: "chicken",
        keywords: &["chicken", "fried chicken", "grilled chicken", "roast chicken"],
    },
    SynonymEntry {
        canonical: "steak",
        keywords: &["steak", "beef", "beef steak", "meat"],
    },
    SynonymEntry {
        canonical: "soup",
        keywords: &["soup", "broth", "chowder", "stew"],
    },
    SynonymEntry {
        canonical: "sandwich",
        keywords: &["sandwich", "sub", "wrap", "hoagie"],
    },
    SynonymEntry {
        canonical: "cake",
        keywords: &["cake", "birthday cake", "chocolate cake", "cheesecake"],
    },
    SynonymEntry {
        canonical: "cookie",
        keywords: &["cookie", "biscuit", "chocolate chip"],
    },
    SynonymEntry {
        canonical: "ice cream",
        keywords: &["ice cream", "gelato", "frozen yogurt"],
    },
    SynonymEntry {
        canonical: "fish",
        keywords: &["fish", "salmon", "tuna", "tilapia", "cod"],
    },
    SynonymEntry {
        canonical: "french fries",
        keywords: &["fries", "french fries", "chips", "potato wedges"],
    },
    SynonymEntry {
        canonical: "taco",
        keywords: &["taco", "burrito", "enchilada", "quesadilla"],
    },
    SynonymEntry {
        canonical: "sushi",
        keywords: &["sushi", "maki", "nigiri", "sashimi"],
    },
];

/// How to choose between several matching canonical foods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// The longest matching keyword wins; equal lengths fall back to
    /// declaration order.
    #[default]
    MostSpecific,
    /// The first entry (in declaration order) with any matching keyword wins.
    FirstDeclared,
}

impl std::str::FromStr for MatchStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "most_specific" | "specific" => Ok(MatchStrategy::MostSpecific),
            "first_declared" | "first" | "legacy" => Ok(MatchStrategy::FirstDeclared),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown match strategy: {}",
                other
            ))),
        }
    }
}

/// A matched synonym with the keyword that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynonymMatch {
    pub canonical: &'static str,
    pub keyword: &'static str,
    /// Position of the entry in declaration order.
    pub entry_index: usize,
}

/// Ordered keyword table with a configurable tie-break.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: &'static [SynonymEntry],
    strategy: MatchStrategy,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SynonymTable {
    /// The built-in table with the default strategy.
    pub fn builtin() -> Self {
        Self {
            entries: SYNONYM_ENTRIES,
            strategy: MatchStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn entries(&self) -> &'static [SynonymEntry] {
        self.entries
    }

    /// Find the canonical food for a phrase, if any keyword matches.
    pub fn find(&self, phrase: &str) -> Option<SynonymMatch> {
        let lowered = phrase.to_lowercase();
        let phrase = lowered.as_str();
        let mut matches = self
            .entries
            .iter()
            .enumerate()
            .flat_map(move |(entry_index, entry)| {
                entry
                    .keywords
                    .iter()
                    .filter(move |kw| phrase.contains(**kw))
                    .map(move |kw| SynonymMatch {
                        canonical: entry.canonical,
                        keyword: *kw,
                        entry_index,
                    })
            });

        match self.strategy {
            MatchStrategy::FirstDeclared => matches.next(),
            // max_by keeps the last maximum, so compare on reversed index
            // to keep the earliest entry among equal-length keywords.
            MatchStrategy::MostSpecific => matches.max_by(|a, b| {
                a.keyword
                    .len()
                    .cmp(&b.keyword.len())
                    .then_with(|| b.entry_index.cmp(&a.entry_index))
            }),
        }
    }

    /// Canonical key for a phrase, if any keyword matches.
    pub fn canonicalize(&self, phrase: &str) -> Option<&'static str> {
        self.find(phrase).map(|m| m.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cheeseburger_maps_to_hamburger() {
        let table = SynonymTable::builtin();
        assert_eq!(table.canonicalize("cheeseburger"), Some("hamburger"));
    }

    #[test]
    fn test_no_match() {
        let table = SynonymTable::builtin();
        assert_eq!(table.canonicalize("apple"), None);
    }

    #[test]
    fn test_case_insensitive() {
        let table = SynonymTable::builtin();
        assert_eq!(table.canonicalize("Caesar Salad"), Some("salad"));
    }

    #[test]
    fn test_most_specific_prefers_longer_keyword() {
        let table = SynonymTable::builtin();
        // "salmon" (fish) is longer than "salad" (salad)
        assert_eq!(table.canonicalize("salmon salad"), Some("fish"));
        // "sandwich" beats "beef"
        assert_eq!(table.canonicalize("roast beef sandwich"), Some("sandwich"));
    }

    #[test]
    fn test_first_declared_uses_table_order() {
        let table = SynonymTable::builtin().with_strategy(MatchStrategy::FirstDeclared);
        assert_eq!(table.canonicalize("salmon salad"), Some("salad"));
        assert_eq!(table.canonicalize("roast beef sandwich"), Some("steak"));
    }

    #[test]
    fn test_equal_length_tie_uses_declaration_order() {
        // "fish" and "taco" are both four characters; fish is declared first.
        for strategy in [MatchStrategy::MostSpecific, MatchStrategy::FirstDeclared] {
            let table = SynonymTable::builtin().with_strategy(strategy);
            assert_eq!(table.canonicalize("fish taco"), Some("fish"));
            assert_eq!(table.canonicalize("taco fish"), Some("fish"));
        }
    }

    #[test]
    fn test_find_reports_keyword() {
        let table = SynonymTable::builtin();
        let m = table.find("beef burger").unwrap();
        assert_eq!(m.canonical, "hamburger");
        assert_eq!(m.keyword, "beef burger");
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "legacy".parse::<MatchStrategy>().unwrap(),
            MatchStrategy::FirstDeclared
        );
        assert_eq!(
            "most_specific".parse::<MatchStrategy>().unwrap(),
            MatchStrategy::MostSpecific
        );
        assert!("random".parse::<MatchStrategy>().is_err());
    }

    #[test]
    fn test_canonical_keys_exist_in_nutrition_table() {
        for entry in SYNONYM_ENTRIES {
            assert!(
                crate::nutrition_table::lookup(entry.canonical).is_some(),
                "{} missing from nutrition table",
                entry.canonical
            );
        }
    }
}
