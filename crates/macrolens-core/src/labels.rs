//! Turns raw image-label detections into human-readable food phrases.
//!
//! The rules are small declarative tables (food keywords, generic terms,
//! known compound dishes, countable foods, number words) applied by pure
//! functions, so each step can be tested without the detection API.
//!
//! ## Pipeline
//!
//! 1. Collect confident object names (with per-name counts) and labels.
//! 2. Widen to lower-confidence labels when nothing looks like food yet.
//! 3. Fall back to the top labels when still empty.
//! 4. Compose: pull out number words, merge known compounds, drop
//!    redundant and generic terms, attach counts.

use std::collections::HashMap;

use crate::defaults;
use crate::models::Detection;

/// Words that mark a phrase as food-related.
pub const FOOD_KEYWORDS: &[&str] = &[
    "food",
    "dish",
    "cuisine",
    "meal",
    "fruit",
    "vegetable",
    "meat",
    "bread",
    "dessert",
    "breakfast",
    "lunch",
    "dinner",
    "snack",
    "beverage",
    "drink",
    "sandwich",
    "salad",
    "pasta",
    "rice",
    "potato",
    "burger",
    "pizza",
    "cake",
    "cookie",
    "taco",
];

/// Terms too vague to be worth resolving when anything better is present.
pub const GENERIC_TERMS: &[&str] = &[
    "food",
    "dish",
    "meal",
    "cuisine",
    "ingredient",
    "recipe",
    "produce",
    "close-up",
    "natural foods",
    "superfood",
    "staple food",
    "tableware",
    "plate",
    "dishware",
    "serveware",
];

/// Two-term phrases that name one dish.
pub const KNOWN_COMPOUNDS: &[&str] = &[
    "fried rice",
    "egg fried rice",
    "pad thai",
    "caesar salad",
    "greek salad",
    "fruit salad",
    "potato salad",
    "ice cream",
    "french fries",
    "sweet potato",
    "olive oil",
    "fried chicken",
    "grilled chicken",
    "chicken curry",
    "beef stew",
    "chocolate cake",
    "cheese pizza",
    "garlic bread",
    "hot dog",
    "chicken sandwich",
];

/// Foods that come in discrete pieces and can carry a count.
pub const COUNTABLE_FOODS: &[&str] = &[
    "taco",
    "burrito",
    "egg",
    "cookie",
    "apple",
    "banana",
    "orange",
    "burger",
    "hamburger",
    "cheeseburger",
    "sandwich",
    "slice",
    "donut",
    "muffin",
    "pancake",
    "dumpling",
    "hot dog",
];

/// Spelled-out counts, index + 1 is the value.
pub const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

/// Words that do not take a plural suffix.
const UNCOUNTABLE_WORDS: &[&str] = &["sushi", "rice", "fries", "pasta", "bread", "cheese"];

/// Whether any phrase mentions a food keyword.
pub fn has_food_keyword<S: AsRef<str>>(phrases: &[S]) -> bool {
    phrases
        .iter()
        .any(|p| FOOD_KEYWORDS.iter().any(|kw| p.as_ref().contains(kw)))
}

/// Whether a phrase is a generic, non-resolvable term.
pub fn is_generic(phrase: &str) -> bool {
    GENERIC_TERMS.contains(&phrase)
}

/// Parse a spelled-out or single-digit count (1-9).
pub fn parse_count_word(word: &str) -> Option<u32> {
    if let Some(pos) = NUMBER_WORDS.iter().position(|w| *w == word) {
        return Some(pos as u32 + 1);
    }
    match word.parse::<u32>() {
        Ok(n) if (1..10).contains(&n) => Some(n),
        _ => None,
    }
}

/// Plural form of a phrase (only the last word changes).
pub fn pluralize(phrase: &str) -> String {
    let (head, last) = match phrase.rsplit_once(' ') {
        Some((head, last)) => (Some(head), last),
        None => (None, phrase),
    };

    let plural = if UNCOUNTABLE_WORDS.contains(&last) || last.is_empty() {
        last.to_string()
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| last.ends_with(s)) {
        format!("{}es", last)
    } else if last.ends_with('y')
        && !last
            .chars()
            .rev()
            .nth(1)
            .map(|c| "aeiou".contains(c))
            .unwrap_or(false)
    {
        format!("{}ies", &last[..last.len() - 1])
    } else {
        format!("{}s", last)
    };

    match head {
        Some(head) => format!("{} {}", head, plural),
        None => plural,
    }
}

/// `"<n> <plural>"` for counts above one, the phrase itself otherwise.
pub fn with_count(phrase: &str, count: u32) -> String {
    if count > 1 {
        format!("{} {}", count, pluralize(phrase))
    } else {
        phrase.to_string()
    }
}

fn is_countable(phrase: &str) -> bool {
    COUNTABLE_FOODS
        .iter()
        .any(|c| phrase == *c || phrase.ends_with(&format!(" {}", c)))
}

/// Whether `inner` occurs as whole words inside `outer`.
fn contains_words(outer: &str, inner: &str) -> bool {
    outer != inner && format!(" {} ", outer).contains(&format!(" {} ", inner))
}

fn push_unique(list: &mut Vec<String>, phrase: String) {
    if !phrase.is_empty() && !list.contains(&phrase) {
        list.push(phrase);
    }
}

/// Confident object and label names, in detection order, plus object counts.
pub fn collect_terms(detection: &Detection) -> (Vec<String>, HashMap<String, u32>) {
    let mut terms = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();

    for obj in detection
        .objects
        .iter()
        .filter(|o| o.score > defaults::OBJECT_MIN_SCORE)
    {
        let name = obj.name.trim().to_lowercase();
        *counts.entry(name.clone()).or_insert(0) += 1;
        push_unique(&mut terms, name);
    }

    for label in detection
        .labels
        .iter()
        .filter(|l| l.score > defaults::LABEL_MIN_SCORE)
    {
        push_unique(&mut terms, label.description.trim().to_lowercase());
    }

    if !has_food_keyword(&terms) {
        let food_context = detection.labels.iter().any(|l| {
            l.score > defaults::FOOD_CONTEXT_MIN_SCORE
                && has_food_keyword(&[l.description.to_lowercase()])
        });
        if food_context {
            for label in detection
                .labels
                .iter()
                .filter(|l| l.score > defaults::FOOD_CONTEXT_LABEL_MIN_SCORE)
            {
                push_unique(&mut terms, label.description.trim().to_lowercase());
            }
        }
    }

    if terms.is_empty() {
        for label in detection.labels.iter().take(defaults::FALLBACK_LABEL_COUNT) {
            push_unique(&mut terms, label.description.trim().to_lowercase());
        }
    }

    (terms, counts)
}

/// Merge adjacent-in-meaning terms that form a known compound dish.
///
/// Each term is used in at most one compound. The compound takes the
/// position of its first word.
pub fn merge_compounds(terms: &[String]) -> Vec<String> {
    let mut consumed = vec![false; terms.len()];
    let mut merged = Vec::with_capacity(terms.len());

    for i in 0..terms.len() {
        if consumed[i] {
            continue;
        }
        let mut phrase = terms[i].clone();
        for j in 0..terms.len() {
            if i == j || consumed[j] {
                continue;
            }
            let candidate = format!("{} {}", terms[i], terms[j]);
            if KNOWN_COMPOUNDS.contains(&candidate.as_str()) {
                phrase = candidate;
                consumed[j] = true;
                break;
            }
        }
        consumed[i] = true;
        push_unique(&mut merged, phrase);
    }

    merged
}

/// Drop terms already spelled out inside a longer phrase.
pub fn drop_redundant(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .filter(|t| !terms.iter().any(|other| contains_words(other, t)))
        .cloned()
        .collect()
}

/// Drop generic terms, unless nothing else would remain.
pub fn drop_generic(terms: &[String]) -> Vec<String> {
    let specific: Vec<String> = terms.iter().filter(|t| !is_generic(t)).cloned().collect();
    if specific.is_empty() {
        terms.to_vec()
    } else {
        specific
    }
}

/// Compose collected terms into final food phrases.
pub fn compose_phrases(terms: &[String], counts: &HashMap<String, u32>) -> Vec<String> {
    let detected_number = terms.iter().find_map(|t| parse_count_word(t));
    let foods: Vec<String> = terms
        .iter()
        .filter(|t| parse_count_word(t).is_none())
        .cloned()
        .collect();

    let foods = drop_generic(&drop_redundant(&merge_compounds(&foods)));

    let mut number_used = false;
    let mut phrases = Vec::with_capacity(foods.len());
    for phrase in foods {
        let counted = counts.get(&phrase).copied().unwrap_or(1);
        let composed = if counted > 1 {
            with_count(&phrase, counted)
        } else if let Some(n) = detected_number.filter(|_| !number_used && is_countable(&phrase))
        {
            number_used = true;
            with_count(&phrase, n)
        } else {
            phrase
        };
        push_unique(&mut phrases, composed);
    }

    phrases
}

/// Full post-processing: detection in, deduplicated food phrases out.
///
/// Never returns an empty list.
pub fn food_phrases(detection: &Detection) -> Vec<String> {
    let (terms, counts) = collect_terms(detection);
    let phrases = compose_phrases(&terms, &counts);

    tracing::debug!(
        subsystem = "detector",
        component = "label_rules",
        terms = ?terms,
        phrases = ?phrases,
        "Composed food phrases"
    );

    if phrases.is_empty() {
        vec![defaults::UNIDENTIFIED_FOOD.to_string()]
    } else {
        phrases
    }
}
