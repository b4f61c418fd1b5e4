//! Static per-100g nutrition values for common foods.
//!
//! Keys are lowercase canonical food keys. The table is immutable and lives
//! for the whole process.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::MacroRecord;

const fn m(calories: f64, protein: f64, carbs: f64, fat: f64) -> MacroRecord {
    MacroRecord::new(calories, protein, carbs, fat)
}

/// Every entry of the table, in declaration order.
pub const NUTRITION_ENTRIES: &[(&str, MacroRecord)] = &[
    // Generic fallback
    ("food", m(200.0, 10.0, 25.0, 8.0)),
    // Basic foods
    ("pizza", m(266.0, 11.0, 33.0, 10.0)),
    ("apple", m(52.0, 0.3, 14.0, 0.2)),
    ("banana", m(89.0, 1.1, 23.0, 0.3)),
    ("orange", m(47.0, 0.9, 12.0, 0.1)),
    ("strawberry", m(32.0, 0.7, 7.7, 0.3)),
    ("grapes", m(69.0, 0.6, 18.0, 0.2)),
    ("watermelon", m(30.0, 0.6, 7.6, 0.2)),
    ("pineapple", m(50.0, 0.5, 13.0, 0.1)),
    ("mango", m(60.0, 0.8, 15.0, 0.4)),
    ("avocado", m(160.0, 2.0, 8.5, 15.0)),
    ("carrot", m(41.0, 0.9, 10.0, 0.2)),
    ("broccoli", m(34.0, 2.8, 7.0, 0.4)),
    ("spinach", m(23.0, 2.9, 3.6, 0.4)),
    ("tomato", m(18.0, 0.9, 3.9, 0.2)),
    ("potato", m(77.0, 2.0, 17.0, 0.1)),
    ("sweet potato", m(86.0, 1.6, 20.0, 0.1)),
    ("onion", m(40.0, 1.1, 9.3, 0.1)),
    ("garlic", m(149.0, 6.4, 33.0, 0.5)),
    ("rice", m(130.0, 2.7, 28.0, 0.3)),
    ("bread", m(265.0, 9.0, 49.0, 3.2)),
    ("pasta", m(158.0, 5.8, 31.0, 1.1)),
    ("oats", m(389.0, 16.9, 66.0, 6.9)),
    ("quinoa", m(120.0, 4.4, 21.0, 1.9)),
    ("chicken", m(239.0, 27.0, 0.0, 14.0)),
    ("steak", m(271.0, 26.0, 0.0, 19.0)),
    ("pork", m(242.0, 26.0, 0.0, 14.0)),
    ("lamb", m(294.0, 25.0, 0.0, 21.0)),
    ("fish", m(206.0, 22.0, 0.0, 12.0)),
    ("salmon", m(208.0, 20.0, 0.0, 13.0)),
    ("tuna", m(144.0, 30.0, 0.0, 1.0)),
    ("shrimp", m(99.0, 24.0, 0.0, 0.3)),
    ("egg", m(155.0, 13.0, 1.1, 11.0)),
    ("milk", m(42.0, 3.4, 5.0, 1.0)),
    ("cheese", m(402.0, 25.0, 1.3, 33.0)),
    ("yogurt", m(59.0, 3.5, 5.0, 3.3)),
    ("butter", m(717.0, 0.9, 0.1, 81.0)),
    ("olive oil", m(884.0, 0.0, 0.0, 100.0)),
    // Compound foods
    ("hamburger", m(295.0, 17.0, 30.0, 14.0)),
    ("french fries", m(312.0, 3.4, 41.0, 15.0)),
    ("salad", m(152.0, 1.2, 3.3, 15.0)),
    ("sandwich", m(290.0, 15.0, 38.0, 9.0)),
    ("sushi", m(150.0, 6.0, 30.0, 0.5)),
    ("taco", m(210.0, 9.0, 21.0, 10.0)),
    ("burrito", m(329.0, 14.0, 50.0, 9.0)),
    ("soup", m(75.0, 4.0, 9.0, 2.5)),
    ("ice cream", m(207.0, 3.5, 24.0, 11.0)),
    ("cake", m(367.0, 5.0, 50.0, 16.0)),
    ("cookie", m(502.0, 6.4, 61.0, 25.0)),
    ("chocolate", m(546.0, 7.8, 61.0, 31.0)),
];

static NUTRITION_TABLE: Lazy<HashMap<&'static str, MacroRecord>> =
    Lazy::new(|| NUTRITION_ENTRIES.iter().copied().collect());

/// Exact lookup by canonical key. The key is lowercased first.
pub fn lookup(key: &str) -> Option<MacroRecord> {
    NUTRITION_TABLE
        .get(key.trim().to_lowercase().as_str())
        .copied()
}

/// Number of foods in the table.
pub fn len() -> usize {
    NUTRITION_TABLE.len()
}

/// All canonical keys, in declaration order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    NUTRITION_ENTRIES.iter().map(|(k, _)| *k)
}
