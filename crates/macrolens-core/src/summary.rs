//! Human-readable macro summary attached to each result.

use crate::models::MacroRecord;

/// Capitalize the first letter of every word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Summary text for a label, or a not-found sentence when `macros` is absent.
pub fn macro_summary(label: &str, macros: Option<&MacroRecord>) -> String {
    let Some(m) = macros else {
        return format!("Could not find nutritional information for {}.", label);
    };

    let mut lines = vec![
        format!("Identified food: {}", title_case(label)),
        "Nutritional information (per 100g):".to_string(),
        format!("• Calories: {} kcal", m.calories),
        format!("• Protein: {}g", m.protein),
        format!("• Carbohydrates: {}g", m.carbs),
        format!("• Fat: {}g", m.fat),
    ];

    if m.calories > 0.0 {
        lines.push(format!(
            "• Protein: {:.1}% of calories",
            m.protein * 4.0 / m.calories * 100.0
        ));
        lines.push(format!(
            "• Carbs: {:.1}% of calories",
            m.carbs * 4.0 / m.calories * 100.0
        ));
        lines.push(format!(
            "• Fat: {:.1}% of calories",
            m.fat * 9.0 / m.calories * 100.0
        ));
    }

    lines.join("\n")
}
