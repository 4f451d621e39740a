//! Deterministic offline analysis.
//!
//! Keyword matching against fixed tables. Used when no API credential is
//! configured and as the fallback whenever the remote analyzer fails.

use crate::models::{DetectedItem, ScanResult};

/// (keyword, estimated cost, confidence). Table order is output order.
pub const KEYWORD_TABLE: &[(&str, f64, f64)] = &[
    ("apple", 2.49, 0.88),
    ("banana", 1.29, 0.95),
    ("milk", 3.99, 0.92),
    ("bread", 2.79, 0.85),
    ("chicken", 5.99, 0.78),
    ("rice", 3.49, 0.82),
    ("tomato", 2.99, 0.87),
    ("cheese", 4.49, 0.80),
    ("egg", 2.99, 0.90),
    ("yogurt", 1.99, 0.85),
];

/// Emitted when no keyword matches: (name, confidence, estimated cost).
pub const DEFAULT_ITEMS: &[(&str, f64, f64)] = &[
    ("Mixed Groceries", 0.70, 12.99),
    ("Fresh Produce", 0.65, 8.49),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// At least one listed item is present
    Any(&'static [&'static str]),
    /// Every listed item is present
    All(&'static [&'static str]),
    Always,
}

impl Match {
    fn matches(&self, names: &[String]) -> bool {
        let present = |wanted: &&str| names.iter().any(|n| n == wanted);
        match self {
            Match::Any(wanted) => wanted.iter().any(present),
            Match::All(wanted) => wanted.iter().all(present),
            Match::Always => true,
        }
    }
}

/// First matching rule wins.
pub const NUTRITION_RULES: &[(Match, &str)] = &[
    (
        Match::Any(&["banana", "apple"]),
        "High in potassium, vitamin C, and fiber. Great for heart health and digestion. \
         Natural sugars provide quick energy.",
    ),
    (
        Match::Any(&["milk", "cheese"]),
        "Rich in calcium and protein. Good for bone health and muscle development. \
         Contains essential vitamins A and D.",
    ),
    (
        Match::Any(&["chicken", "egg"]),
        "Excellent source of lean protein and essential amino acids. \
         Supports muscle building and repair.",
    ),
    (
        Match::Always,
        "Balanced mix of nutrients including carbohydrates, proteins, and healthy fats. \
         Provides sustained energy and essential vitamins.",
    ),
];

/// First matching rule wins.
pub const RECIPE_RULES: &[(Match, [&str; 3])] = &[
    (
        Match::All(&["banana", "milk"]),
        ["Banana Smoothie", "Overnight Oats", "Banana Pancakes"],
    ),
    (
        Match::Any(&["apple"]),
        ["Apple Crisp", "Waldorf Salad", "Apple Cinnamon Oatmeal"],
    ),
    (
        Match::Any(&["chicken"]),
        ["Grilled Chicken Salad", "Chicken Stir Fry", "Chicken Soup"],
    ),
    (
        Match::Any(&["rice"]),
        ["Fried Rice", "Rice Bowl", "Stuffed Peppers"],
    ),
    (
        Match::Always,
        ["Quick Stir Fry", "Hearty Soup", "Nutritious Salad"],
    ),
];

/// Analyze `text` without any I/O. Same input, same output.
pub fn mock_analyze(text: &str) -> ScanResult {
    let detected_items = extract_items(text);
    let names: Vec<String> = detected_items
        .iter()
        .map(|item| item.name.to_lowercase())
        .collect();

    let total_estimated_cost = detected_items.iter().map(|i| i.estimated_cost).sum();

    ScanResult {
        recognized_text: text.to_string(),
        nutritional_analysis: nutrition_summary(&names).to_string(),
        recipe_suggestions: recipe_suggestions(&names),
        detected_items,
        total_estimated_cost,
        health_insights: Vec::new(),
    }
}

fn extract_items(text: &str) -> Vec<DetectedItem> {
    let lowercase = text.to_lowercase();

    let items: Vec<DetectedItem> = KEYWORD_TABLE
        .iter()
        .filter(|(keyword, _, _)| lowercase.contains(keyword))
        .map(|(keyword, cost, confidence)| {
            DetectedItem::new(capitalize(keyword), *confidence, *cost)
        })
        .collect();

    if !items.is_empty() {
        return items;
    }

    DEFAULT_ITEMS
        .iter()
        .map(|(name, confidence, cost)| DetectedItem::new(*name, *confidence, *cost))
        .collect()
}

fn nutrition_summary(names: &[String]) -> &'static str {
    NUTRITION_RULES
        .iter()
        .find(|(rule, _)| rule.matches(names))
        .map(|(_, text)| *text)
        .unwrap_or_default()
}

fn recipe_suggestions(names: &[String]) -> Vec<String> {
    RECIPE_RULES
        .iter()
        .find(|(rule, _)| rule.matches(names))
        .map(|(_, recipes)| recipes.iter().map(|r| r.to_string()).collect())
        .unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(result: &ScanResult) -> Vec<&str> {
        result.detected_items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_banana_and_milk() {
        let result = mock_analyze("Receipt: 1x Organic BANANA, Whole Milk 1gal");

        assert_eq!(names(&result), vec!["Banana", "Milk"]);
        assert_eq!(result.detected_items[0].confidence, 0.95);
        assert_eq!(result.detected_items[0].estimated_cost, 1.29);
        assert_eq!(result.detected_items[1].confidence, 0.92);
        assert_eq!(result.detected_items[1].estimated_cost, 3.99);

        // Fruit rule is checked before dairy
        assert!(result.nutritional_analysis.starts_with("High in potassium"));
        assert_eq!(
            result.recipe_suggestions,
            vec!["Banana Smoothie", "Overnight Oats", "Banana Pancakes"]
        );
    }

    #[test]
    fn test_no_keyword_yields_defaults() {
        let result = mock_analyze("xyz qwerty");

        assert_eq!(names(&result), vec!["Mixed Groceries", "Fresh Produce"]);
        assert_eq!(result.detected_items[0].confidence, 0.70);
        assert_eq!(result.detected_items[1].confidence, 0.65);
        assert!((result.total_estimated_cost - 21.48).abs() < 1e-9);
        assert!(result.nutritional_analysis.starts_with("Balanced mix"));
        assert_eq!(
            result.recipe_suggestions,
            vec!["Quick Stir Fry", "Hearty Soup", "Nutritious Salad"]
        );
    }

    #[test]
    fn test_empty_text_yields_defaults() {
        let result = mock_analyze("");
        assert_eq!(result.detected_items.len(), 2);
        assert_eq!(result.recognized_text, "");
    }

    #[test]
    fn test_table_order_and_single_match() {
        let result = mock_analyze("yogurt egg egg egg apple apple");

        assert_eq!(names(&result), vec!["Apple", "Egg", "Yogurt"]);
        assert!((result.total_estimated_cost - (2.49 + 2.99 + 1.99)).abs() < 1e-9);
    }

    #[test]
    fn test_substring_matching() {
        // "eggplant" contains "egg", "rice" inside "price"
        let result = mock_analyze("EGGPLANT price 3.00");
        assert_eq!(names(&result), vec!["Rice", "Egg"]);
    }

    #[test]
    fn test_total_matches_item_sum() {
        for text in ["chicken rice tomato", "cheese bread", "nothing here", "MILK"] {
            let result = mock_analyze(text);
            assert!(!result.detected_items.is_empty());
            let sum: f64 = result.detected_items.iter().map(|i| i.estimated_cost).sum();
            assert!((result.total_estimated_cost - sum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "apple banana milk chicken rice";
        assert_eq!(mock_analyze(text), mock_analyze(text));
    }

    #[test]
    fn test_nutrition_priority() {
        let dairy = mock_analyze("cheese and milk and chicken");
        assert!(dairy.nutritional_analysis.starts_with("Rich in calcium"));

        let protein = mock_analyze("chicken thighs, eggs");
        assert!(protein.nutritional_analysis.starts_with("Excellent source of lean protein"));
    }

    #[test]
    fn test_recipe_priority() {
        // Banana without milk falls through to the default branch
        let banana_only = mock_analyze("banana");
        assert_eq!(banana_only.recipe_suggestions[0], "Quick Stir Fry");

        let apple_chicken = mock_analyze("apple chicken");
        assert_eq!(apple_chicken.recipe_suggestions[0], "Apple Crisp");

        let chicken_rice = mock_analyze("chicken rice");
        assert_eq!(chicken_rice.recipe_suggestions[0], "Grilled Chicken Salad");

        let rice = mock_analyze("basmati rice");
        assert_eq!(
            rice.recipe_suggestions,
            vec!["Fried Rice", "Rice Bowl", "Stuffed Peppers"]
        );
    }

    #[test]
    fn test_rule_tables_end_with_catch_all() {
        assert_eq!(NUTRITION_RULES.last().map(|(rule, _)| *rule), Some(Match::Always));
        assert_eq!(RECIPE_RULES.last().map(|(rule, _)| *rule), Some(Match::Always));
    }
}
