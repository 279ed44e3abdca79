//! Keyword-based event classification.
//!
//! Event names in the archive are free text, but their wording is regular
//! enough that a keyword table sorts them into color categories reliably.
//! The table comes from [`ClassifierSettings`] so a deployment against a
//! differently worded corpus only swaps configuration, not code.

use crate::config::ClassifierSettings;
use crate::models::datapoint::EventCategory;

/// A compiled classification table.
///
/// Rules are evaluated in order and the first keyword hit wins, so more
/// specific rules belong before generic ones. Matching is substring based
/// on the lowercased event name.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    category: EventCategory,
    keywords: Vec<String>,
}

impl EventClassifier {
    /// Compile the configured rule table.
    pub fn new(settings: &ClassifierSettings) -> Self {
        let rules = settings
            .rules
            .iter()
            .map(|rule| CompiledRule {
                category: rule.category,
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .filter(|rule| !rule.keywords.is_empty())
            .collect();
        Self { rules }
    }

    /// Classify an event by its name.
    ///
    /// Falls through to [`EventCategory::Other`] when no keyword matches,
    /// so every event always has a category.
    pub fn classify(&self, name: &str) -> EventCategory {
        let lowered = name.to_lowercase();
        for rule in &self.rules {
            if rule.keywords.iter().any(|k| lowered.contains(k.as_str())) {
                return rule.category;
            }
        }
        EventCategory::Other
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::new(&ClassifierSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryRule;

    #[test]
    fn test_default_table_classifies_common_names() {
        let classifier = EventClassifier::default();
        assert_eq!(
            classifier.classify("Gedenktafel enthüllt"),
            EventCategory::Memorial
        );
        assert_eq!(
            classifier.classify("Zweiggasse benannt"),
            EventCategory::Street
        );
        assert_eq!(
            classifier.classify("Theodor-Körner-Preis verliehen"),
            EventCategory::Prize
        );
        assert_eq!(
            classifier.classify("Internationales Symposium"),
            EventCategory::Conference
        );
        assert_eq!(
            classifier.classify("100. Jahrestag der Geburt"),
            EventCategory::Anniversary
        );
        assert_eq!(
            classifier.classify("Ausstellung im Jüdischen Museum"),
            EventCategory::Exhibition
        );
        assert_eq!(classifier.classify("Flucht ins Exil"), EventCategory::Exile);
    }

    #[test]
    fn test_unknown_names_fall_through_to_other() {
        let classifier = EventClassifier::default();
        assert_eq!(classifier.classify("Ehrengrab gewidmet"), EventCategory::Other);
        assert_eq!(classifier.classify(""), EventCategory::Other);
    }

    #[test]
    fn test_matching_ignores_case() {
        let classifier = EventClassifier::default();
        assert_eq!(classifier.classify("DENKMAL"), EventCategory::Memorial);
        assert_eq!(
            classifier.classify("Hermann-Leopoldi-Platz"),
            EventCategory::Street
        );
    }

    #[test]
    fn test_first_rule_wins() {
        // "Ausstellungsstraße" carries both a street and an exhibition
        // keyword, and rule order decides.
        let settings = ClassifierSettings {
            rules: vec![
                CategoryRule {
                    category: EventCategory::Exhibition,
                    keywords: vec!["ausstellung".to_string()],
                },
                CategoryRule {
                    category: EventCategory::Street,
                    keywords: vec!["straße".to_string()],
                },
            ],
        };
        let classifier = EventClassifier::new(&settings);
        assert_eq!(
            classifier.classify("Ausstellungsstraße"),
            EventCategory::Exhibition
        );
    }

    #[test]
    fn test_swapped_table_replaces_defaults() {
        let settings = ClassifierSettings {
            rules: vec![CategoryRule {
                category: EventCategory::Street,
                keywords: vec!["rue".to_string(), "avenue".to_string()],
            }],
        };
        let classifier = EventClassifier::new(&settings);
        assert_eq!(classifier.classify("Rue de Rivoli"), EventCategory::Street);
        // The German defaults are gone.
        assert_eq!(classifier.classify("Denkmal"), EventCategory::Other);
    }

    #[test]
    fn test_blank_keywords_are_dropped() {
        let settings = ClassifierSettings {
            rules: vec![CategoryRule {
                category: EventCategory::Prize,
                keywords: vec!["  ".to_string(), String::new()],
            }],
        };
        let classifier = EventClassifier::new(&settings);
        // A rule with only blank keywords must not match everything.
        assert_eq!(classifier.classify("anything"), EventCategory::Other);
    }
}
