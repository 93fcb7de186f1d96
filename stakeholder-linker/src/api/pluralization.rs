//! Entity set name resolution for the Dataverse Web API
//!
//! The Web API addresses collections by entity *set* name, while the schema
//! configuration speaks in logical names. Dataverse derives the set name with
//! English plural rules, so we mirror them here and let config override the
//! odd ones out.

use std::collections::HashMap;

/// Resolve the entity set name for a logical name, honouring explicit overrides
pub fn entity_set_name(logical_name: &str, overrides: &HashMap<String, String>) -> String {
    match overrides.get(logical_name) {
        Some(set_name) => set_name.clone(),
        None => pluralize_entity_name(logical_name),
    }
}

/// Convert a logical entity name to its plural form
pub fn pluralize_entity_name(entity_name: &str) -> String {
    if entity_name.is_empty() {
        return String::new();
    }

    let lower = entity_name.to_lowercase();

    if lower.ends_with('s')
        || lower.ends_with("sh")
        || lower.ends_with("ch")
        || lower.ends_with('x')
    {
        return format!("{}es", entity_name);
    }

    if lower.ends_with('z') && !lower.ends_with("tz") {
        return format!("{}zes", entity_name);
    }

    // consonant + y -> ies
    if let Some(stem) = entity_name.strip_suffix(['y', 'Y']) {
        if let Some(prev) = stem.chars().last() {
            if !"aeiouAEIOU".contains(prev) {
                return format!("{}ies", stem);
            }
        }
    }

    if let Some(stem) = entity_name.strip_suffix("fe") {
        return format!("{}ves", stem);
    }
    if let Some(stem) = entity_name.strip_suffix('f') {
        return format!("{}ves", stem);
    }

    // consonant + o -> oes
    if let Some(stem) = entity_name.strip_suffix(['o', 'O']) {
        if let Some(prev) = stem.chars().last() {
            if !"aeiouAEIOU".contains(prev) {
                return format!("{}es", entity_name);
            }
        }
    }

    format!("{}s", entity_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_entities() {
        assert_eq!(
            pluralize_entity_name("environmentvariabledefinition"),
            "environmentvariabledefinitions"
        );
        assert_eq!(
            pluralize_entity_name("environmentvariablevalue"),
            "environmentvariablevalues"
        );
        assert_eq!(pluralize_entity_name("opportunity"), "opportunities");
    }

    #[test]
    fn test_custom_prefixed_entities() {
        assert_eq!(pluralize_entity_name("crff8_stakeholder"), "crff8_stakeholders");
        assert_eq!(
            pluralize_entity_name("crff8_stakeholder_opportunity"),
            "crff8_stakeholder_opportunities"
        );
        assert_eq!(pluralize_entity_name("crff8_scaccount"), "crff8_scaccounts");
    }

    #[test]
    fn test_english_endings() {
        assert_eq!(pluralize_entity_name("address"), "addresses");
        assert_eq!(pluralize_entity_name("quiz"), "quizzes");
        assert_eq!(pluralize_entity_name("survey"), "surveys");
        assert_eq!(pluralize_entity_name("knife"), "knives");
        assert_eq!(pluralize_entity_name("hero"), "heroes");
        assert_eq!(pluralize_entity_name("video"), "videos");
    }

    #[test]
    fn test_override_wins() {
        let mut overrides = HashMap::new();
        overrides.insert("crff8_stakeholder".to_string(), "crff8_people".to_string());

        assert_eq!(entity_set_name("crff8_stakeholder", &overrides), "crff8_people");
        assert_eq!(entity_set_name("opportunity", &overrides), "opportunities");
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(pluralize_entity_name(""), "");
    }
}
