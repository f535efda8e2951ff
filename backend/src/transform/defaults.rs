//! Default resolution for creative and delivery fields.
//!
//! Objective-driven defaults come from the profile's objective table; an
//! objective without an entry silently falls back to the profile fallbacks.

use super::profile::MappingProfile;
use crate::error::{RowError, RowResult};
use crate::models::columns;
use crate::validation::validate_enum;

/// Call to action for a row: explicit values must be in the CTA set, blank
/// values follow the objective.
pub fn resolve_call_to_action(
    profile: &MappingProfile,
    objective: &str,
    cta: &str,
) -> RowResult<String> {
    if !cta.trim().is_empty() {
        return validate_enum(
            cta,
            &profile.enums.calls_to_action,
            columns::CALL_TO_ACTION,
            "",
        );
    }
    Ok(profile
        .objective_defaults(objective.trim())
        .map(|d| d.call_to_action.clone())
        .unwrap_or_else(|| profile.fallbacks.call_to_action.clone()))
}

/// Optimisation goal for a row. Explicit values are passed through as-is.
pub fn resolve_optimization_goal(profile: &MappingProfile, objective: &str, goal: &str) -> String {
    let goal = goal.trim();
    if !goal.is_empty() {
        return goal.to_string();
    }
    profile
        .objective_defaults(objective.trim())
        .map(|d| d.optimization_goal.clone())
        .unwrap_or_else(|| profile.fallbacks.optimization_goal.clone())
}

/// Link and URL tags for a row.
///
/// No link means no tracking. A link without tags gets the profile's default
/// tags; explicit tags must look like `utm_*=value` pairs.
pub fn resolve_link_and_tracking(
    profile: &MappingProfile,
    link: &str,
    tracking: &str,
) -> RowResult<(String, String)> {
    let link = link.trim();
    if link.is_empty() {
        return Ok((String::new(), String::new()));
    }

    let tracking = tracking.trim();
    if tracking.is_empty() {
        return Ok((link.to_string(), profile.fallbacks.url_tags.clone()));
    }

    if !tracking.contains('=') || !tracking.contains("utm_") {
        return Err(RowError::InvalidTrackingFormat {
            value: tracking.to_string(),
        });
    }
    Ok((link.to_string(), tracking.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cta_from_objective() {
        let profile = MappingProfile::revised();
        assert_eq!(resolve_call_to_action(&profile, "Leads", "").unwrap(), "SIGN_UP");
        assert_eq!(resolve_call_to_action(&profile, "Sales", " ").unwrap(), "SHOP_NOW");
    }

    #[test]
    fn test_cta_fallback_for_unmapped_objective() {
        let legacy = MappingProfile::legacy();
        assert_eq!(resolve_call_to_action(&legacy, "Reach", "").unwrap(), "LEARN_MORE");

        let revised = MappingProfile::revised();
        assert_eq!(resolve_call_to_action(&revised, "", "").unwrap(), "LEARN_MORE");
    }

    #[test]
    fn test_explicit_cta_is_validated() {
        let profile = MappingProfile::revised();
        assert_eq!(
            resolve_call_to_action(&profile, "Leads", "BOOK_NOW").unwrap(),
            "BOOK_NOW"
        );
        let err = resolve_call_to_action(&profile, "Leads", "CLICK_HERE").unwrap_err();
        assert_eq!(err.kind(), "InvalidEnumValue");
        assert!(err.to_string().starts_with("Call to Action:"));
    }

    #[test]
    fn test_optimization_goal() {
        let profile = MappingProfile::revised();
        assert_eq!(
            resolve_optimization_goal(&profile, "Leads", ""),
            "LEAD_GENERATION"
        );
        assert_eq!(
            resolve_optimization_goal(&profile, "Leads", " CUSTOM_GOAL "),
            "CUSTOM_GOAL"
        );
        assert_eq!(resolve_optimization_goal(&profile, "", ""), "LINK_CLICKS");
        assert_eq!(resolve_optimization_goal(&MappingProfile::legacy(), "Reach", ""), "");
    }

    #[test]
    fn test_blank_link_blanks_tracking() {
        let profile = MappingProfile::revised();
        assert_eq!(
            resolve_link_and_tracking(&profile, "", "utm_source=x").unwrap(),
            (String::new(), String::new())
        );
        assert_eq!(
            resolve_link_and_tracking(&profile, " ", "garbage").unwrap(),
            (String::new(), String::new())
        );
    }

    #[test]
    fn test_link_without_tracking_gets_default_tags() {
        let profile = MappingProfile::revised();
        let (link, tags) =
            resolve_link_and_tracking(&profile, "https://example.com/offer", "").unwrap();
        assert_eq!(link, "https://example.com/offer");
        assert_eq!(tags, profile.fallbacks.url_tags);
    }

    #[test]
    fn test_tracking_format_checked() {
        let profile = MappingProfile::revised();
        for bad in ["source=fb", "utm_source", "campaign"] {
            let err = resolve_link_and_tracking(&profile, "https://example.com", bad).unwrap_err();
            assert_eq!(err.kind(), "InvalidTrackingFormat", "value {bad}");
        }
        let (_, tags) = resolve_link_and_tracking(
            &profile,
            "https://example.com",
            " utm_source=fb&utm_campaign=spring ",
        )
        .unwrap();
        assert_eq!(tags, "utm_source=fb&utm_campaign=spring");
    }
}
