//! Per-row transformation into bulk-import records.
//!
//! Both builders are pure functions of an already-inherited row. Campaign
//! rows emit campaign fields only; adset rows re-validate the inherited
//! campaign fields and add ad set and creative fields, so an inherited bad
//! value surfaces on every adset row that carries it.

use super::defaults::{
    resolve_call_to_action, resolve_link_and_tracking, resolve_optimization_goal,
};
use super::inherit::ClassifiedRow;
use super::profile::MappingProfile;
use crate::error::RowResult;
use crate::models::columns::*;
use crate::models::{ErrorRecord, InputLevel, InputRow, OutputRecord};
use crate::validation::{
    coerce_datetime, normalize_gender, resolve_age_range, validate_enum, validate_list,
    validate_positive_number,
};

/// Value of the fixed `Advantage+ placements` flag.
pub const ADVANTAGE_PLACEMENTS_ON: &str = "true";

/// Build the record for a classified row, or the error record that replaces it.
pub fn transform_row(
    classified: &ClassifiedRow,
    profile: &MappingProfile,
) -> Result<OutputRecord, ErrorRecord> {
    let result = match classified.level {
        InputLevel::Campaign => build_campaign_record(&classified.row, profile),
        InputLevel::Adset => build_adset_record(&classified.row, profile),
    };
    result.map_err(|err| {
        ErrorRecord::new(
            classified.row.number,
            classified.level.as_str(),
            err.to_string(),
        )
    })
}

/// Campaign-only record.
pub fn build_campaign_record(row: &InputRow, profile: &MappingProfile) -> RowResult<OutputRecord> {
    let mut out = OutputRecord::new();
    write_campaign_fields(&mut out, row, profile, row.text(CAMPAIGN_DAILY_BUDGET))?;
    Ok(out)
}

/// Combined campaign + ad set + creative record.
pub fn build_adset_record(row: &InputRow, profile: &MappingProfile) -> RowResult<OutputRecord> {
    let fallbacks = &profile.fallbacks;
    let enums = &profile.enums;

    // Ad set budget wins over an inherited campaign budget.
    let adset_budget = row.text(AD_SET_DAILY_BUDGET);
    let campaign_budget = if adset_budget.is_empty() {
        row.text(CAMPAIGN_DAILY_BUDGET)
    } else {
        ""
    };

    let mut out = OutputRecord::new();
    let objective = write_campaign_fields(&mut out, row, profile, campaign_budget)?;

    let special_category = row.get(SPECIAL_AD_CATEGORIES).is_some();
    let (age_min, age_max) =
        resolve_age_range(row.text(AGE_MIN), row.text(AGE_MAX), special_category, profile.age)?;
    let (link, url_tags) =
        resolve_link_and_tracking(profile, row.text(LINK), row.text(URL_TAGS))?;
    let cta = resolve_call_to_action(profile, &objective, row.text(CALL_TO_ACTION))?;
    let goal = resolve_optimization_goal(profile, &objective, row.text(OPTIMISATION_GOAL));

    // Explicit placements are checked but not emitted in simple mode.
    validate_list(row.text(PLACEMENTS), &enums.placements, PLACEMENTS)?;

    // Ad set
    out.set(AD_SET_NAME, row.text(AD_SET_NAME));
    out.set(
        AD_SET_RUN_STATUS,
        validate_enum(
            row.text(AD_SET_RUN_STATUS),
            &enums.status,
            AD_SET_RUN_STATUS,
            &fallbacks.status,
        )?,
    );
    out.set(
        AD_SET_DAILY_BUDGET,
        validate_positive_number(adset_budget, AD_SET_DAILY_BUDGET, true, &fallbacks.budget)?,
    );
    out.set(AD_SET_TIME_START, coerce_datetime(row.text(AD_SET_TIME_START), AD_SET_TIME_START)?);
    out.set(AD_SET_TIME_STOP, coerce_datetime(row.text(AD_SET_TIME_STOP), AD_SET_TIME_STOP)?);
    out.set(COUNTRIES, row.text(COUNTRIES));
    out.set(AGE_MIN, age_min);
    out.set(AGE_MAX, age_max);
    out.set(GENDER, normalize_gender(row.text(GENDER), &enums.genders, &fallbacks.gender)?);
    out.set(CUSTOM_AUDIENCES, row.text(CUSTOM_AUDIENCES));
    out.set(EXCLUDED_CUSTOM_AUDIENCES, row.text(EXCLUDED_CUSTOM_AUDIENCES));
    out.set(OPTIMISATION_GOAL, goal);

    // Creative
    out.set(AD_NAME, row.text(AD_NAME));
    out.set(
        AD_STATUS,
        validate_enum(row.text(AD_STATUS), &enums.status, AD_STATUS, &fallbacks.status)?,
    );
    out.set(TITLE, row.text(TITLE));
    out.set(BODY, row.text(BODY));
    out.set(LINK, link);
    out.set(URL_TAGS, url_tags);
    out.set(CALL_TO_ACTION, cta);
    out.set(IMAGE_FILE_NAME, row.text(IMAGE_FILE_NAME));

    Ok(out)
}

/// Validate and write the campaign block; returns the validated objective.
fn write_campaign_fields(
    out: &mut OutputRecord,
    row: &InputRow,
    profile: &MappingProfile,
    campaign_budget: &str,
) -> RowResult<String> {
    let fallbacks = &profile.fallbacks;
    let enums = &profile.enums;

    let objective = validate_enum(
        row.text(CAMPAIGN_OBJECTIVE),
        &enums.objectives,
        CAMPAIGN_OBJECTIVE,
        "",
    )?;

    out.set(CAMPAIGN_NAME, row.text(CAMPAIGN_NAME));
    out.set(
        CAMPAIGN_STATUS,
        validate_enum(
            row.text(CAMPAIGN_STATUS),
            &enums.status,
            CAMPAIGN_STATUS,
            &fallbacks.status,
        )?,
    );
    out.set(
        SPECIAL_AD_CATEGORIES,
        validate_list(
            row.text(SPECIAL_AD_CATEGORIES),
            &enums.special_ad_categories,
            SPECIAL_AD_CATEGORIES,
        )?,
    );
    out.set(SPECIAL_AD_CATEGORY_COUNTRY, row.text(SPECIAL_AD_CATEGORY_COUNTRY));
    out.set(
        BUYING_TYPE,
        validate_enum(
            row.text(BUYING_TYPE),
            &enums.buying_types,
            BUYING_TYPE,
            &fallbacks.buying_type,
        )?,
    );
    out.set(CAMPAIGN_OBJECTIVE, objective.as_str());
    out.set(
        CAMPAIGN_BID_STRATEGY,
        validate_enum(
            row.text(CAMPAIGN_BID_STRATEGY),
            &enums.bid_strategies,
            CAMPAIGN_BID_STRATEGY,
            &fallbacks.bid_strategy,
        )?,
    );
    out.set(
        CAMPAIGN_DAILY_BUDGET,
        validate_positive_number(campaign_budget, CAMPAIGN_DAILY_BUDGET, true, &fallbacks.budget)?,
    );
    out.set(
        CAMPAIGN_START_TIME,
        coerce_datetime(row.text(CAMPAIGN_START_TIME), CAMPAIGN_START_TIME)?,
    );
    out.set(CAMPAIGN_STOP_TIME, coerce_datetime(row.text(CAMPAIGN_STOP_TIME), CAMPAIGN_STOP_TIME)?);
    out.set(ADVANTAGE_PLACEMENTS, ADVANTAGE_PLACEMENTS_ON);

    Ok(objective)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adset(pairs: &[(&str, &str)]) -> InputRow {
        let mut row = InputRow::from_pairs(2, pairs.iter().copied());
        row.set(INPUT_LEVEL, "adset");
        row
    }

    #[test]
    fn test_campaign_record_defaults() {
        let row = InputRow::from_pairs(
            1,
            [
                (INPUT_LEVEL, "campaign"),
                (CAMPAIGN_NAME, "Spring"),
                (CAMPAIGN_OBJECTIVE, "Leads"),
                (CAMPAIGN_DAILY_BUDGET, "99.5"),
                (CAMPAIGN_START_TIME, "2024-05-01"),
            ],
        );
        let out = build_campaign_record(&row, &MappingProfile::revised()).unwrap();

        assert_eq!(out.get(CAMPAIGN_NAME), Some("Spring"));
        assert_eq!(out.get(CAMPAIGN_STATUS), Some("ACTIVE"));
        assert_eq!(out.get(BUYING_TYPE), Some("AUCTION"));
        assert_eq!(out.get(CAMPAIGN_BID_STRATEGY), Some("Lowest cost"));
        assert_eq!(out.get(CAMPAIGN_DAILY_BUDGET), Some("100"));
        assert_eq!(out.get(CAMPAIGN_START_TIME), Some("2024-05-01 00:00"));
        assert_eq!(out.get(ADVANTAGE_PLACEMENTS), Some("true"));
        assert_eq!(out.get(AD_SET_NAME), None);
        assert_eq!(out.get(GENDER), None);
    }

    #[test]
    fn test_campaign_record_rejects_unknown_objective() {
        let row = InputRow::from_pairs(1, [(CAMPAIGN_OBJECTIVE, "Fame")]);
        let err = build_campaign_record(&row, &MappingProfile::revised()).unwrap_err();
        assert!(err.to_string().starts_with("Campaign Objective: 'Fame'"));
    }

    #[test]
    fn test_budget_conflict_adset_wins() {
        let row = adset(&[(CAMPAIGN_DAILY_BUDGET, "100"), (AD_SET_DAILY_BUDGET, "50")]);
        let out = build_adset_record(&row, &MappingProfile::revised()).unwrap();
        assert_eq!(out.get(CAMPAIGN_DAILY_BUDGET), Some(""));
        assert_eq!(out.get(AD_SET_DAILY_BUDGET), Some("50"));
    }

    #[test]
    fn test_campaign_budget_kept_without_adset_budget() {
        let row = adset(&[(CAMPAIGN_DAILY_BUDGET, "100")]);
        let out = build_adset_record(&row, &MappingProfile::revised()).unwrap();
        assert_eq!(out.get(CAMPAIGN_DAILY_BUDGET), Some("100"));
        assert_eq!(out.get(AD_SET_DAILY_BUDGET), Some(""));
    }

    #[test]
    fn test_cleared_campaign_budget_is_not_validated() {
        let row = adset(&[(CAMPAIGN_DAILY_BUDGET, "lots"), (AD_SET_DAILY_BUDGET, "50")]);
        let out = build_adset_record(&row, &MappingProfile::revised()).unwrap();
        assert_eq!(out.get(AD_SET_DAILY_BUDGET), Some("50"));
    }

    #[test]
    fn test_adset_defaults() {
        let row = adset(&[
            (CAMPAIGN_OBJECTIVE, "Leads"),
            (AD_SET_NAME, "Young"),
            (LINK, "https://example.com"),
        ]);
        let profile = MappingProfile::revised();
        let out = build_adset_record(&row, &profile).unwrap();

        assert_eq!(out.get(AD_SET_RUN_STATUS), Some("ACTIVE"));
        assert_eq!(out.get(AD_STATUS), Some("ACTIVE"));
        assert_eq!(out.get(AGE_MIN), Some("13"));
        assert_eq!(out.get(AGE_MAX), Some("65"));
        assert_eq!(out.get(GENDER), Some("All"));
        assert_eq!(out.get(CALL_TO_ACTION), Some("SIGN_UP"));
        assert_eq!(out.get(OPTIMISATION_GOAL), Some("LEAD_GENERATION"));
        assert_eq!(out.get(URL_TAGS), Some(profile.fallbacks.url_tags.as_str()));
        assert_eq!(out.get(ADVANTAGE_PLACEMENTS), Some("true"));
    }

    #[test]
    fn test_special_category_raises_min_age() {
        let row = adset(&[
            (SPECIAL_AD_CATEGORIES, "HOUSING"),
            (AGE_MIN, "10"),
            (AGE_MAX, "70"),
        ]);
        let out = build_adset_record(&row, &MappingProfile::revised()).unwrap();
        assert_eq!(out.get(AGE_MIN), Some("18"));
        assert_eq!(out.get(AGE_MAX), Some("65"));
    }

    #[test]
    fn test_unknown_placement_rejected() {
        let row = adset(&[(PLACEMENTS, "feed, billboard")]);
        let err = build_adset_record(&row, &MappingProfile::revised()).unwrap_err();
        assert!(err.to_string().contains("'billboard'"));
    }

    #[test]
    fn test_error_record_tags_level() {
        let classified = ClassifiedRow {
            level: InputLevel::Adset,
            row: adset(&[(AGE_MIN, "40"), (AGE_MAX, "20")]),
        };
        let err = transform_row(&classified, &MappingProfile::revised()).unwrap_err();
        assert_eq!(err.row, 2);
        assert_eq!(err.field, "adset");
        assert!(err.error.contains("Invalid age range"));
    }
}
