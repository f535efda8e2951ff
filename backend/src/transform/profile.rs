//! Mapping profiles: enumerations, objective defaults and fallbacks.
//!
//! Two revisions of the mapping rules exist and disagree on a few defaults
//! (baseline minimum age, fallback budget, default tracking tags). Both ship
//! as built-in profiles; [`MappingProfile::revised`] is the default.
//!
//! Custom profiles are JSON documents validated against the embedded
//! `schemas/mapping-profile.json` before deserialization.
//!
//! ```rust,ignore
//! use bulkmap::MappingProfile;
//!
//! let profile = MappingProfile::load("legacy")?;           // built-in
//! let profile = MappingProfile::load("profiles/acme.json")?; // file
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{ProfileError, ProfileResult};

/// Embedded JSON schema for profile files.
const PROFILE_SCHEMA: &str = include_str!("../../schemas/mapping-profile.json");

/// Complete rule set for one transform run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enums: Enumerations,
    /// Objective -> recommended optimisation goal and call to action.
    pub objective_defaults: BTreeMap<String, ObjectiveDefaults>,
    pub fallbacks: Fallbacks,
    pub age: AgeBounds,
}

/// Closed value sets. Sets are ordered so error messages list them sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enumerations {
    pub status: BTreeSet<String>,
    pub objectives: BTreeSet<String>,
    pub buying_types: BTreeSet<String>,
    pub bid_strategies: BTreeSet<String>,
    pub calls_to_action: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub placements: BTreeSet<String>,
    pub special_ad_categories: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveDefaults {
    pub optimization_goal: String,
    pub call_to_action: String,
}

/// Values used when a cell is blank or an objective has no table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallbacks {
    pub status: String,
    pub buying_type: String,
    pub bid_strategy: String,
    pub call_to_action: String,
    pub optimization_goal: String,
    /// Used for budgets that may not be blank.
    pub budget: String,
    /// Tracking tags applied to links without URL Tags.
    pub url_tags: String,
    pub gender: String,
}

/// Platform age bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBounds {
    pub min: i64,
    pub max: i64,
    /// Minimum age once a special ad category is declared.
    pub special_category_min: i64,
}

impl AgeBounds {
    /// Effective minimum for a row.
    pub fn effective_min(&self, special_category: bool) -> i64 {
        if special_category {
            self.min.max(self.special_category_min)
        } else {
            self.min
        }
    }
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn objective(goal: &str, cta: &str) -> ObjectiveDefaults {
    ObjectiveDefaults {
        optimization_goal: goal.to_string(),
        call_to_action: cta.to_string(),
    }
}

const STATUSES: &[&str] = &["ACTIVE", "PAUSED", "ARCHIVED", "DELETED"];
const BUYING_TYPES: &[&str] = &["AUCTION", "FIXED_PRICE"];
const BID_STRATEGIES: &[&str] = &["Lowest cost", "Cost cap", "ROAS goal", "Bid cap"];
const GENDERS: &[&str] = &["All", "Male", "Female"];
const PLACEMENTS: &[&str] = &[
    "facebook",
    "instagram",
    "audience_network",
    "messenger",
    "feed",
    "stories",
    "reels",
    "instream_video",
    "marketplace",
];
const SPECIAL_AD_CATEGORIES: &[&str] = &[
    "CREDIT",
    "EMPLOYMENT",
    "HOUSING",
    "ISSUES_ELECTIONS_POLITICS",
];
const LEGACY_OBJECTIVES: &[&str] = &[
    "Traffic",
    "Leads",
    "Conversions",
    "Sales",
    "Video Views",
    "Reach",
    "Engagement",
    "App Installs",
];
const LEGACY_CTAS: &[&str] = &[
    "LEARN_MORE",
    "SIGN_UP",
    "GET_QUOTE",
    "SHOP_NOW",
    "SUBSCRIBE",
    "APPLY_NOW",
    "CONTACT_US",
    "BOOK_NOW",
];

impl MappingProfile {
    /// Current rule set: ages 13-65 (18 with a special ad category),
    /// fallback budget "1", paid-social tracking tags.
    pub fn revised() -> Self {
        let mut objectives = set(LEGACY_OBJECTIVES);
        objectives.extend(set(&["Awareness", "App Promotion"]));

        let mut ctas = set(LEGACY_CTAS);
        ctas.extend(set(&["DOWNLOAD", "WATCH_MORE", "ORDER_NOW", "GET_OFFER"]));

        let mut objective_defaults = legacy_objective_defaults();
        objective_defaults.insert("Reach".into(), objective("REACH", "LEARN_MORE"));
        objective_defaults.insert("Awareness".into(), objective("REACH", "LEARN_MORE"));
        objective_defaults.insert(
            "Engagement".into(),
            objective("POST_ENGAGEMENT", "LEARN_MORE"),
        );
        objective_defaults.insert("App Installs".into(), objective("APP_INSTALLS", "DOWNLOAD"));
        objective_defaults.insert("App Promotion".into(), objective("APP_INSTALLS", "DOWNLOAD"));

        Self {
            name: "revised".into(),
            description: "Current mapping rules".into(),
            enums: Enumerations {
                status: set(STATUSES),
                objectives,
                buying_types: set(BUYING_TYPES),
                bid_strategies: set(BID_STRATEGIES),
                calls_to_action: ctas,
                genders: set(GENDERS),
                placements: set(PLACEMENTS),
                special_ad_categories: set(SPECIAL_AD_CATEGORIES),
            },
            objective_defaults,
            fallbacks: Fallbacks {
                status: "ACTIVE".into(),
                buying_type: "AUCTION".into(),
                bid_strategy: "Lowest cost".into(),
                call_to_action: "LEARN_MORE".into(),
                optimization_goal: "LINK_CLICKS".into(),
                budget: "1".into(),
                url_tags: "utm_source=facebook&utm_medium=paid_social".into(),
                gender: "All".into(),
            },
            age: AgeBounds {
                min: 13,
                max: 65,
                special_category_min: 18,
            },
        }
    }

    /// First rule set: baseline minimum age 18, fallback budget "0", cpc
    /// tracking tags, no optimisation goal for unmapped objectives.
    pub fn legacy() -> Self {
        Self {
            name: "legacy".into(),
            description: "First-generation mapping rules".into(),
            enums: Enumerations {
                status: set(STATUSES),
                objectives: set(LEGACY_OBJECTIVES),
                buying_types: set(BUYING_TYPES),
                bid_strategies: set(BID_STRATEGIES),
                calls_to_action: set(LEGACY_CTAS),
                genders: set(GENDERS),
                placements: set(PLACEMENTS),
                special_ad_categories: set(SPECIAL_AD_CATEGORIES),
            },
            objective_defaults: legacy_objective_defaults(),
            fallbacks: Fallbacks {
                status: "ACTIVE".into(),
                buying_type: "AUCTION".into(),
                bid_strategy: "Lowest cost".into(),
                call_to_action: "LEARN_MORE".into(),
                optimization_goal: String::new(),
                budget: "0".into(),
                url_tags: "utm_source=facebook&utm_medium=cpc".into(),
                gender: "All".into(),
            },
            age: AgeBounds {
                min: 18,
                max: 65,
                special_category_min: 18,
            },
        }
    }

    /// Names accepted by [`MappingProfile::builtin`].
    pub fn builtin_names() -> &'static [&'static str] {
        &["revised", "legacy"]
    }

    pub fn builtin(name: &str) -> ProfileResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "revised" | "default" => Ok(Self::revised()),
            "legacy" => Ok(Self::legacy()),
            other => Err(ProfileError::UnknownBuiltin(other.to_string())),
        }
    }

    /// Parse and schema-check a profile document.
    pub fn from_json(json: &str) -> ProfileResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        validate_profile(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ProfileResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Resolve a built-in name, or else a path to a JSON profile.
    pub fn load(spec: &str) -> ProfileResult<Self> {
        match Self::builtin(spec) {
            Ok(profile) => Ok(profile),
            Err(err) => {
                let path = Path::new(spec);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Err(err)
                }
            }
        }
    }

    pub fn to_json(&self) -> ProfileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn objective_defaults(&self, objective: &str) -> Option<&ObjectiveDefaults> {
        self.objective_defaults.get(objective)
    }
}

impl Default for MappingProfile {
    fn default() -> Self {
        Self::revised()
    }
}

fn legacy_objective_defaults() -> BTreeMap<String, ObjectiveDefaults> {
    BTreeMap::from([
        ("Leads".to_string(), objective("LEAD_GENERATION", "SIGN_UP")),
        ("Conversions".to_string(), objective("CONVERSIONS", "SHOP_NOW")),
        ("Sales".to_string(), objective("VALUE", "SHOP_NOW")),
        ("Traffic".to_string(), objective("LINK_CLICKS", "LEARN_MORE")),
        ("Video Views".to_string(), objective("THRUPLAY", "LEARN_MORE")),
    ])
}

/// Validate a profile document against the embedded schema.
pub fn validate_profile(data: &Value) -> ProfileResult<()> {
    let schema: Value = serde_json::from_str(PROFILE_SCHEMA)?;
    let validator = jsonschema::draft7::new(&schema).map_err(|e| ProfileError::SchemaError {
        errors: vec![format!("Invalid embedded schema: {}", e)],
    })?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProfileError::SchemaError { errors })
    }
}
