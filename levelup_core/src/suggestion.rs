//! Load suggestion engine.
//!
//! Progressive-overload rules applied when an exercise is entered:
//! - `easy` last time: add 5% or 2.5kg, whichever is larger
//! - `ok` last time: keep the load
//! - `hard` last time: drop 10%, never below zero
//! - no history: default-load table for the profile, else a fixed fallback
//!
//! Results are rounded to the nearest 0.5kg plate step.

use crate::catalog::ExerciseCatalog;
use crate::config::ProgressionPolicy;
use crate::store::LogStore;
use crate::{ExperienceLevel, PerformanceRecord, Profile, Rating};
use std::fmt;

/// Why a load was suggested
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionReason {
    Maintained,
    IncreasedForEase,
    ReducedForDifficulty,
    /// Taken from the exercise's default-load table
    StartingLoad(ExperienceLevel),
    /// The exercise has no default-load table
    Fallback(ExperienceLevel),
}

impl fmt::Display for SuggestionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionReason::Maintained => write!(f, "load maintained"),
            SuggestionReason::IncreasedForEase => write!(f, "increase due to ease"),
            SuggestionReason::ReducedForDifficulty => write!(f, "reduction due to difficulty"),
            SuggestionReason::StartingLoad(level) => {
                write!(f, "starting suggestion for {} level", level.label())
            }
            SuggestionReason::Fallback(level) => write!(
                f,
                "starting suggestion for {} level (no reference load)",
                level.label()
            ),
        }
    }
}

/// A suggested working weight and its justification
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadSuggestion {
    pub weight: f64,
    pub reason: SuggestionReason,
}

impl fmt::Display for LoadSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kg ({})", format_weight(self.weight), self.reason)
    }
}

/// Render a weight without a trailing ".0"
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{:.1}", weight)
    }
}

/// Round to the nearest multiple of `step`
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return value;
    }
    (value / step).round() * step
}

/// Round to the nearest 0.5
pub fn round_to_half(value: f64) -> f64 {
    round_to_step(value, 0.5)
}

/// Apply the rating rules to the last logged performance
pub fn progress_from(previous: &PerformanceRecord, policy: &ProgressionPolicy) -> LoadSuggestion {
    let last = sanitize_weight(previous.weight_used);

    let (raw, reason) = match previous.rating {
        Rating::Ok => (last, SuggestionReason::Maintained),
        Rating::Easy => {
            let increase = policy.min_increment.max(last * policy.easy_increase_pct);
            (last + increase, SuggestionReason::IncreasedForEase)
        }
        Rating::Hard => (
            (last * (1.0 - policy.hard_decrease_pct)).max(0.0),
            SuggestionReason::ReducedForDifficulty,
        ),
    };

    LoadSuggestion {
        weight: round_to_step(raw, policy.rounding_step),
        reason,
    }
}

/// Starting load for an exercise never performed before
pub fn starting_load(
    exercise_name: &str,
    profile: &Profile,
    catalog: &ExerciseCatalog,
    policy: &ProgressionPolicy,
) -> LoadSuggestion {
    let table = catalog
        .get(exercise_name)
        .and_then(|def| def.default_load.as_ref());

    match table {
        Some(table) => LoadSuggestion {
            weight: table.for_profile(profile.gender, profile.experience),
            reason: SuggestionReason::StartingLoad(profile.experience),
        },
        None => {
            tracing::debug!("No default load for '{}', using fallback", exercise_name);
            LoadSuggestion {
                weight: policy.fallback_load,
                reason: SuggestionReason::Fallback(profile.experience),
            }
        }
    }
}

/// Suggest a load from an optional history record
///
/// Never fails: missing data degrades to the table or the fallback constant.
pub fn suggest_load(
    exercise_name: &str,
    profile: &Profile,
    last_record: Option<&PerformanceRecord>,
    catalog: &ExerciseCatalog,
    policy: &ProgressionPolicy,
) -> LoadSuggestion {
    match last_record {
        Some(record) => progress_from(record, policy),
        None => starting_load(exercise_name, profile, catalog, policy),
    }
}

/// Suggestion engine bound to a catalog and a policy
#[derive(Clone, Debug)]
pub struct LoadAdvisor<'c> {
    catalog: &'c ExerciseCatalog,
    policy: ProgressionPolicy,
}

impl<'c> LoadAdvisor<'c> {
    pub fn new(catalog: &'c ExerciseCatalog, policy: ProgressionPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn catalog(&self) -> &'c ExerciseCatalog {
        self.catalog
    }

    pub fn policy(&self) -> &ProgressionPolicy {
        &self.policy
    }

    /// Look up history in `store` and suggest a load
    ///
    /// A failing store is treated as "no history".
    pub fn suggest(
        &self,
        store: &dyn LogStore,
        exercise_name: &str,
        profile: &Profile,
    ) -> LoadSuggestion {
        let last = match store.last_record_for_exercise(exercise_name) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "History lookup for '{}' failed: {}. Using starting load.",
                    exercise_name,
                    e
                );
                None
            }
        };

        let suggestion = suggest_load(
            exercise_name,
            profile,
            last.as_ref(),
            self.catalog,
            &self.policy,
        );
        tracing::info!("Suggested {} for {}", suggestion, exercise_name);
        suggestion
    }
}

/// Coerce user-entered weights: non-finite or negative becomes zero
pub fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        0.0
    }
}
