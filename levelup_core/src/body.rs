//! Body metrics and weight tracking.

use crate::{Gender, Profile, WeightLog};

/// Base metabolic rate used when the profile can't support the equation
pub const FALLBACK_BMR: u32 = 1500;

/// Lowest BMR ever reported
pub const MIN_BMR: u32 = 1000;

/// Daily deficit applied to TDEE for the calorie target
pub const CALORIE_DEFICIT: u32 = 500;

const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.375;

/// Body mass index rounded to one decimal
///
/// Returns `None` when height is not positive.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if !(height_cm > 0.0) || !weight_kg.is_finite() {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some((weight_kg / (height_m * height_m) * 10.0).round() / 10.0)
}

/// Basal metabolic rate (Mifflin-St Jeor), in kcal/day
pub fn bmr(profile: &Profile) -> u32 {
    let valid = profile.weight_kg > 0.0 && profile.height_cm > 0.0 && profile.age > 0;
    if !valid {
        tracing::debug!("Incomplete profile, using fallback BMR");
        return FALLBACK_BMR;
    }

    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age as f64;
    let adjusted = match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Female | Gender::Other => base - 161.0,
    };

    (adjusted.round().max(0.0) as u32).max(MIN_BMR)
}

/// Activity multiplier by number of training days per week
pub fn activity_multiplier(days_per_week: u32) -> f64 {
    match days_per_week {
        1 => 1.2,
        2 => 1.3,
        3 => 1.375,
        4 => 1.45,
        5 => 1.55,
        6 => 1.65,
        7 => 1.725,
        _ => DEFAULT_ACTIVITY_MULTIPLIER,
    }
}

/// Total daily energy expenditure, in kcal/day
pub fn tdee(profile: &Profile) -> u32 {
    (bmr(profile) as f64 * activity_multiplier(profile.days_per_week)).round() as u32
}

pub fn calorie_target(tdee: u32) -> u32 {
    tdee.saturating_sub(CALORIE_DEFICIT)
}

/// Insert a check-in, replacing any entry from the same calendar day (UTC)
///
/// The result stays sorted by date, oldest first.
pub fn record_weight(logs: &mut Vec<WeightLog>, entry: WeightLog) {
    let day = entry.date.date_naive();
    match logs.iter_mut().find(|l| l.date.date_naive() == day) {
        Some(existing) => *existing = entry,
        None => logs.push(entry),
    }
    logs.sort_by(|a, b| a.date.cmp(&b.date));
}

/// Carry a check-in over to the profile's current measurements
pub fn apply_to_profile(profile: &mut Profile, entry: &WeightLog) {
    profile.weight_kg = entry.weight_kg;
    if let Some(waist) = entry.waist_cm {
        profile.waist_cm = Some(waist);
    }
}

/// Weight change between the first and the latest check-in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightProgress {
    pub start: f64,
    pub current: f64,
    /// `current - start`; negative means weight lost
    pub change: f64,
}

impl WeightProgress {
    /// `None` for an empty history; expects logs sorted oldest first
    pub fn from_logs(logs: &[WeightLog]) -> Option<Self> {
        let start = logs.first()?.weight_kg;
        let current = logs.last()?.weight_kg;
        Some(Self {
            start,
            current,
            change: current - start,
        })
    }

    pub fn lost(&self) -> f64 {
        (self.start - self.current).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardioPreference, ExperienceLevel};
    use chrono::{TimeZone, Utc};

    fn profile(gender: Gender, days: u32) -> Profile {
        Profile {
            name: None,
            height_cm: 180.0,
            weight_kg: 80.0,
            age: 30,
            gender,
            experience: ExperienceLevel::Intermediate,
            days_per_week: days,
            minutes_per_workout: 60,
            cardio_preference: CardioPreference::Any,
            limitations: String::new(),
            waist_cm: None,
        }
    }

    fn entry(day: u32, hour: u32, weight: f64) -> WeightLog {
        WeightLog {
            date: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            weight_kg: weight,
            waist_cm: None,
        }
    }

    #[test]
    fn test_bmi() {
        assert_eq!(bmi(80.0, 180.0), Some(24.7));
        assert_eq!(bmi(70.0, 0.0), None);
    }

    #[test]
    fn test_bmr_by_gender() {
        // 800 + 1125 - 150 = 1775
        assert_eq!(bmr(&profile(Gender::Male, 4)), 1780);
        assert_eq!(bmr(&profile(Gender::Female, 4)), 1614);
        assert_eq!(bmr(&profile(Gender::Other, 4)), 1614);
    }

    #[test]
    fn test_bmr_fallback_and_floor() {
        let mut p = profile(Gender::Male, 4);
        p.age = 0;
        assert_eq!(bmr(&p), FALLBACK_BMR);

        let mut tiny = profile(Gender::Female, 4);
        tiny.weight_kg = 30.0;
        tiny.height_cm = 120.0;
        tiny.age = 80;
        assert_eq!(bmr(&tiny), MIN_BMR);
    }

    #[test]
    fn test_tdee_and_target() {
        let p = profile(Gender::Male, 4);
        assert_eq!(tdee(&p), 2581);
        assert_eq!(calorie_target(tdee(&p)), 2081);

        let unusual = profile(Gender::Male, 9);
        assert_eq!(tdee(&unusual), (1780.0_f64 * 1.375).round() as u32);
    }

    #[test]
    fn test_record_weight_upserts_by_day() {
        let mut logs = vec![entry(1, 8, 82.0), entry(5, 8, 81.0)];

        record_weight(&mut logs, entry(5, 20, 80.6));
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].weight_kg, 80.6);

        record_weight(&mut logs, entry(3, 8, 81.5));
        let weights: Vec<f64> = logs.iter().map(|l| l.weight_kg).collect();
        assert_eq!(weights, vec![82.0, 81.5, 80.6]);
    }

    #[test]
    fn test_apply_to_profile_keeps_waist_when_absent() {
        let mut p = profile(Gender::Female, 3);
        p.waist_cm = Some(80.0);

        apply_to_profile(&mut p, &entry(2, 8, 77.0));
        assert_eq!(p.weight_kg, 77.0);
        assert_eq!(p.waist_cm, Some(80.0));

        let mut with_waist = entry(3, 8, 76.5);
        with_waist.waist_cm = Some(78.0);
        apply_to_profile(&mut p, &with_waist);
        assert_eq!(p.waist_cm, Some(78.0));
    }

    #[test]
    fn test_weight_progress() {
        assert!(WeightProgress::from_logs(&[]).is_none());

        let progress =
            WeightProgress::from_logs(&[entry(1, 8, 90.0), entry(8, 8, 88.0), entry(15, 8, 87.0)])
                .unwrap();
        assert_eq!(progress.start, 90.0);
        assert_eq!(progress.current, 87.0);
        assert_eq!(progress.change, -3.0);
        assert_eq!(progress.lost(), 3.0);
    }
}
