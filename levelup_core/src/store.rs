//! Persistence seams for profile, plan, workout logs and body weight.
//!
//! The core only talks to these traits; file-backed implementations live in
//! `document` and `journal`, and `MemoryLogStore` backs tests and dry runs.

use crate::{Error, PerformanceRecord, Profile, Result, WeeklyPlan, WeightLog, WorkoutLog};
use std::sync::{Arc, Mutex};

/// Profile persistence
pub trait ProfileStore {
    fn get_profile(&self) -> Result<Option<Profile>>;
    fn save_profile(&mut self, profile: &Profile) -> Result<()>;
}

/// Weekly plan persistence
///
/// Saving a plan makes it the active one. The plan it replaces is archived
/// and can be activated again later.
pub trait PlanStore {
    fn get_plan(&self) -> Result<Option<WeeklyPlan>>;
    fn save_plan(&mut self, plan: &WeeklyPlan) -> Result<()>;

    /// Archived plans, newest first
    fn past_plans(&self) -> Result<Vec<WeeklyPlan>>;

    /// Restore an archived plan as the active one
    fn activate_plan(&mut self, plan_id: &str) -> Result<WeeklyPlan> {
        let plan = self
            .past_plans()?
            .into_iter()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| Error::Plan(format!("No archived plan with id '{}'", plan_id)))?;
        self.save_plan(&plan)?;
        Ok(plan)
    }
}

/// Archive update for replacing `current` with `next`
///
/// `current` joins the archive unless it is the plan being saved; `next`
/// leaves it. The result is ordered newest first by creation date.
pub fn archive_plan(
    mut archive: Vec<WeeklyPlan>,
    current: Option<WeeklyPlan>,
    next: &WeeklyPlan,
) -> Vec<WeeklyPlan> {
    archive.retain(|p| p.id != next.id);
    if let Some(current) = current.filter(|c| c.id != next.id) {
        archive.retain(|p| p.id != current.id);
        archive.push(current);
    }
    archive.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    archive
}

/// Workout log persistence
pub trait LogStore {
    /// All stored workout logs, in storage order
    fn workout_logs(&self) -> Result<Vec<WorkoutLog>>;

    fn save_workout_log(&mut self, log: &WorkoutLog) -> Result<()>;

    /// Most recent performance for an exercise, by workout date
    fn last_record_for_exercise(&self, exercise_name: &str) -> Result<Option<PerformanceRecord>> {
        let logs = self.workout_logs()?;
        Ok(latest_record(&logs, exercise_name).cloned())
    }
}

/// Body weight check-in persistence
pub trait WeightStore {
    fn weight_logs(&self) -> Result<Vec<WeightLog>>;
    fn save_weight_logs(&mut self, logs: &[WeightLog]) -> Result<()>;
}

/// Find the newest record for `exercise_name`
///
/// Workouts are ranked by their own date, newest first; the position of the
/// exercise inside a workout does not matter.
pub fn latest_record<'a>(
    logs: &'a [WorkoutLog],
    exercise_name: &str,
) -> Option<&'a PerformanceRecord> {
    let mut ordered: Vec<&WorkoutLog> = logs.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));

    ordered.into_iter().find_map(|workout| {
        workout
            .completed_exercises
            .iter()
            .find(|record| record.exercise_name == exercise_name)
    })
}

/// In-memory log store; clones share the same logs
#[derive(Clone, Debug, Default)]
pub struct MemoryLogStore {
    logs: Arc<Mutex<Vec<WorkoutLog>>>,
    fail_saves: bool,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logs(logs: Vec<WorkoutLog>) -> Self {
        Self {
            logs: Arc::new(Mutex::new(logs)),
            fail_saves: false,
        }
    }

    /// A store whose saves always fail, for exercising error paths
    pub fn failing() -> Self {
        Self {
            logs: Arc::default(),
            fail_saves: true,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<WorkoutLog>>> {
        self.logs
            .lock()
            .map_err(|_| Error::Store("memory log store poisoned".into()))
    }
}

impl LogStore for MemoryLogStore {
    fn workout_logs(&self) -> Result<Vec<WorkoutLog>> {
        Ok(self.lock()?.clone())
    }

    fn save_workout_log(&mut self, log: &WorkoutLog) -> Result<()> {
        if self.fail_saves {
            return Err(Error::Store("save rejected".into()));
        }
        self.lock()?.push(log.clone());
        Ok(())
    }
}

/// Check an imported plan before it is stored
pub fn validate_plan(plan: &WeeklyPlan) -> Vec<String> {
    let mut errors = Vec::new();

    if plan.days.is_empty() {
        errors.push("Plan has no workout days".to_string());
    }

    for (i, day) in plan.days.iter().enumerate() {
        if day.exercises.is_empty() {
            errors.push(format!("Day {} ('{}') has no exercises", i, day.day_name));
        }
        for exercise in &day.exercises {
            if exercise.name.trim().is_empty() {
                errors.push(format!("Day {} has an exercise with an empty name", i));
            }
            if exercise.sets == 0 {
                errors.push(format!(
                    "Exercise '{}' on day {} has zero sets",
                    exercise.name, i
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlannedExercise, Rating, WorkoutDay};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn record(name: &str, weight: f64, rating: Rating) -> PerformanceRecord {
        PerformanceRecord {
            exercise_id: "ex".into(),
            exercise_name: name.into(),
            weight_used: weight,
            reps_completed: 10,
            sets_completed: 3,
            rating,
            date: Utc::now(),
        }
    }

    fn workout(days_ago: i64, records: Vec<PerformanceRecord>) -> WorkoutLog {
        let base = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        WorkoutLog {
            id: Uuid::new_v4(),
            plan_id: "plan".into(),
            day_id: "0".into(),
            date: base - Duration::days(days_ago),
            duration_minutes: 45,
            completed_exercises: records,
        }
    }

    #[test]
    fn test_latest_record_uses_workout_date() {
        // Stored out of order: the newest workout is in the middle
        let logs = vec![
            workout(5, vec![record("Remada Curvada", 30.0, Rating::Ok)]),
            workout(1, vec![
                record("Agachamento Livre", 60.0, Rating::Ok),
                record("Remada Curvada", 35.0, Rating::Easy),
            ]),
            workout(3, vec![record("Remada Curvada", 32.5, Rating::Hard)]),
        ];

        let found = latest_record(&logs, "Remada Curvada").unwrap();
        assert_eq!(found.weight_used, 35.0);
        assert_eq!(found.rating, Rating::Easy);
    }

    #[test]
    fn test_latest_record_skips_workouts_without_exercise() {
        let logs = vec![
            workout(2, vec![record("Leg Press 45", 100.0, Rating::Ok)]),
            workout(0, vec![record("Elevação Lateral", 6.0, Rating::Ok)]),
        ];

        let found = latest_record(&logs, "Leg Press 45").unwrap();
        assert_eq!(found.weight_used, 100.0);
        assert!(latest_record(&logs, "Tríceps Corda").is_none());
    }

    #[test]
    fn test_memory_store_clones_share_logs() {
        let store = MemoryLogStore::new();
        let mut writer = store.clone();
        writer
            .save_workout_log(&workout(0, vec![record("Prancha Abdominal", 0.0, Rating::Ok)]))
            .unwrap();

        assert_eq!(store.workout_logs().unwrap().len(), 1);
        assert!(store
            .last_record_for_exercise("Prancha Abdominal")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_failing_store_rejects_saves() {
        let mut store = MemoryLogStore::failing();
        let result = store.save_workout_log(&workout(0, vec![]));
        assert!(matches!(result, Err(Error::Store(_))));
    }

    fn plan(id: &str, days_ago: i64) -> WeeklyPlan {
        WeeklyPlan {
            id: id.into(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 30, 8, 0, 0).unwrap()
                - Duration::days(days_ago),
            days: vec![],
        }
    }

    fn ids(plans: &[WeeklyPlan]) -> Vec<&str> {
        plans.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_archive_plan_keeps_replaced_plan() {
        let archive = archive_plan(vec![plan("a", 20)], Some(plan("b", 10)), &plan("c", 0));
        assert_eq!(ids(&archive), vec!["b", "a"]);
    }

    #[test]
    fn test_archive_plan_removes_reactivated_plan() {
        let archive = archive_plan(
            vec![plan("a", 20), plan("b", 10)],
            Some(plan("c", 0)),
            &plan("a", 20),
        );
        assert_eq!(ids(&archive), vec!["c", "b"]);
    }

    #[test]
    fn test_archive_plan_resave_is_not_archived() {
        let archive = archive_plan(Vec::new(), Some(plan("a", 1)), &plan("a", 1));
        assert!(archive.is_empty());

        let archive = archive_plan(Vec::new(), None, &plan("a", 1));
        assert!(archive.is_empty());
    }

    #[test]
    fn test_validate_plan() {
        let good = WeeklyPlan {
            id: "p".into(),
            created_at: Utc::now(),
            days: vec![WorkoutDay {
                id: "day-1".into(),
                day_name: "Day 1".into(),
                focus: "Legs".into(),
                warmup: String::new(),
                exercises: vec![PlannedExercise {
                    id: "ex-1".into(),
                    name: "Agachamento Livre".into(),
                    sets: 3,
                    reps: "8-10".into(),
                    rpe: None,
                    rest_seconds: 90,
                    notes: None,
                    muscle_group: None,
                }],
                cardio: None,
                estimated_duration_minutes: None,
            }],
        };
        assert!(validate_plan(&good).is_empty());

        let mut bad = good.clone();
        bad.days[0].exercises[0].sets = 0;
        bad.days.push(WorkoutDay {
            exercises: vec![],
            ..good.days[0].clone()
        });
        assert_eq!(validate_plan(&bad).len(), 2);

        let empty = WeeklyPlan {
            days: vec![],
            ..good
        };
        assert_eq!(validate_plan(&empty), vec!["Plan has no workout days"]);
    }
}
