//! Active workout session controller.
//!
//! Walks one workout day exercise by exercise. Entering an exercise asks the
//! load advisor for a starting weight; every completed set starts the rest
//! timer; the last set of the last exercise cancels the timer and writes the
//! workout log exactly once.

use crate::clock::Clock;
use crate::store::LogStore;
use crate::suggestion::{sanitize_weight, LoadAdvisor, LoadSuggestion};
use crate::timer::RestTimer;
use crate::{
    Error, PerformanceRecord, PlannedExercise, Profile, Rating, Result, WeeklyPlan, WorkoutDay,
    WorkoutLog,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// What the session needs to know about the workout being performed
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub plan_id: String,
    pub day_index: usize,
    pub day: WorkoutDay,
    pub profile: Profile,
}

/// Per-set inputs, reset on every new exercise
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetInputs {
    pub weight: f64,
    pub reps: u32,
    pub rating: Rating,
}

/// Result of `WorkoutSession::complete_set`
#[derive(Debug)]
pub enum SetOutcome {
    /// More sets remain for the current exercise
    SetLogged {
        exercise_index: usize,
        completed: u32,
        target: u32,
    },
    /// The exercise is done and the session moved on
    ExerciseCompleted {
        record: PerformanceRecord,
        next_index: usize,
    },
    /// The last exercise is done
    Finished(FinishedWorkout),
}

/// The finalized workout and the outcome of persisting it
#[derive(Debug)]
pub struct FinishedWorkout {
    pub log: WorkoutLog,
    /// Set when the log store rejected the write; the workout is finished
    /// regardless
    pub save_error: Option<Error>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Active(usize),
    Finished,
}

/// One in-progress workout
pub struct WorkoutSession<'c> {
    context: SessionContext,
    advisor: LoadAdvisor<'c>,
    logs: Box<dyn LogStore>,
    timer: RestTimer,
    clock: Arc<dyn Clock>,
    phase: Phase,
    completed_sets: Vec<u32>,
    records: Vec<PerformanceRecord>,
    started_at: DateTime<Utc>,
    started_ms: i64,
    inputs: SetInputs,
    suggestion: Option<LoadSuggestion>,
}

impl<'c> WorkoutSession<'c> {
    /// Begin a workout at its first exercise
    ///
    /// A day without exercises, or with an exercise prescribing zero sets,
    /// is rejected.
    pub fn start(
        context: SessionContext,
        advisor: LoadAdvisor<'c>,
        logs: Box<dyn LogStore>,
        timer: RestTimer,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if context.day.exercises.is_empty() {
            return Err(Error::Session(format!(
                "Day '{}' has no exercises",
                context.day.day_name
            )));
        }
        if let Some(ex) = context.day.exercises.iter().find(|ex| ex.sets == 0) {
            return Err(Error::Plan(format!("Exercise '{}' has zero sets", ex.name)));
        }

        let exercise_count = context.day.exercises.len();
        let started_at = clock.now();
        let started_ms = clock.now_ms();

        tracing::info!(
            "Starting workout '{}' with {} exercises",
            context.day.day_name,
            exercise_count
        );

        let mut session = Self {
            context,
            advisor,
            logs,
            timer,
            clock,
            phase: Phase::Active(0),
            completed_sets: vec![0; exercise_count],
            records: Vec::with_capacity(exercise_count),
            started_at,
            started_ms,
            inputs: SetInputs {
                weight: 0.0,
                reps: 0,
                rating: Rating::Ok,
            },
            suggestion: None,
        };
        session.enter_exercise(0);
        Ok(session)
    }

    fn enter_exercise(&mut self, index: usize) {
        let exercise = &self.context.day.exercises[index];
        let suggestion =
            self.advisor
                .suggest(self.logs.as_ref(), &exercise.name, &self.context.profile);

        self.inputs = SetInputs {
            weight: suggestion.weight,
            reps: exercise.target_reps(),
            rating: Rating::Ok,
        };
        self.suggestion = Some(suggestion);

        tracing::debug!("Entered exercise {} ({})", index, exercise.name);
    }

    /// Record a completed set for the current exercise
    ///
    /// The rest timer starts on every set, including the last set of an
    /// exercise. Fails once the workout is finished.
    pub fn complete_set(&mut self) -> Result<SetOutcome> {
        let index = match self.phase {
            Phase::Active(i) => i,
            Phase::Finished => {
                return Err(Error::Session("Workout already finished".into()));
            }
        };

        let exercise = &self.context.day.exercises[index];
        let target = exercise.sets;
        self.timer.start(exercise.rest_seconds);

        self.completed_sets[index] += 1;
        let completed = self.completed_sets[index];

        if completed < target {
            tracing::debug!("Set {}/{} of {}", completed, target, exercise.name);
            return Ok(SetOutcome::SetLogged {
                exercise_index: index,
                completed,
                target,
            });
        }

        let record = PerformanceRecord {
            exercise_id: exercise.id.clone(),
            exercise_name: exercise.name.clone(),
            weight_used: self.inputs.weight,
            reps_completed: self.inputs.reps,
            sets_completed: target,
            rating: self.inputs.rating,
            date: self.clock.now(),
        };
        tracing::info!(
            "Completed {}: {}kg x {} ({})",
            record.exercise_name,
            record.weight_used,
            record.reps_completed,
            record.rating
        );
        self.records.push(record.clone());

        let last = self.context.day.exercises.len() - 1;
        if index < last {
            let next_index = index + 1;
            self.phase = Phase::Active(next_index);
            self.enter_exercise(next_index);
            Ok(SetOutcome::ExerciseCompleted { record, next_index })
        } else {
            self.timer.cancel();
            self.phase = Phase::Finished;
            Ok(SetOutcome::Finished(self.finish()))
        }
    }

    fn finish(&mut self) -> FinishedWorkout {
        let elapsed_ms = (self.clock.now_ms() - self.started_ms).max(0);
        let duration_minutes = u32::try_from((elapsed_ms + 30_000) / 60_000).unwrap_or(u32::MAX);

        let log = WorkoutLog {
            id: Uuid::new_v4(),
            plan_id: self.context.plan_id.clone(),
            day_id: self.context.day_index.to_string(),
            date: self.clock.now(),
            duration_minutes,
            completed_exercises: self.records.clone(),
        };

        let save_error = match self.logs.save_workout_log(&log) {
            Ok(()) => {
                tracing::info!(
                    "Workout {} saved ({} min, {} exercises)",
                    log.id,
                    duration_minutes,
                    log.completed_exercises.len()
                );
                None
            }
            Err(e) => {
                tracing::error!("Failed to save workout {}: {}", log.id, e);
                Some(e)
            }
        };

        FinishedWorkout { log, save_error }
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.inputs.weight = sanitize_weight(weight);
    }

    pub fn adjust_weight(&mut self, delta: f64) {
        self.set_weight(self.inputs.weight + delta);
    }

    pub fn set_reps(&mut self, reps: u32) {
        self.inputs.reps = reps;
    }

    pub fn adjust_reps(&mut self, delta: i32) {
        self.inputs.reps = self.inputs.reps.saturating_add_signed(delta);
    }

    pub fn set_rating(&mut self, rating: Rating) {
        self.inputs.rating = rating;
    }

    pub fn inputs(&self) -> SetInputs {
        self.inputs
    }

    /// Suggestion computed when the current exercise was entered
    pub fn suggestion(&self) -> Option<&LoadSuggestion> {
        self.suggestion.as_ref()
    }

    /// Index of the active exercise; `None` once finished
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Active(i) => Some(i),
            Phase::Finished => None,
        }
    }

    pub fn current_exercise(&self) -> Option<&PlannedExercise> {
        self.current_index().map(|i| &self.context.day.exercises[i])
    }

    pub fn completed_sets(&self, index: usize) -> u32 {
        self.completed_sets.get(index).copied().unwrap_or(0)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn day(&self) -> &WorkoutDay {
        &self.context.day
    }

    /// Records finalized so far
    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    pub fn timer(&self) -> &RestTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut RestTimer {
        &mut self.timer
    }

    /// Fraction of exercises completed, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        let total = self.context.day.exercises.len() as f64;
        match self.phase {
            Phase::Active(i) => i as f64 / total,
            Phase::Finished => 1.0,
        }
    }
}

/// Index of the day to train next
///
/// The day after the most recent workout, wrapping to the first day after
/// the last one or when the last workout's day is unknown.
pub fn next_day_index(plan: &WeeklyPlan, logs: &[WorkoutLog]) -> usize {
    let Some(last) = logs.iter().max_by_key(|log| log.date) else {
        return 0;
    };

    last.day_id
        .parse::<usize>()
        .ok()
        .and_then(|day| day.checked_add(1))
        .filter(|next| *next < plan.days.len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::clock::ManualClock;
    use crate::config::{ProgressionPolicy, TimerSettings};
    use crate::store::MemoryLogStore;
    use crate::suggestion::SuggestionReason;
    use crate::timer::{MemoryTimerStore, NullAlerts, TimerPhase, TimerStore};
    use crate::{CardioPreference, ExperienceLevel, Gender};
    use chrono::{Duration, TimeZone};

    fn exercise(id: &str, name: &str, sets: u32, rest: u32) -> PlannedExercise {
        PlannedExercise {
            id: id.into(),
            name: name.into(),
            sets,
            reps: "8-12".into(),
            rpe: Some(8),
            rest_seconds: rest,
            notes: None,
            muscle_group: None,
        }
    }

    fn day(exercises: Vec<PlannedExercise>) -> WorkoutDay {
        WorkoutDay {
            id: "day-1".into(),
            day_name: "Day 1 - Legs".into(),
            focus: "Legs".into(),
            warmup: "5 min bike".into(),
            exercises,
            cardio: None,
            estimated_duration_minutes: Some(50),
        }
    }

    fn two_exercise_day() -> WorkoutDay {
        day(vec![
            exercise("ex-1", "Agachamento Livre", 3, 90),
            exercise("ex-2", "Leg Press 45", 3, 60),
        ])
    }

    fn profile() -> Profile {
        Profile {
            name: Some("Bruno".into()),
            height_cm: 178.0,
            weight_kg: 90.0,
            age: 35,
            gender: Gender::Male,
            experience: ExperienceLevel::Beginner,
            days_per_week: 4,
            minutes_per_workout: 60,
            cardio_preference: CardioPreference::Run,
            limitations: String::new(),
            waist_cm: None,
        }
    }

    struct Fixture {
        clock: ManualClock,
        timer_store: MemoryTimerStore,
        logs: MemoryLogStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_logs(MemoryLogStore::new())
        }

        fn with_logs(logs: MemoryLogStore) -> Self {
            Self {
                clock: ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 6, 7, 0, 0).unwrap()),
                timer_store: MemoryTimerStore::new(),
                logs,
            }
        }

        fn session<'c>(
            &self,
            catalog: &'c crate::catalog::ExerciseCatalog,
            day: WorkoutDay,
        ) -> Result<WorkoutSession<'c>> {
            let clock: Arc<dyn Clock> = Arc::new(self.clock.clone());
            let timer = RestTimer::restore(
                Box::new(self.timer_store.clone()),
                Box::new(NullAlerts),
                clock.clone(),
                TimerSettings::default(),
            );
            WorkoutSession::start(
                SessionContext {
                    plan_id: "plan-1".into(),
                    day_index: 2,
                    day,
                    profile: profile(),
                },
                LoadAdvisor::new(catalog, ProgressionPolicy::default()),
                Box::new(self.logs.clone()),
                timer,
                clock,
            )
        }
    }

    #[test]
    fn test_six_sets_finish_two_exercises() {
        crate::logging::init_test();
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let mut session = fx.session(&catalog, two_exercise_day()).unwrap();

        let mut finished = None;
        for call in 1..=6 {
            fx.clock.advance_secs(120);
            match session.complete_set().unwrap() {
                SetOutcome::Finished(done) => {
                    assert_eq!(call, 6);
                    finished = Some(done);
                }
                _ => assert!(call < 6),
            }
        }

        let done = finished.unwrap();
        assert!(done.save_error.is_none());
        assert_eq!(done.log.completed_exercises.len(), 2);
        assert_eq!(done.log.plan_id, "plan-1");
        assert_eq!(done.log.day_id, "2");
        assert_eq!(done.log.duration_minutes, 12);
        assert!(session.is_finished());
        assert_eq!(fx.logs.workout_logs().unwrap().len(), 1);
    }

    #[test]
    fn test_final_set_cancels_timer() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let mut session = fx
            .session(&catalog, day(vec![exercise("ex-1", "Remada Curvada", 1, 90)]))
            .unwrap();

        let outcome = session.complete_set().unwrap();

        assert!(matches!(outcome, SetOutcome::Finished(_)));
        assert_eq!(session.timer().phase(), TimerPhase::Idle);
        assert_eq!(fx.timer_store.load().unwrap(), None);
    }

    #[test]
    fn test_timer_runs_between_exercises() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let mut session = fx.session(&catalog, two_exercise_day()).unwrap();

        session.complete_set().unwrap();
        assert_eq!(
            session.timer().phase(),
            TimerPhase::Running { remaining: 90 }
        );

        session.complete_set().unwrap();
        let outcome = session.complete_set().unwrap();
        match outcome {
            SetOutcome::ExerciseCompleted { next_index, record } => {
                assert_eq!(next_index, 1);
                assert_eq!(record.exercise_name, "Agachamento Livre");
                assert_eq!(record.sets_completed, 3);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        // Rest uses the finished exercise's duration
        assert_eq!(
            session.timer().phase(),
            TimerPhase::Running { remaining: 90 }
        );
        assert_eq!(session.current_index(), Some(1));
    }

    #[test]
    fn test_set_counter_progression() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let mut session = fx.session(&catalog, two_exercise_day()).unwrap();

        match session.complete_set().unwrap() {
            SetOutcome::SetLogged {
                exercise_index,
                completed,
                target,
            } => {
                assert_eq!((exercise_index, completed, target), (0, 1, 3));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(session.completed_sets(0), 1);
        assert_eq!(session.completed_sets(1), 0);
    }

    #[test]
    fn test_entering_exercise_uses_suggestion() {
        let catalog = build_default_catalog();
        let history = MemoryLogStore::with_logs(vec![WorkoutLog {
            id: Uuid::new_v4(),
            plan_id: "old".into(),
            day_id: "0".into(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap(),
            duration_minutes: 50,
            completed_exercises: vec![PerformanceRecord {
                exercise_id: "ex-2".into(),
                exercise_name: "Leg Press 45".into(),
                weight_used: 40.0,
                reps_completed: 10,
                sets_completed: 3,
                rating: Rating::Easy,
                date: Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap(),
            }],
        }]);
        let fx = Fixture::with_logs(history);
        let mut session = fx.session(&catalog, two_exercise_day()).unwrap();

        // No squat history: beginner male table value
        assert_eq!(session.inputs().weight, 20.0);
        assert_eq!(session.inputs().reps, 8);
        assert_eq!(
            session.suggestion().unwrap().reason,
            SuggestionReason::StartingLoad(ExperienceLevel::Beginner)
        );

        session.set_rating(Rating::Hard);
        session.set_reps(6);
        for _ in 0..3 {
            session.complete_set().unwrap();
        }

        // Leg press history was easy at 40kg
        assert_eq!(session.inputs().weight, 42.5);
        assert_eq!(session.inputs().rating, Rating::Ok);
        assert_eq!(session.inputs().reps, 8);
        assert_eq!(
            session.suggestion().unwrap().reason,
            SuggestionReason::IncreasedForEase
        );
        assert_eq!(session.records()[0].rating, Rating::Hard);
        assert_eq!(session.records()[0].reps_completed, 6);
    }

    #[test]
    fn test_record_uses_edited_inputs() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let mut session = fx
            .session(&catalog, day(vec![exercise("ex-1", "Tríceps Corda", 1, 45)]))
            .unwrap();

        session.adjust_weight(2.5);
        session.adjust_weight(-100.0);
        assert_eq!(session.inputs().weight, 0.0);

        session.set_weight(f64::NAN);
        assert_eq!(session.inputs().weight, 0.0);

        session.set_weight(17.5);
        session.adjust_reps(-20);
        assert_eq!(session.inputs().reps, 0);
        session.adjust_reps(12);

        let SetOutcome::Finished(done) = session.complete_set().unwrap() else {
            panic!("expected finish");
        };
        let record = &done.log.completed_exercises[0];
        assert_eq!(record.weight_used, 17.5);
        assert_eq!(record.reps_completed, 12);
    }

    #[test]
    fn test_complete_after_finish_is_rejected() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let mut session = fx
            .session(&catalog, day(vec![exercise("ex-1", "Prancha Abdominal", 1, 30)]))
            .unwrap();

        session.complete_set().unwrap();
        let again = session.complete_set();

        assert!(matches!(again, Err(Error::Session(_))));
        assert_eq!(fx.logs.workout_logs().unwrap().len(), 1);
    }

    #[test]
    fn test_save_failure_does_not_block_finish() {
        let catalog = build_default_catalog();
        let fx = Fixture::with_logs(MemoryLogStore::failing());
        let mut session = fx
            .session(&catalog, day(vec![exercise("ex-1", "Elevação Lateral", 2, 30)]))
            .unwrap();

        session.complete_set().unwrap();
        let SetOutcome::Finished(done) = session.complete_set().unwrap() else {
            panic!("expected finish");
        };

        assert!(matches!(done.save_error, Some(Error::Store(_))));
        assert_eq!(done.log.completed_exercises.len(), 1);
        assert!(session.is_finished());
        assert_eq!(session.timer().phase(), TimerPhase::Idle);
    }

    #[test]
    fn test_empty_day_is_rejected() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let result = fx.session(&catalog, day(vec![]));
        assert!(matches!(result, Err(Error::Session(_))));
    }

    #[test]
    fn test_zero_set_exercise_is_rejected() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let result = fx.session(&catalog, day(vec![exercise("ex-1", "Remada Curvada", 0, 60)]));
        assert!(matches!(result, Err(Error::Plan(_))));
    }

    #[test]
    fn test_progress_fraction() {
        let catalog = build_default_catalog();
        let fx = Fixture::new();
        let mut session = fx.session(&catalog, two_exercise_day()).unwrap();
        assert_eq!(session.progress(), 0.0);

        for _ in 0..3 {
            session.complete_set().unwrap();
        }
        assert_eq!(session.progress(), 0.5);
    }

    fn plan_with_days(n: usize) -> WeeklyPlan {
        WeeklyPlan {
            id: "plan-1".into(),
            created_at: Utc::now(),
            days: (0..n).map(|_| two_exercise_day()).collect(),
        }
    }

    fn log_for_day(day_id: &str, days_ago: i64) -> WorkoutLog {
        WorkoutLog {
            id: Uuid::new_v4(),
            plan_id: "plan-1".into(),
            day_id: day_id.into(),
            date: Utc::now() - Duration::days(days_ago),
            duration_minutes: 40,
            completed_exercises: vec![],
        }
    }

    #[test]
    fn test_next_day_index() {
        let plan = plan_with_days(4);

        assert_eq!(next_day_index(&plan, &[]), 0);
        assert_eq!(
            next_day_index(&plan, &[log_for_day("1", 0), log_for_day("0", 2)]),
            2
        );
        assert_eq!(next_day_index(&plan, &[log_for_day("3", 0)]), 0);
        assert_eq!(next_day_index(&plan, &[log_for_day("garbage", 0)]), 0);
        assert_eq!(
            next_day_index(&plan, &[log_for_day(&usize::MAX.to_string(), 0)]),
            0
        );
        // Newest by date wins over storage order
        assert_eq!(
            next_day_index(&plan, &[log_for_day("1", 0), log_for_day("2", 3)]),
            2
        );
    }
}
