//! Core domain types for the LevelUp training system.
//!
//! This module defines the fundamental types used throughout the system:
//! - User profile and its closed enumerations
//! - Weekly plans, workout days and prescribed exercises
//! - Performance records and finalized workout logs
//! - Body weight check-ins

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

// ============================================================================
// Profile Types
// ============================================================================

/// Gender as declared during onboarding
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Training experience tier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    /// Human-readable label used in suggestion text
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

/// Preferred cardio modality for the end of each session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardioPreference {
    Run,
    Walk,
    Bike,
    Stairmaster,
    #[default]
    Any,
}

/// User profile collected during onboarding
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub experience: ExperienceLevel,
    pub days_per_week: u32,
    #[serde(default = "default_minutes_per_workout")]
    pub minutes_per_workout: u32,
    #[serde(default)]
    pub cardio_preference: CardioPreference,
    #[serde(default)]
    pub limitations: String,
    #[serde(default)]
    pub waist_cm: Option<f64>,
}

fn default_minutes_per_workout() -> u32 {
    60
}

// ============================================================================
// Subjective Rating
// ============================================================================

/// User's post-exercise difficulty assessment, drives load progression
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Easy,
    #[default]
    Ok,
    Hard,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Easy => write!(f, "easy"),
            Rating::Ok => write!(f, "ok"),
            Rating::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Rating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Ok(Rating::Easy),
            "ok" | "o" => Ok(Rating::Ok),
            "hard" | "h" => Ok(Rating::Hard),
            other => Err(Error::unknown("rating", other)),
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(Error::unknown("gender", other)),
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            other => Err(Error::unknown("experience level", other)),
        }
    }
}

// ============================================================================
// Muscle Groups
// ============================================================================

/// Muscle group targeted by an exercise
///
/// Imported plans carry free text here; known names (English or Portuguese)
/// map onto the closed variants and anything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    Cardio,
    Other(String),
}

impl From<String> for MuscleGroup {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "chest" | "peito" => MuscleGroup::Chest,
            "back" | "costas" => MuscleGroup::Back,
            "legs" | "pernas" => MuscleGroup::Legs,
            "shoulders" | "ombros" => MuscleGroup::Shoulders,
            "arms" | "braços" | "bracos" | "biceps" | "bíceps" | "triceps" | "tríceps" => {
                MuscleGroup::Arms
            }
            "core" | "abdômen" | "abdomen" | "abs" => MuscleGroup::Core,
            "cardio" => MuscleGroup::Cardio,
            _ => MuscleGroup::Other(value),
        }
    }
}

impl From<MuscleGroup> for String {
    fn from(value: MuscleGroup) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuscleGroup::Chest => write!(f, "chest"),
            MuscleGroup::Back => write!(f, "back"),
            MuscleGroup::Legs => write!(f, "legs"),
            MuscleGroup::Shoulders => write!(f, "shoulders"),
            MuscleGroup::Arms => write!(f, "arms"),
            MuscleGroup::Core => write!(f, "core"),
            MuscleGroup::Cardio => write!(f, "cardio"),
            MuscleGroup::Other(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// Plan Types
// ============================================================================

/// Target rep count used when a plan's rep range can't be parsed
pub const DEFAULT_TARGET_REPS: u32 = 10;

/// An exercise as prescribed inside a workout day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    /// Rep range as written by the plan generator, e.g. "8-12"
    pub reps: String,
    #[serde(default)]
    pub rpe: Option<u8>,
    pub rest_seconds: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub muscle_group: Option<MuscleGroup>,
}

impl PlannedExercise {
    /// Lower bound of the prescribed rep range ("10-12" -> 10)
    pub fn target_reps(&self) -> u32 {
        self.reps
            .split('-')
            .next()
            .map(str::trim)
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|r| *r > 0)
            .unwrap_or(DEFAULT_TARGET_REPS)
    }
}

/// Cardio finisher for a workout day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CardioSession {
    pub kind: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub intensity: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One training session within a weekly plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutDay {
    pub id: String,
    pub day_name: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub warmup: String,
    pub exercises: Vec<PlannedExercise>,
    #[serde(default)]
    pub cardio: Option<CardioSession>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
}

/// A generated weekly plan: an ordered list of workout days
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyPlan {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub days: Vec<WorkoutDay>,
}

// ============================================================================
// Performance Logs
// ============================================================================

/// Finalized performance for one exercise within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub weight_used: f64,
    pub reps_completed: u32,
    pub sets_completed: u32,
    pub rating: Rating,
    pub date: DateTime<Utc>,
}

/// A completed workout, persisted once when the session finishes
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub plan_id: String,
    /// Index of the day within the plan, as a string
    pub day_id: String,
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub completed_exercises: Vec<PerformanceRecord>,
}

// ============================================================================
// Body Weight
// ============================================================================

/// A body weight check-in
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightLog {
    pub date: DateTime<Utc>,
    pub weight_kg: f64,
    #[serde(default)]
    pub waist_cm: Option<f64>,
}
