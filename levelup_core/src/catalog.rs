//! Exercise reference table.
//!
//! Static metadata for the exercises the plan generator is steered towards:
//! execution cues, muscles, and the default starting load per gender and
//! experience tier. Loads are in kilograms; for dumbbell movements they are
//! per hand.

use crate::types::{ExperienceLevel, Gender, MuscleGroup};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Starting loads for one gender row
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoadRow {
    pub beginner: f64,
    pub intermediate: f64,
    pub advanced: f64,
}

impl LoadRow {
    pub fn for_level(&self, level: ExperienceLevel) -> f64 {
        match level {
            ExperienceLevel::Beginner => self.beginner,
            ExperienceLevel::Intermediate => self.intermediate,
            ExperienceLevel::Advanced => self.advanced,
        }
    }
}

/// Default-load table indexed by gender and experience
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DefaultLoad {
    pub male: LoadRow,
    pub female: LoadRow,
}

impl DefaultLoad {
    /// Look up the starting load; only `Female` selects the female row
    pub fn for_profile(&self, gender: Gender, level: ExperienceLevel) -> f64 {
        match gender {
            Gender::Female => self.female.for_level(level),
            Gender::Male | Gender::Other => self.male.for_level(level),
        }
    }
}

/// Execution cues shown alongside the active exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionCues {
    pub setup: String,
    pub movement: String,
    pub tips: String,
}

/// Static reference entry for one exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub equipment: String,
    pub alternatives: Vec<String>,
    pub execution: ExecutionCues,
    pub primary_muscle: String,
    pub secondary_muscles: Vec<String>,
    pub tempo: String,
    pub safety: String,
    pub default_load: Option<DefaultLoad>,
}

/// The exercise reference table, keyed by exercise name
#[derive(Clone, Debug, Default)]
pub struct ExerciseCatalog {
    pub exercises: HashMap<String, ExerciseDefinition>,
}

impl ExerciseCatalog {
    /// Find an exercise by name
    ///
    /// An exact match wins. Otherwise the first entry, in alphabetical order,
    /// whose name contains `name` or is contained in it (ignoring case) is
    /// returned, so "agachamento livre" and "Agachamento Livre com Barra"
    /// both resolve to the squat.
    pub fn get(&self, name: &str) -> Option<&ExerciseDefinition> {
        if let Some(def) = self.exercises.get(name) {
            return Some(def);
        }

        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        let key = self.names().into_iter().find(|key| {
            let key = key.to_lowercase();
            wanted.contains(&key) || key.contains(&wanted)
        })?;
        tracing::debug!("Resolved exercise '{}' to '{}'", name, key);
        self.exercises.get(key)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, definition: ExerciseDefinition) {
        self.exercises.insert(definition.name.clone(), definition);
    }

    /// Names sorted alphabetically
    fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exercises.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check the table for inconsistencies, returning one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, def) in &self.exercises {
            if def.id.is_empty() {
                errors.push(format!("Exercise '{}' has empty ID", key));
            }
            if def.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", def.id));
            }
            if key != &def.name {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.name '{}'",
                    key, def.name
                ));
            }
            if let Some(load) = &def.default_load {
                let all = [
                    load.male.beginner,
                    load.male.intermediate,
                    load.male.advanced,
                    load.female.beginner,
                    load.female.intermediate,
                    load.female.advanced,
                ];
                if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    errors.push(format!("Exercise '{}' has a negative default load", def.id));
                }
            }
        }

        errors
    }
}

/// Cached default catalog, built once
static DEFAULT_CATALOG: Lazy<ExerciseCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ExerciseCatalog {
    &DEFAULT_CATALOG
}

fn loads(male: [f64; 3], female: [f64; 3]) -> Option<DefaultLoad> {
    Some(DefaultLoad {
        male: LoadRow {
            beginner: male[0],
            intermediate: male[1],
            advanced: male[2],
        },
        female: LoadRow {
            beginner: female[0],
            intermediate: female[1],
            advanced: female[2],
        },
    })
}

fn cues(setup: &str, movement: &str, tips: &str) -> ExecutionCues {
    ExecutionCues {
        setup: setup.into(),
        movement: movement.into(),
        tips: tips.into(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Builds the built-in reference table
///
/// Prefer `get_default_catalog()`; this is kept for tests and for callers
/// that want to extend the table.
pub fn build_default_catalog() -> ExerciseCatalog {
    let mut catalog = ExerciseCatalog::default();

    // ========================================================================
    // Chest
    // ========================================================================

    catalog.insert(ExerciseDefinition {
        id: "supino_reto".into(),
        name: "Supino Reto com Barra".into(),
        muscle_group: MuscleGroup::Chest,
        equipment: "Flat bench and Olympic bar".into(),
        alternatives: strings(&["Supino com Halteres", "Máquina de Supino Sentado"]),
        execution: cues(
            "Lie with eyes under the bar, feet planted, shoulder blades retracted, grip slightly wider than shoulders.",
            "Unrack, lower under control to mid-chest, press up explosively.",
            "Keep a slight arch only; elbows around 45 degrees from the torso.",
        ),
        primary_muscle: "Pectoralis major".into(),
        secondary_muscles: strings(&["Triceps", "Anterior deltoid"]),
        tempo: "2-1-1-0".into(),
        safety: "Keep wrists straight and use a spotter on heavy sets.".into(),
        // Total weight: bar plus plates
        default_load: loads([20.0, 50.0, 80.0], [10.0, 25.0, 40.0]),
    });

    catalog.insert(ExerciseDefinition {
        id: "supino_inclinado_halter".into(),
        name: "Supino Inclinado com Halteres".into(),
        muscle_group: MuscleGroup::Chest,
        equipment: "Incline bench (30-45 degrees) and dumbbells".into(),
        alternatives: strings(&["Supino Inclinado Máquina", "Supino Inclinado Barra"]),
        execution: cues(
            "Set the bench to 30-45 degrees and kick the dumbbells up from the knees.",
            "Lower to chest height, press up bringing the dumbbells together without clashing.",
            "Keep the chest up throughout.",
        ),
        primary_muscle: "Upper chest".into(),
        secondary_muscles: strings(&["Triceps", "Anterior deltoid"]),
        tempo: "2-0-1-0".into(),
        safety: "Don't throw the shoulders back when dropping the weights.".into(),
        default_load: loads([10.0, 20.0, 30.0], [4.0, 10.0, 16.0]),
    });

    // ========================================================================
    // Back
    // ========================================================================

    catalog.insert(ExerciseDefinition {
        id: "puxada_alta".into(),
        name: "Puxada Alta (Polia)".into(),
        muscle_group: MuscleGroup::Back,
        equipment: "Lat pulldown machine".into(),
        alternatives: strings(&["Barra Fixa (Graviton)", "Puxada Articulada"]),
        execution: cues(
            "Lock the thigh pad, wide grip, torso leaning slightly back.",
            "Pull the bar to the upper chest driving the elbows down; control the return.",
            "Don't swing the body.",
        ),
        primary_muscle: "Latissimus dorsi".into(),
        secondary_muscles: strings(&["Biceps", "Teres major"]),
        tempo: "2-1-1-0".into(),
        safety: "Never pull behind the neck.".into(),
        default_load: loads([25.0, 50.0, 75.0], [15.0, 30.0, 45.0]),
    });

    catalog.insert(ExerciseDefinition {
        id: "remada_curvada".into(),
        name: "Remada Curvada".into(),
        muscle_group: MuscleGroup::Back,
        equipment: "Barbell or dumbbells".into(),
        alternatives: strings(&["Remada Baixa (Cabo)", "Remada Máquina Peito Apoiado"]),
        execution: cues(
            "Feet shoulder width, knees soft, hinge to 45-60 degrees with a neutral spine.",
            "Row the bar towards the navel retracting the shoulder blades.",
            "Look diagonally at the floor to keep the neck neutral.",
        ),
        primary_muscle: "Back thickness".into(),
        secondary_muscles: strings(&["Biceps", "Lower back (isometric)"]),
        tempo: "2-0-1-0".into(),
        safety: "Switch to a chest-supported row if the lower back hurts.".into(),
        default_load: loads([20.0, 50.0, 80.0], [10.0, 25.0, 40.0]),
    });

    // ========================================================================
    // Legs
    // ========================================================================

    catalog.insert(ExerciseDefinition {
        id: "agachamento_livre".into(),
        name: "Agachamento Livre".into(),
        muscle_group: MuscleGroup::Legs,
        equipment: "Squat rack".into(),
        alternatives: strings(&["Leg Press 45", "Agachamento Globet"]),
        execution: cues(
            "Bar on the traps, feet shoulder width, toes slightly out.",
            "Hips back and knees out, break parallel if mobility allows, drive through the floor.",
            "Brace the core before each descent.",
        ),
        primary_muscle: "Quadriceps and glutes".into(),
        secondary_muscles: strings(&["Hamstrings", "Core"]),
        tempo: "3-0-1-0".into(),
        safety: "Don't let the knees cave in on the way up.".into(),
        default_load: loads([20.0, 60.0, 100.0], [10.0, 30.0, 60.0]),
    });

    catalog.insert(ExerciseDefinition {
        id: "leg_press".into(),
        name: "Leg Press 45".into(),
        muscle_group: MuscleGroup::Legs,
        equipment: "45-degree leg press".into(),
        alternatives: strings(&["Agachamento Hack", "Agachamento Búlgaro"]),
        execution: cues(
            "Back and hips flat on the pad, feet hip width mid-platform.",
            "Bring the platform towards the chest without lifting the hips, then press.",
            "Don't lock the knees at the top.",
        ),
        primary_muscle: "Quadriceps".into(),
        secondary_muscles: strings(&["Glutes"]),
        tempo: "2-0-1-0".into(),
        safety: "Hold the side handles to keep the hips down.".into(),
        default_load: loads([40.0, 120.0, 200.0], [20.0, 60.0, 100.0]),
    });

    // ========================================================================
    // Shoulders
    // ========================================================================

    catalog.insert(ExerciseDefinition {
        id: "desenvolvimento".into(),
        name: "Desenvolvimento com Halteres".into(),
        muscle_group: MuscleGroup::Shoulders,
        equipment: "Upright bench and dumbbells".into(),
        alternatives: strings(&["Desenvolvimento Máquina", "Desenvolvimento Militar (Barra)"]),
        execution: cues(
            "Sit with the back supported, dumbbells at ear height.",
            "Press overhead to full extension, lower under control to the ears.",
            "Elbows slightly forward to protect the rotator cuff.",
        ),
        primary_muscle: "Anterior and medial deltoid".into(),
        secondary_muscles: strings(&["Triceps"]),
        tempo: "2-0-1-0".into(),
        safety: "Avoid over-arching the lower back.".into(),
        default_load: loads([8.0, 18.0, 26.0], [3.0, 8.0, 14.0]),
    });

    catalog.insert(ExerciseDefinition {
        id: "elevacao_lateral".into(),
        name: "Elevação Lateral".into(),
        muscle_group: MuscleGroup::Shoulders,
        equipment: "Dumbbells".into(),
        alternatives: strings(&["Elevação Lateral Polia", "Máquina de Elevação Lateral"]),
        execution: cues(
            "Feet shoulder width, torso slightly forward.",
            "Raise the arms sideways to shoulder height with soft elbows.",
            "Think of pushing the weights away rather than up.",
        ),
        primary_muscle: "Medial deltoid".into(),
        secondary_muscles: Vec::new(),
        tempo: "2-1-1-0".into(),
        safety: "No body english.".into(),
        default_load: loads([4.0, 10.0, 16.0], [2.0, 5.0, 8.0]),
    });

    // ========================================================================
    // Arms
    // ========================================================================

    catalog.insert(ExerciseDefinition {
        id: "triceps_corda".into(),
        name: "Tríceps Corda".into(),
        muscle_group: MuscleGroup::Arms,
        equipment: "High pulley and rope".into(),
        alternatives: strings(&["Tríceps Testa", "Tríceps Francês"]),
        execution: cues(
            "Grab the rope with elbows pinned to the sides.",
            "Extend the elbows pulling down and spreading the rope at the bottom.",
            "Only the forearms move.",
        ),
        primary_muscle: "Triceps brachii".into(),
        secondary_muscles: Vec::new(),
        tempo: "2-0-1-0".into(),
        safety: String::new(),
        default_load: loads([10.0, 20.0, 35.0], [5.0, 15.0, 20.0]),
    });

    catalog.insert(ExerciseDefinition {
        id: "rosca_direta".into(),
        name: "Rosca Direta Barra W".into(),
        muscle_group: MuscleGroup::Arms,
        equipment: "EZ bar".into(),
        alternatives: strings(&["Rosca com Halteres", "Rosca Polia"]),
        execution: cues(
            "Shoulder-width supinated grip.",
            "Curl the bar to the chest.",
            "Keep the elbows from drifting forward at the top.",
        ),
        primary_muscle: "Biceps".into(),
        secondary_muscles: strings(&["Forearms"]),
        tempo: "2-0-1-0".into(),
        safety: "Don't rock the torso.".into(),
        default_load: loads([10.0, 25.0, 40.0], [5.0, 10.0, 20.0]),
    });

    // ========================================================================
    // Core
    // ========================================================================

    catalog.insert(ExerciseDefinition {
        id: "prancha".into(),
        name: "Prancha Abdominal".into(),
        muscle_group: MuscleGroup::Core,
        equipment: "Mat".into(),
        alternatives: strings(&["Abdominal Infra", "Abdominal Máquina"]),
        execution: cues(
            "Forearms and toes on the floor, body in a straight line.",
            "Hold while squeezing glutes and abs.",
            "Don't let the hips sag or pike.",
        ),
        primary_muscle: "Rectus abdominis".into(),
        secondary_muscles: Vec::new(),
        tempo: "Isometric".into(),
        safety: "Stop and reset if the lower back hurts.".into(),
        default_load: loads([0.0; 3], [0.0; 3]),
    });

    catalog
}
