use clap::{Parser, Subcommand};
use levelup_core::body::{self, WeightProgress};
use levelup_core::history::recent_activity;
use levelup_core::session::{next_day_index, FinishedWorkout};
use levelup_core::store::validate_plan;
use levelup_core::suggestion::format_weight;
use levelup_core::timer::{format_countdown, NullAlerts};
use levelup_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Entries shown under "Recent activity" in `stats`
const RECENT_ACTIVITY_LIMIT: usize = 10;

#[derive(Parser)]
#[command(name = "levelup")]
#[command(about = "Strength training log with load suggestions and a rest timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or show the user profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Import or show the weekly plan
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Suggest a load for an exercise
    Suggest {
        /// Exercise name as written in the plan
        exercise: String,
    },

    /// Perform a workout day
    Workout {
        /// Day number in the plan (starting at 1); defaults to the next day
        #[arg(long)]
        day: Option<usize>,

        /// Auto-complete (for testing) - finish every set with the suggested load
        #[arg(long)]
        auto_complete: bool,

        /// Rating recorded for every exercise when auto-completing
        #[arg(long, default_value = "ok")]
        rating: Rating,
    },

    /// Control the rest timer
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },

    /// Log a body weight check-in
    Weight {
        /// Body weight in kg
        kg: f64,

        /// Waist circumference in cm
        #[arg(long)]
        waist: Option<f64>,
    },

    /// Show body metrics and weekly adherence
    Stats,

    /// Show logged performances for an exercise
    History {
        exercise: String,
    },

    /// Export workout history as CSV
    Export {
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create or replace the profile
    Set {
        #[arg(long)]
        name: Option<String>,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Body weight in kg
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        age: u32,
        /// male, female or other
        #[arg(long)]
        gender: Gender,
        /// beginner, intermediate or advanced
        #[arg(long)]
        experience: ExperienceLevel,
        /// Training days per week (1-7)
        #[arg(long, default_value_t = 4)]
        days: u32,
        /// Minutes available per workout
        #[arg(long, default_value_t = 60)]
        minutes: u32,
        /// Waist circumference in cm
        #[arg(long)]
        waist: Option<f64>,
        /// Injuries or limitations
        #[arg(long, default_value = "")]
        limitations: String,
    },
    /// Print the stored profile
    Show,
}

#[derive(Subcommand)]
enum PlanAction {
    /// Import a weekly plan from a JSON file
    Import { path: PathBuf },
    /// Print the stored plan
    Show,
    /// List plans replaced by later imports
    History,
    /// Make an archived plan the active one again
    Activate { id: String },
}

#[derive(Subcommand)]
enum TimerAction {
    /// Start a rest of the given length
    Start { seconds: u32 },
    /// Show the time left
    Status,
    /// Extend the running rest (defaults to timer.extend_seconds)
    Add { seconds: Option<u32> },
    /// Stop the rest
    Cancel,
}

/// Resolved configuration and data locations
struct App {
    config: Config,
    data_dir: PathBuf,
}

impl App {
    fn documents(&self) -> JsonDocumentStore {
        JsonDocumentStore::new(&self.data_dir)
    }

    fn journal(&self) -> JsonlLogStore {
        JsonlLogStore::new(self.data_dir.join("workouts.jsonl"))
    }

    fn timer_path(&self) -> PathBuf {
        self.data_dir.join("timer.json")
    }

    fn require_profile(&self) -> Result<Profile> {
        self.documents().get_profile()?.ok_or_else(|| {
            Error::Other("No profile found. Run 'levelup profile set' first.".into())
        })
    }

    fn require_plan(&self) -> Result<WeeklyPlan> {
        self.documents()
            .get_plan()?
            .ok_or_else(|| Error::Plan("No plan found. Run 'levelup plan import' first.".into()))
    }

    fn catalog(&self) -> Result<&'static ExerciseCatalog> {
        let catalog = get_default_catalog();
        let errors = catalog.validate();
        if !errors.is_empty() {
            eprintln!("Catalog validation errors:");
            for error in &errors {
                eprintln!("  - {}", error);
            }
            return Err(Error::Catalog("Invalid catalog".into()));
        }
        Ok(catalog)
    }

    fn rest_timer(&self, alerts: Box<dyn AlertSink>, clock: Arc<dyn Clock>) -> RestTimer {
        RestTimer::restore(
            Box::new(FileTimerStore::new(self.timer_path())),
            alerts,
            clock,
            self.config.timer.clone(),
        )
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    levelup_core::logging::init_with_level(levelup_core::logging::level_for_verbosity(
        cli.verbose,
    ));

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let app = App { config, data_dir };

    match cli.command {
        Commands::Profile { action } => cmd_profile(&app, action),
        Commands::Plan { action } => cmd_plan(&app, action),
        Commands::Suggest { exercise } => cmd_suggest(&app, &exercise),
        Commands::Workout {
            day,
            auto_complete,
            rating,
        } => cmd_workout(&app, day, auto_complete, rating),
        Commands::Timer { action } => cmd_timer(&app, action),
        Commands::Weight { kg, waist } => cmd_weight(&app, kg, waist),
        Commands::Stats => cmd_stats(&app),
        Commands::History { exercise } => cmd_history(&app, &exercise),
        Commands::Export { path } => cmd_export(&app, &path),
    }
}

fn cmd_profile(app: &App, action: ProfileAction) -> Result<()> {
    let mut docs = app.documents();

    match action {
        ProfileAction::Set {
            name,
            height,
            weight,
            age,
            gender,
            experience,
            days,
            minutes,
            waist,
            limitations,
        } => {
            if !(1..=7).contains(&days) {
                return Err(Error::Other(format!(
                    "Training days must be between 1 and 7, got {}",
                    days
                )));
            }
            if !(height > 0.0 && weight > 0.0) {
                return Err(Error::Other("Height and weight must be positive".into()));
            }

            let profile = Profile {
                name,
                height_cm: height,
                weight_kg: weight,
                age,
                gender,
                experience,
                days_per_week: days,
                minutes_per_workout: minutes,
                cardio_preference: CardioPreference::default(),
                limitations,
                waist_cm: waist,
            };
            docs.save_profile(&profile)?;

            // Onboarding weight seeds an empty weight history
            let mut weights = docs.weight_logs()?;
            if weights.is_empty() {
                body::record_weight(
                    &mut weights,
                    WeightLog {
                        date: chrono::Utc::now(),
                        weight_kg: weight,
                        waist_cm: waist,
                    },
                );
                docs.save_weight_logs(&weights)?;
            }

            println!("✓ Profile saved");
            print_profile(&profile);
        }
        ProfileAction::Show => {
            let profile = app.require_profile()?;
            print_profile(&profile);
        }
    }

    Ok(())
}

fn print_profile(profile: &Profile) {
    if let Some(ref name) = profile.name {
        println!("  Name: {}", name);
    }
    println!(
        "  {} cm, {} kg, {} years, {:?}",
        profile.height_cm, profile.weight_kg, profile.age, profile.gender
    );
    println!(
        "  Level: {}, {} days/week, {} min per workout",
        profile.experience.label(),
        profile.days_per_week,
        profile.minutes_per_workout
    );
    if let Some(waist) = profile.waist_cm {
        println!("  Waist: {} cm", waist);
    }
    if !profile.limitations.is_empty() {
        println!("  Limitations: {}", profile.limitations);
    }
}

fn cmd_plan(app: &App, action: PlanAction) -> Result<()> {
    match action {
        PlanAction::Import { path } => {
            let contents = std::fs::read_to_string(&path)?;
            let plan: WeeklyPlan = serde_json::from_str(&contents)?;

            let errors = validate_plan(&plan);
            if !errors.is_empty() {
                eprintln!("Plan validation errors:");
                for error in &errors {
                    eprintln!("  - {}", error);
                }
                return Err(Error::Plan("Invalid plan".into()));
            }

            let catalog = app.catalog()?;
            for day in &plan.days {
                for exercise in &day.exercises {
                    if catalog.get(&exercise.name).is_none() {
                        tracing::info!("'{}' is not in the catalog", exercise.name);
                    }
                }
            }

            app.documents().save_plan(&plan)?;
            println!("✓ Imported plan with {} days", plan.days.len());
        }
        PlanAction::History => {
            let docs = app.documents();
            match docs.get_plan()? {
                Some(plan) => println!("Active: {}", plan_summary(&plan)),
                None => println!("No active plan"),
            }

            let past = docs.past_plans()?;
            if past.is_empty() {
                println!("No archived plans");
            } else {
                println!("Archived:");
                for plan in &past {
                    println!("  {}", plan_summary(plan));
                }
            }
        }
        PlanAction::Activate { id } => {
            let plan = app.documents().activate_plan(&id)?;
            println!("✓ Activated {}", plan_summary(&plan));
        }
        PlanAction::Show => {
            let plan = app.require_plan()?;
            for (i, day) in plan.days.iter().enumerate() {
                println!("Day {}: {} ({})", i + 1, day.day_name, day.focus);
                for exercise in &day.exercises {
                    println!(
                        "  - {}: {} x {}, rest {}s",
                        exercise.name, exercise.sets, exercise.reps, exercise.rest_seconds
                    );
                }
                if let Some(ref cardio) = day.cardio {
                    println!("  + {} for {} min", cardio.kind, cardio.duration_minutes);
                }
            }
        }
    }

    Ok(())
}

fn plan_summary(plan: &WeeklyPlan) -> String {
    format!(
        "{} ({} days, created {})",
        plan.id,
        plan.days.len(),
        plan.created_at.format("%Y-%m-%d %H:%M")
    )
}

fn cmd_suggest(app: &App, exercise: &str) -> Result<()> {
    let profile = app.require_profile()?;
    let advisor = LoadAdvisor::new(app.catalog()?, app.config.progression.clone());
    let suggestion = advisor.suggest(&app.journal(), exercise, &profile);

    println!("{}: {}", exercise, suggestion);
    Ok(())
}

fn cmd_workout(app: &App, day: Option<usize>, auto_complete: bool, rating: Rating) -> Result<()> {
    let profile = app.require_profile()?;
    let plan = app.require_plan()?;
    let journal = app.journal();

    let day_index = match day {
        Some(n) if n == 0 || n > plan.days.len() => {
            return Err(Error::Plan(format!(
                "Day {} does not exist (plan has {} days)",
                n,
                plan.days.len()
            )));
        }
        Some(n) => n - 1,
        None => next_day_index(&plan, &journal.workout_logs()?),
    };

    let workout_day = plan
        .days
        .get(day_index)
        .cloned()
        .ok_or_else(|| Error::Plan("Plan has no workout days".into()))?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let alerts: Box<dyn AlertSink> = if auto_complete {
        Box::new(NullAlerts)
    } else {
        Box::new(TerminalAlerts)
    };
    let timer = app.rest_timer(alerts, clock.clone());

    let mut session = WorkoutSession::start(
        SessionContext {
            plan_id: plan.id.clone(),
            day_index,
            day: workout_day,
            profile,
        },
        LoadAdvisor::new(app.catalog()?, app.config.progression.clone()),
        Box::new(journal),
        timer,
        clock,
    )?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  DAY {}: {}", day_index + 1, session.day().day_name);
    println!("╰─────────────────────────────────────────╯");
    if !session.day().warmup.is_empty() {
        println!("  Warm-up: {}", session.day().warmup);
    }

    let finished = if auto_complete {
        Some(run_auto(&mut session, rating)?)
    } else {
        run_interactive(&mut session, &app.config)?
    };

    let Some(done) = finished else {
        println!("\nWorkout abandoned - nothing logged.");
        return Ok(());
    };

    if let Some(ref cardio) = session.day().cardio {
        println!("\n  Finish with {} for {} min", cardio.kind, cardio.duration_minutes);
    }
    print_summary(&done);

    match done.save_error {
        Some(e) => {
            eprintln!("✗ Workout could not be saved");
            Err(e)
        }
        None => Ok(()),
    }
}

fn run_auto(session: &mut WorkoutSession<'_>, rating: Rating) -> Result<FinishedWorkout> {
    loop {
        if let Some(index) = session.current_index() {
            if session.completed_sets(index) == 0 {
                print_exercise(session);
            }
        }
        session.set_rating(rating);

        match session.complete_set()? {
            SetOutcome::SetLogged {
                completed, target, ..
            } => println!("  ✓ Set {}/{}", completed, target),
            SetOutcome::ExerciseCompleted { record, .. } => print_record(&record),
            SetOutcome::Finished(done) => {
                if let Some(record) = done.log.completed_exercises.last() {
                    print_record(record);
                }
                return Ok(done);
            }
        }
    }
}

/// Input typed during an active workout
#[derive(Debug, PartialEq)]
enum SessionCommand {
    CompleteSet,
    SetWeight(f64),
    AdjustWeight(f64),
    SetReps(u32),
    AdjustReps(i32),
    Rate(Rating),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> SessionCommand {
    let line = line.trim();
    match line {
        "" => return SessionCommand::CompleteSet,
        "q" | "quit" => return SessionCommand::Quit,
        "?" | "help" => return SessionCommand::Help,
        "w+" => return SessionCommand::AdjustWeight(1.0),
        "w-" => return SessionCommand::AdjustWeight(-1.0),
        "w++" => return SessionCommand::AdjustWeight(2.5),
        "w--" => return SessionCommand::AdjustWeight(-2.5),
        "r+" => return SessionCommand::AdjustReps(1),
        "r-" => return SessionCommand::AdjustReps(-1),
        _ => {}
    }

    if let Ok(rating) = line.parse::<Rating>() {
        return SessionCommand::Rate(rating);
    }

    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("w"), Some(value)) => value
            .parse::<f64>()
            .map(SessionCommand::SetWeight)
            .unwrap_or_else(|_| SessionCommand::Unknown(line.to_string())),
        (Some("r"), Some(value)) => value
            .parse::<u32>()
            .map(SessionCommand::SetReps)
            .unwrap_or_else(|_| SessionCommand::Unknown(line.to_string())),
        _ => SessionCommand::Unknown(line.to_string()),
    }
}

/// Forward stdin lines to the workout loop so the rest countdown can keep
/// ticking while waiting for input
fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run_interactive(
    session: &mut WorkoutSession<'_>,
    config: &Config,
) -> Result<Option<FinishedWorkout>> {
    let input = spawn_input_reader();
    print_session_help();

    loop {
        let Some(index) = session.current_index() else {
            return Ok(None);
        };
        if session.completed_sets(index) == 0 {
            print_exercise(session);
        }

        let inputs = session.inputs();
        let target = session.current_exercise().map(|ex| ex.sets).unwrap_or(0);
        print!(
            "  [set {}/{}] {}kg x {} ({}) > ",
            session.completed_sets(index) + 1,
            target,
            format_weight(inputs.weight),
            inputs.reps,
            inputs.rating
        );
        io::stdout().flush()?;

        let Ok(line) = input.recv() else {
            session.timer_mut().cancel();
            return Ok(None);
        };

        match parse_command(&line) {
            SessionCommand::CompleteSet => match session.complete_set()? {
                SetOutcome::SetLogged { .. } => {
                    if rest(session, &input, config)? == RestEnd::Quit {
                        return Ok(None);
                    }
                }
                SetOutcome::ExerciseCompleted { record, .. } => {
                    print_record(&record);
                    if rest(session, &input, config)? == RestEnd::Quit {
                        return Ok(None);
                    }
                    std::thread::sleep(Duration::from_millis(config.session.advance_delay_ms));
                }
                SetOutcome::Finished(done) => {
                    if let Some(record) = done.log.completed_exercises.last() {
                        print_record(record);
                    }
                    return Ok(Some(done));
                }
            },
            SessionCommand::Quit => {
                session.timer_mut().cancel();
                return Ok(None);
            }
            command => apply_edit(session, &command),
        }
    }
}

/// Apply an input edit or help request; set completion and quitting are
/// handled by the callers
fn apply_edit(session: &mut WorkoutSession<'_>, command: &SessionCommand) {
    match *command {
        SessionCommand::SetWeight(w) => session.set_weight(w),
        SessionCommand::AdjustWeight(d) => session.adjust_weight(d),
        SessionCommand::SetReps(r) => session.set_reps(r),
        SessionCommand::AdjustReps(d) => session.adjust_reps(d),
        SessionCommand::Rate(r) => session.set_rating(r),
        SessionCommand::Help => print_session_help(),
        SessionCommand::Unknown(ref s) => {
            println!("  Unknown command '{}'. Type '?' for help.", s)
        }
        SessionCommand::CompleteSet | SessionCommand::Quit => {}
    }
}

/// What a line typed during rest does
#[derive(Debug, PartialEq)]
enum RestInput {
    Skip,
    Extend,
    Command(SessionCommand),
}

fn parse_rest_input(line: &str) -> RestInput {
    match line.trim() {
        "" => RestInput::Skip,
        "+" => RestInput::Extend,
        _ => RestInput::Command(parse_command(line)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RestEnd {
    Done,
    Quit,
}

/// Show the rest countdown until it runs out or the user skips it
///
/// Edits typed while resting apply to the next set.
fn rest(
    session: &mut WorkoutSession<'_>,
    input: &Receiver<String>,
    config: &Config,
) -> Result<RestEnd> {
    let tick = Duration::from_millis(config.timer.tick_interval_ms);
    println!(
        "  Resting - Enter to skip, '+' to add {}s",
        config.timer.extend_seconds
    );

    loop {
        match session.timer_mut().tick() {
            TimerPhase::Running { remaining } => {
                print!("\r  ⏱  {} ", format_countdown(remaining));
                io::stdout().flush()?;
            }
            TimerPhase::Expired => {
                println!("\r  ⏱  Rest over!");
                session.timer_mut().cancel();
                return Ok(RestEnd::Done);
            }
            TimerPhase::Idle => return Ok(RestEnd::Done),
        }

        let line = match input.recv_timeout(tick) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(RestEnd::Done),
        };

        match parse_rest_input(&line) {
            RestInput::Skip => {
                session.timer_mut().cancel();
                println!("  Rest skipped");
                return Ok(RestEnd::Done);
            }
            RestInput::Extend => {
                session.timer_mut().add_time(config.timer.extend_seconds);
            }
            RestInput::Command(SessionCommand::Quit) => {
                session.timer_mut().cancel();
                return Ok(RestEnd::Quit);
            }
            RestInput::Command(command) => {
                println!();
                apply_edit(session, &command);
                let inputs = session.inputs();
                println!(
                    "  Next set: {}kg x {} ({})",
                    format_weight(inputs.weight),
                    inputs.reps,
                    inputs.rating
                );
            }
        }
    }
}

fn print_session_help() {
    println!("─────────────────────────────────────────");
    println!("  Enter        complete set");
    println!("  w <kg>       set weight   (w+ / w- by 1kg, w++ / w-- by 2.5kg)");
    println!("  r <reps>     set reps     (r+ / r-)");
    println!("  e / o / h    rate the exercise easy, ok or hard");
    println!("  q            quit without saving");
    println!("─────────────────────────────────────────");
}

fn print_exercise(session: &WorkoutSession<'_>) {
    let Some(exercise) = session.current_exercise() else {
        return;
    };

    println!();
    println!("  {}", exercise.name);
    println!(
        "  {} sets x {} reps, rest {}s",
        exercise.sets, exercise.reps, exercise.rest_seconds
    );
    if let Some(rpe) = exercise.rpe {
        println!("  RPE {}", rpe);
    }
    if let Some(ref notes) = exercise.notes {
        println!("  ℹ {}", notes);
    }
    if let Some(def) = get_default_catalog().get(&exercise.name) {
        if !def.safety.is_empty() {
            println!("  ⚠ {}", def.safety);
        }
    }
    if let Some(suggestion) = session.suggestion() {
        println!("  → Suggested: {}", suggestion);
    }
}

fn print_record(record: &PerformanceRecord) {
    println!(
        "  ✓ {} done: {}kg x {} ({})",
        record.exercise_name,
        format_weight(record.weight_used),
        record.reps_completed,
        record.rating
    );
}

fn print_summary(done: &FinishedWorkout) {
    println!("\n✓ Workout complete!");
    println!("  Duration: {} min", done.log.duration_minutes);
    println!("  Exercises: {}", done.log.completed_exercises.len());
}

fn cmd_timer(app: &App, action: TimerAction) -> Result<()> {
    let mut timer = app.rest_timer(Box::new(TerminalAlerts), Arc::new(SystemClock));

    match action {
        TimerAction::Start { seconds } => {
            timer.start(seconds);
            println!("✓ Rest timer started: {}", format_countdown(seconds));
        }
        TimerAction::Status => match timer.tick() {
            TimerPhase::Running { remaining } => {
                println!("Rest timer: {} remaining", format_countdown(remaining));
            }
            TimerPhase::Expired => println!("Rest timer: finished"),
            TimerPhase::Idle => println!("No rest timer running"),
        },
        TimerAction::Add { seconds } => {
            let secs = seconds.unwrap_or(app.config.timer.extend_seconds);
            if timer.add_time(secs) {
                println!(
                    "✓ Rest extended: {} remaining",
                    format_countdown(timer.remaining())
                );
            } else {
                println!("No rest timer running");
            }
        }
        TimerAction::Cancel => {
            timer.cancel();
            println!("✓ Rest timer cancelled");
        }
    }

    Ok(())
}

fn cmd_weight(app: &App, kg: f64, waist: Option<f64>) -> Result<()> {
    if !(kg.is_finite() && kg > 0.0) {
        return Err(Error::Other(format!("Invalid body weight: {}", kg)));
    }

    let mut docs = app.documents();
    let entry = WeightLog {
        date: chrono::Utc::now(),
        weight_kg: kg,
        waist_cm: waist,
    };

    let mut weights = docs.weight_logs()?;
    body::record_weight(&mut weights, entry.clone());
    docs.save_weight_logs(&weights)?;

    if let Some(mut profile) = docs.get_profile()? {
        body::apply_to_profile(&mut profile, &entry);
        docs.save_profile(&profile)?;
    }

    println!("✓ Weight logged: {}kg", format_weight(kg));
    if let Some(progress) = WeightProgress::from_logs(&weights) {
        println!(
            "  Since first check-in: {:+.1}kg ({} → {})",
            progress.change,
            format_weight(progress.start),
            format_weight(progress.current)
        );
    }
    Ok(())
}

fn cmd_stats(app: &App) -> Result<()> {
    let profile = app.require_profile()?;
    let docs = app.documents();
    let logs = app.journal().workout_logs()?;

    if let Some(bmi) = body::bmi(profile.weight_kg, profile.height_cm) {
        println!("BMI: {:.1}", bmi);
    }
    let tdee = body::tdee(&profile);
    println!("BMR: {} kcal", body::bmr(&profile));
    println!("TDEE: {} kcal", tdee);
    println!("Calorie target: {} kcal", body::calorie_target(tdee));

    let this_week = levelup_core::history::workouts_this_week(&logs, chrono::Utc::now());
    println!(
        "This week: {}/{} workouts ({:.0}%)",
        this_week,
        profile.days_per_week,
        levelup_core::history::weekly_adherence(this_week, profile.days_per_week)
    );
    println!("Total workouts: {}", logs.len());

    let weights = docs.weight_logs()?;
    if let Some(progress) = WeightProgress::from_logs(&weights) {
        println!(
            "Weight: {}kg (started at {}kg, {:+.1}kg)",
            format_weight(progress.current),
            format_weight(progress.start),
            progress.change
        );
    }

    let mut plans = docs.past_plans()?;
    if let Some(plan) = docs.get_plan()? {
        let next = next_day_index(&plan, &logs);
        if let Some(day) = plan.days.get(next) {
            println!("Next workout: Day {} - {}", next + 1, day.day_name);
        }
        plans.push(plan);
    }

    let activity = recent_activity(&logs, &weights, &plans, RECENT_ACTIVITY_LIMIT);
    if !activity.is_empty() {
        println!();
        println!("Recent activity:");
        for item in &activity {
            println!(
                "  {}  {}: {}",
                item.date.format("%Y-%m-%d"),
                item.kind.title(),
                item.description
            );
        }
    }

    Ok(())
}

fn cmd_history(app: &App, exercise: &str) -> Result<()> {
    let logs = app.journal().workout_logs()?;
    let records = levelup_core::history::exercise_history(&logs, exercise);

    if records.is_empty() {
        println!("No history for {}", exercise);
        return Ok(());
    }

    println!("{}:", exercise);
    for record in records {
        println!(
            "  {}  {}kg x {} x {} sets ({})",
            record.date.format("%Y-%m-%d"),
            format_weight(record.weight_used),
            record.reps_completed,
            record.sets_completed,
            record.rating
        );
    }
    Ok(())
}

fn cmd_export(app: &App, path: &Path) -> Result<()> {
    let logs = app.journal().workout_logs()?;
    let rows = levelup_core::history::export_csv(&logs, path)?;

    println!("✓ Exported {} records", rows);
    println!("  CSV: {}", path.display());
    Ok(())
}

/// Terminal bell for the end of rest; terminals have no haptics
struct TerminalAlerts;

impl AlertSink for TerminalAlerts {
    fn play_beep(&mut self) {
        eprint!("\x07");
    }

    fn vibrate(&mut self, pattern: &[u32]) {
        tracing::debug!("Skipping vibration {:?}", pattern);
    }
}
