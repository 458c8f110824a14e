//! Rest timer between sets.
//!
//! The timer persists the absolute instant rest ends, not the seconds left,
//! so time spent while the process was suspended or restarted is accounted
//! for on the next `restore`. Expiry fires the audio/haptic cue once per
//! started timer.

use crate::clock::Clock;
use crate::config::TimerSettings;
use crate::document::{load_document, remove_document, save_document};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Durable slot holding the rest target (epoch milliseconds)
pub trait TimerStore {
    fn load(&self) -> Result<Option<i64>>;
    fn save(&mut self, target_ms: i64) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Side effects fired when rest is over
pub trait AlertSink {
    fn play_beep(&mut self);
    fn vibrate(&mut self, pattern: &[u32]);
}

/// Alert sink that does nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAlerts;

impl AlertSink for NullAlerts {
    fn play_beep(&mut self) {}
    fn vibrate(&mut self, _pattern: &[u32]) {}
}

/// Alert sink that counts what it was asked to do; clones share counters
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct RecordingAlerts {
    inner: Arc<Mutex<AlertCounts>>,
}

/// Alerts recorded by `RecordingAlerts`
#[cfg(test)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlertCounts {
    pub beeps: usize,
    pub vibrations: Vec<Vec<u32>>,
}

#[cfg(test)]
impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> AlertCounts {
        self.inner
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl AlertSink for RecordingAlerts {
    fn play_beep(&mut self) {
        if let Ok(mut c) = self.inner.lock() {
            c.beeps += 1;
        }
    }

    fn vibrate(&mut self, pattern: &[u32]) {
        if let Ok(mut c) = self.inner.lock() {
            c.vibrations.push(pattern.to_vec());
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTimer {
    target_ms: i64,
}

/// Timer target kept in a JSON document on disk
#[derive(Clone, Debug)]
pub struct FileTimerStore {
    path: PathBuf,
}

impl FileTimerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TimerStore for FileTimerStore {
    fn load(&self) -> Result<Option<i64>> {
        Ok(load_document::<PersistedTimer>(&self.path)?.map(|t| t.target_ms))
    }

    fn save(&mut self, target_ms: i64) -> Result<()> {
        save_document(&self.path, &PersistedTimer { target_ms })
    }

    fn clear(&mut self) -> Result<()> {
        remove_document(&self.path)
    }
}

/// In-memory timer slot; clones share it, which is how tests simulate a
/// process restart
#[derive(Clone, Debug, Default)]
pub struct MemoryTimerStore {
    slot: Arc<Mutex<Option<i64>>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<i64>>> {
        self.slot
            .lock()
            .map_err(|_| Error::Store("timer slot poisoned".into()))
    }
}

impl TimerStore for MemoryTimerStore {
    fn load(&self) -> Result<Option<i64>> {
        Ok(*self.lock()?)
    }

    fn save(&mut self, target_ms: i64) -> Result<()> {
        *self.lock()? = Some(target_ms);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Observable timer state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running { remaining: u32 },
    /// Rest is over but the user hasn't dismissed the timer
    Expired,
}

/// Countdown between sets
pub struct RestTimer {
    store: Box<dyn TimerStore>,
    alerts: Box<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    settings: TimerSettings,
    target_ms: Option<i64>,
    running: bool,
    sound_played: bool,
    remaining: u32,
}

impl RestTimer {
    /// Build a timer, resuming a persisted rest if it hasn't ended yet
    ///
    /// A persisted target already in the past is discarded.
    pub fn restore(
        mut store: Box<dyn TimerStore>,
        alerts: Box<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        settings: TimerSettings,
    ) -> Self {
        let now = clock.now_ms();
        let persisted = store.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load rest timer: {}. Starting idle.", e);
            None
        });

        let (target_ms, running, remaining) = match persisted {
            Some(target) if target > now => {
                let remaining = seconds_left(target, now);
                tracing::info!("Resuming rest timer with {}s left", remaining);
                (Some(target), true, remaining)
            }
            Some(_) => {
                tracing::debug!("Discarding expired rest timer");
                if let Err(e) = store.clear() {
                    tracing::warn!("Failed to clear stale rest timer: {}", e);
                }
                (None, false, 0)
            }
            None => (None, false, 0),
        };

        Self {
            store,
            alerts,
            clock,
            settings,
            target_ms,
            running,
            sound_played: false,
            remaining,
        }
    }

    /// Start (or restart) a rest of `duration_secs`
    pub fn start(&mut self, duration_secs: u32) {
        let target = self.clock.now_ms() + i64::from(duration_secs) * 1000;
        self.target_ms = Some(target);
        self.persist(target);
        self.running = true;
        self.sound_played = false;
        self.remaining = duration_secs;
        tracing::debug!("Rest timer started for {}s", duration_secs);
    }

    /// Recompute the remaining time; fires the expiry cue at most once
    pub fn tick(&mut self) -> TimerPhase {
        let target = match (self.running, self.target_ms) {
            (true, Some(target)) => target,
            _ => {
                self.remaining = 0;
                return TimerPhase::Idle;
            }
        };

        let now = self.clock.now_ms();
        if target - now <= 0 {
            self.remaining = 0;
            if !self.sound_played {
                self.fire_expiry();
                self.sound_played = true;
            }
            TimerPhase::Expired
        } else {
            self.remaining = seconds_left(target, now);
            TimerPhase::Running {
                remaining: self.remaining,
            }
        }
    }

    /// Push the end of rest back by `secs`
    ///
    /// Returns `false` when no rest is in progress. The expiry cue is not
    /// re-armed: a timer that already beeped stays silent when the extension
    /// runs out.
    pub fn add_time(&mut self, secs: u32) -> bool {
        let Some(target) = self.target_ms.filter(|_| self.running) else {
            return false;
        };

        let target = target + i64::from(secs) * 1000;
        self.target_ms = Some(target);
        self.persist(target);
        self.remaining = seconds_left(target, self.clock.now_ms());
        tracing::debug!("Rest extended by {}s", secs);
        true
    }

    /// Stop the timer and forget the persisted target
    pub fn cancel(&mut self) {
        self.running = false;
        self.target_ms = None;
        self.sound_played = false;
        self.remaining = 0;
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear rest timer: {}", e);
        }
    }

    pub fn phase(&self) -> TimerPhase {
        if !self.running {
            TimerPhase::Idle
        } else if self.remaining == 0 {
            TimerPhase::Expired
        } else {
            TimerPhase::Running {
                remaining: self.remaining,
            }
        }
    }

    /// Seconds left as of the last tick, clamped at zero
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn target_ms(&self) -> Option<i64> {
        self.target_ms
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    fn persist(&mut self, target: i64) {
        if let Err(e) = self.store.save(target) {
            tracing::warn!("Failed to persist rest timer: {}", e);
        }
    }

    fn fire_expiry(&mut self) {
        tracing::info!("Rest finished");
        if self.settings.sound_enabled {
            self.alerts.play_beep();
        }
        if !self.settings.vibration_pattern.is_empty() {
            self.alerts.vibrate(&self.settings.vibration_pattern);
        }
    }
}

impl std::fmt::Debug for RestTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTimer")
            .field("target_ms", &self.target_ms)
            .field("running", &self.running)
            .field("sound_played", &self.sound_played)
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Whole seconds until `target`, rounded up; zero once reached
fn seconds_left(target_ms: i64, now_ms: i64) -> u32 {
    let ms = target_ms - now_ms;
    if ms <= 0 {
        0
    } else {
        u32::try_from((ms + 999) / 1000).unwrap_or(u32::MAX)
    }
}

/// Format seconds as MM:SS
pub fn format_countdown(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
