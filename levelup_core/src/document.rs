//! JSON document persistence with file locking.
//!
//! Profile, plan, body weight history and the rest timer target are each a
//! single JSON document. Reads take a shared lock; writes go through a
//! locked temp file that is fsynced and renamed over the original.

use crate::store::{archive_plan, PlanStore, ProfileStore, WeightStore};
use crate::{Error, Profile, Result, WeeklyPlan, WeightLog};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Load a JSON document
///
/// Returns `None` if the file doesn't exist. An unreadable or corrupted
/// document is logged and also treated as missing.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        tracing::debug!("No document at {:?}", path);
        return Ok(None);
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Treating as missing.", path, e);
            return Ok(None);
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {:?}: {}. Treating as missing.", path, e);
        return Ok(None);
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    if let Err(e) = reader.read_to_string(&mut contents) {
        let _ = file.unlock();
        tracing::warn!("Failed to read {:?}: {}. Treating as missing.", path, e);
        return Ok(None);
    }

    file.unlock()?;

    match serde_json::from_str::<T>(&contents) {
        Ok(doc) => {
            tracing::debug!("Loaded document from {:?}", path);
            Ok(Some(doc))
        }
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Treating as missing.", path, e);
            Ok(None)
        }
    }
}

/// Save a JSON document atomically
///
/// 1. Write to a temp file in the same directory under an exclusive lock
/// 2. Sync to disk
/// 3. Rename over the original
pub fn save_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("document path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(doc)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved document to {:?}", path);
    Ok(())
}

/// Remove a document; a missing file is not an error
pub fn remove_document(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// File-backed profile, plan and body weight store rooted at a data directory
#[derive(Clone, Debug)]
pub struct JsonDocumentStore {
    dir: PathBuf,
}

impl JsonDocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn profile_path(&self) -> PathBuf {
        self.dir.join("profile.json")
    }

    pub fn plan_path(&self) -> PathBuf {
        self.dir.join("plan.json")
    }

    /// Plans replaced by a newer import
    pub fn past_plans_path(&self) -> PathBuf {
        self.dir.join("past_plans.json")
    }

    pub fn weights_path(&self) -> PathBuf {
        self.dir.join("weights.json")
    }
}

impl ProfileStore for JsonDocumentStore {
    fn get_profile(&self) -> Result<Option<Profile>> {
        load_document(&self.profile_path())
    }

    fn save_profile(&mut self, profile: &Profile) -> Result<()> {
        save_document(&self.profile_path(), profile)
    }
}

impl PlanStore for JsonDocumentStore {
    fn get_plan(&self) -> Result<Option<WeeklyPlan>> {
        load_document(&self.plan_path())
    }

    fn save_plan(&mut self, plan: &WeeklyPlan) -> Result<()> {
        let archive = archive_plan(self.past_plans()?, self.get_plan()?, plan);
        save_document(&self.past_plans_path(), &archive)?;
        save_document(&self.plan_path(), plan)
    }

    fn past_plans(&self) -> Result<Vec<WeeklyPlan>> {
        Ok(load_document(&self.past_plans_path())?.unwrap_or_default())
    }
}

impl WeightStore for JsonDocumentStore {
    fn weight_logs(&self) -> Result<Vec<WeightLog>> {
        Ok(load_document(&self.weights_path())?.unwrap_or_default())
    }

    fn save_weight_logs(&mut self, logs: &[WeightLog]) -> Result<()> {
        save_document(&self.weights_path(), &logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardioPreference, ExperienceLevel, Gender};
    use chrono::{Duration, Utc};

    fn profile() -> Profile {
        Profile {
            name: Some("Ana".into()),
            height_cm: 165.0,
            weight_kg: 70.0,
            age: 31,
            gender: Gender::Female,
            experience: ExperienceLevel::Intermediate,
            days_per_week: 4,
            minutes_per_workout: 60,
            cardio_preference: CardioPreference::Bike,
            limitations: String::new(),
            waist_cm: None,
        }
    }

    #[test]
    fn test_profile_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonDocumentStore::new(temp_dir.path());

        assert!(store.get_profile().unwrap().is_none());

        store.save_profile(&profile()).unwrap();
        let loaded = store.get_profile().unwrap().unwrap();
        assert_eq!(loaded, profile());
    }

    #[test]
    fn test_corrupted_document_is_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonDocumentStore::new(temp_dir.path());

        std::fs::write(store.plan_path(), "{ invalid json }").unwrap();

        assert!(store.get_plan().unwrap().is_none());
    }

    fn plan(id: &str, days_ago: i64) -> WeeklyPlan {
        WeeklyPlan {
            id: id.into(),
            created_at: Utc::now() - Duration::days(days_ago),
            days: vec![],
        }
    }

    #[test]
    fn test_saving_plan_archives_previous() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonDocumentStore::new(temp_dir.path());
        assert!(store.past_plans().unwrap().is_empty());

        store.save_plan(&plan("first", 14)).unwrap();
        store.save_plan(&plan("second", 7)).unwrap();
        store.save_plan(&plan("third", 0)).unwrap();

        assert_eq!(store.get_plan().unwrap().unwrap().id, "third");
        let past: Vec<String> = store.past_plans().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(past, vec!["second", "first"]);
    }

    #[test]
    fn test_activate_archived_plan() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonDocumentStore::new(temp_dir.path());

        store.save_plan(&plan("first", 7)).unwrap();
        store.save_plan(&plan("second", 0)).unwrap();

        let restored = store.activate_plan("first").unwrap();
        assert_eq!(restored.id, "first");
        assert_eq!(store.get_plan().unwrap().unwrap().id, "first");

        let past: Vec<String> = store.past_plans().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(past, vec!["second"]);

        assert!(matches!(store.activate_plan("missing"), Err(Error::Plan(_))));
        assert_eq!(store.get_plan().unwrap().unwrap().id, "first");
    }

    #[test]
    fn test_weight_logs_default_to_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonDocumentStore::new(temp_dir.path());
        assert!(store.weight_logs().unwrap().is_empty());

        let logs = vec![WeightLog {
            date: Utc::now(),
            weight_kg: 82.4,
            waist_cm: Some(90.0),
        }];
        store.save_weight_logs(&logs).unwrap();
        assert_eq!(store.weight_logs().unwrap(), logs);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("doc.json");

        save_document(&path, &vec![1, 2, 3]).unwrap();
        save_document(&path, &vec![4]).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "doc.json")
            .collect();
        assert!(extras.is_empty(), "Found extras: {:?}", extras);

        let loaded: Option<Vec<i32>> = load_document(&path).unwrap();
        assert_eq!(loaded, Some(vec![4]));
    }

    #[test]
    fn test_remove_missing_document_is_ok() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("gone.json");
        assert!(remove_document(&path).is_ok());

        save_document(&path, &1u8).unwrap();
        remove_document(&path).unwrap();
        assert!(!path.exists());
    }
}
