//! Flight plan store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::plan::{FlightPlan, RawFlightPlan};

use super::{read_json, write_json};

/// Flight plans keyed by aircraft identification.
///
/// Backed by a single JSON object on disk. Every mutation rewrites the
/// whole file. Records are kept as stored: an incomplete record still loads,
/// lists and deletes, and only fails once something requires a missing item.
#[derive(Debug)]
pub struct FlightPlanStore {
    /// Path to the backing file.
    path: PathBuf,
    /// In-memory copy of the backing file.
    plans: BTreeMap<String, RawFlightPlan>,
}

impl FlightPlanStore {
    /// Open the store at `path`, loading its current contents.
    ///
    /// A missing file yields an empty store; nothing is written until the
    /// first mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            plans: BTreeMap::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Re-read the backing file, replacing the in-memory copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&mut self) -> Result<&BTreeMap<String, RawFlightPlan>> {
        self.plans = read_json(&self.path)?.unwrap_or_default();
        for (key, record) in &self.plans {
            let missing: Vec<&str> = record.missing().map(|field| field.code()).collect();
            if !missing.is_empty() {
                warn!("Flight plan {key} is missing item(s) {}", missing.join(", "));
            }
        }
        debug!(
            "Loaded {} flight plan(s) from {}",
            self.plans.len(),
            self.path.display()
        );
        Ok(&self.plans)
    }

    /// Replace the whole mapping and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn save(&mut self, plans: BTreeMap<String, RawFlightPlan>) -> Result<()> {
        self.plans = plans;
        self.persist()
    }

    /// All stored plans, ordered by identification.
    #[must_use]
    pub fn plans(&self) -> &BTreeMap<String, RawFlightPlan> {
        &self.plans
    }

    /// Look up a stored record by identification.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RawFlightPlan> {
        self.plans.get(key)
    }

    /// Check whether a plan is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.plans.contains_key(key)
    }

    /// Stored identifications, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(String::as_str)
    }

    /// Number of stored plans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Check whether the store holds no plans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Insert or overwrite the plan stored under its identification.
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the store untouched, if the
    /// identification is blank. Returns a storage error if the file cannot
    /// be written.
    pub fn create_or_update(&mut self, plan: FlightPlan) -> Result<()> {
        plan.validate()?;

        let key = plan.identification().to_string();
        let replaced = self.plans.insert(key.clone(), plan.into()).is_some();
        self.persist()?;

        if replaced {
            info!("Updated flight plan {key}");
        } else {
            info!("Saved flight plan {key}");
        }
        Ok(())
    }

    /// Store `plan` in place of the plan under `old_key`.
    ///
    /// If the identification changed, the old key is removed and the plan is
    /// inserted under the new one. A plan already stored under the new
    /// identification is overwritten without complaint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlanNotFound`] if nothing is stored under `old_key`,
    /// a validation error if the new identification is blank, and a storage
    /// error if the file cannot be written.
    pub fn rename_and_update(&mut self, old_key: &str, plan: FlightPlan) -> Result<()> {
        if !self.plans.contains_key(old_key) {
            return Err(Error::plan_not_found(old_key));
        }
        plan.validate()?;

        let new_key = plan.identification().to_string();
        if new_key != old_key {
            self.plans.remove(old_key);
            if self.plans.contains_key(&new_key) {
                warn!("Flight plan {new_key} is overwritten by renamed {old_key}");
            }
            info!("Renamed flight plan {old_key} to {new_key}");
        }
        self.plans.insert(new_key, plan.into());
        self.persist()
    }

    /// Remove the plan stored under `key`.
    ///
    /// Returns `true` if a plan was removed. Removing an absent key is not
    /// an error and still rewrites the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let removed = self.plans.remove(key).is_some();
        self.persist()?;

        if removed {
            info!("Deleted flight plan {key}");
        } else {
            debug!("No flight plan {key} to delete");
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        write_json(&self.path, &self.plans)
    }
}
