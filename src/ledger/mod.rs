//! The meal ledger: an ordered, in-memory list of meals shadowed by a full
//! JSON snapshot in a [`StorageClient`].

mod breakdown;
mod history;
mod ids;
mod types;

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, instrument, warn};

pub use breakdown::{breakdown, MealShare};
pub use history::{history, recent, DayGroup};
pub use ids::IdGenerator;
pub use types::{Meal, NewMeal};

use crate::storage::StorageClient;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to serialize ledger snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write ledger snapshot: {0:#}")]
    Storage(anyhow::Error),
}

/// Result of a mutation: the change is always applied in memory, `synced`
/// says whether the durable copy caught up.
#[derive(Debug)]
pub struct Synced<T> {
    pub value: T,
    pub synced: Result<(), LedgerError>,
}

impl<T> Synced<T> {
    pub fn persisted(&self) -> bool {
        self.synced.is_ok()
    }
}

pub struct MealLedger {
    storage: Arc<dyn StorageClient>,
    key: String,
    meals: RwLock<Vec<Meal>>,
    initialized: OnceCell<()>,
    ids: IdGenerator,
}

impl MealLedger {
    pub fn new(storage: Arc<dyn StorageClient>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            meals: RwLock::new(Vec::new()),
            initialized: OnceCell::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Builds a ledger and loads it from storage.
    pub async fn open(storage: Arc<dyn StorageClient>, key: impl Into<String>) -> Self {
        let ledger = Self::new(storage, key);
        ledger.init().await;
        ledger
    }

    /// Loads the stored snapshot. Only the first call does anything; a missing,
    /// unreadable or malformed snapshot leaves the ledger empty.
    pub async fn init(&self) {
        self.initialized
            .get_or_init(|| async move {
                debug!(key = %self.key, "initializing meal ledger");
                let loaded = self.load().await;
                if let Some(max) = loaded.iter().filter_map(|m| m.id.parse::<i64>().ok()).max() {
                    self.ids.observe(max);
                }
                info!(key = %self.key, count = loaded.len(), "meal ledger initialized");
                *self.meals.write().await = loaded;
            })
            .await;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    async fn load(&self) -> Vec<Meal> {
        let raw = match self.storage.get_object(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no stored meals");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, key = %self.key, "reading stored meals failed; starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice::<Vec<Meal>>(&raw) {
            Ok(meals) => meals,
            Err(e) => {
                warn!(error = %e, key = %self.key, "stored meals are malformed; starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrites the stored snapshot with the current ledger.
    pub async fn save(&self) -> Result<(), LedgerError> {
        let meals = self.meals.read().await;
        self.write_snapshot(&meals).await
    }

    async fn write_snapshot(&self, meals: &[Meal]) -> Result<(), LedgerError> {
        let body = serde_json::to_vec(meals)?;
        self.storage
            .put_object(&self.key, Bytes::from(body), "application/json")
            .await
            .map_err(LedgerError::Storage)?;
        debug!(key = %self.key, count = meals.len(), "meals saved");
        Ok(())
    }

    // Runs with the write lock held so snapshots land in mutation order.
    async fn sync(&self, meals: &[Meal]) -> Result<(), LedgerError> {
        let res = self.write_snapshot(meals).await;
        if let Err(e) = &res {
            warn!(error = %e, key = %self.key, "saving meals failed; memory and storage diverge");
        }
        res
    }

    /// Appends a meal under a fresh id. No field is validated.
    #[instrument(skip(self, meal), fields(name = %meal.name, date = %meal.date))]
    pub async fn add_meal(&self, meal: NewMeal) -> Synced<Meal> {
        self.init().await;
        let mut meals = self.meals.write().await;
        let mut id = self.ids.next_id();
        while meals.iter().any(|m| m.id == id) {
            id = self.ids.next_id();
        }
        let meal = meal.with_id(id);
        meals.push(meal.clone());
        debug!(id = %meal.id, count = meals.len(), "meal added");
        let synced = self.sync(&meals).await;
        Synced { value: meal, synced }
    }

    /// Removes the meal with `id`; `false` (and no write) if there is none.
    #[instrument(skip(self))]
    pub async fn delete_meal(&self, id: &str) -> Synced<bool> {
        self.init().await;
        let mut meals = self.meals.write().await;
        let Some(pos) = meals.iter().position(|m| m.id == id) else {
            debug!("no meal to delete");
            return Synced {
                value: false,
                synced: Ok(()),
            };
        };
        meals.remove(pos);
        debug!(count = meals.len(), "meal deleted");
        let synced = self.sync(&meals).await;
        Synced {
            value: true,
            synced,
        }
    }

    pub async fn meals(&self) -> Vec<Meal> {
        self.meals.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.meals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.meals.read().await.is_empty()
    }

    pub async fn find(&self, id: &str) -> Option<Meal> {
        self.meals.read().await.iter().find(|m| m.id == id).cloned()
    }

    /// Every meal dated `date`, in insertion order.
    pub async fn meals_for_day(&self, date: &str) -> Vec<Meal> {
        let meals: Vec<Meal> = self
            .meals
            .read()
            .await
            .iter()
            .filter(|m| m.date == date)
            .cloned()
            .collect();
        debug!(date, count = meals.len(), "meals for day");
        meals
    }

    pub async fn total_calories_for_day(&self, date: &str) -> i64 {
        let total = total_calories(&self.meals_for_day(date).await);
        debug!(date, total, "total calories for day");
        total
    }

    /// Like [`Self::meals_for_day`] but only meals owned by `user_id`.
    pub async fn user_meals_for_day(&self, user_id: &str, date: &str) -> Vec<Meal> {
        self.meals
            .read()
            .await
            .iter()
            .filter(|m| m.date == date && m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn user_meals(&self, user_id: &str) -> Vec<Meal> {
        self.meals
            .read()
            .await
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// Sum of calories, clamped at the `i64` bounds instead of overflowing.
pub fn total_calories(meals: &[Meal]) -> i64 {
    meals.iter().fold(0i64, |acc, m| acc.saturating_add(m.calories))
}
