//! Daily protein and calorie goals.

use serde::Serialize;

use crate::models::MacroTotals;
use crate::storage::{KeyValueStore, CALORIE_GOAL_KEY, PROTEIN_GOAL_KEY};

pub const DEFAULT_PROTEIN_GOAL: f64 = 150.0;
pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;

/// Progress towards the goals, in percent, capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub protein_percent: f64,
    pub calorie_percent: f64,
}

/// Protein (grams) and calorie goals, each stored as a numeric string
/// under its own key.
pub struct GoalsStore<S> {
    storage: S,
    protein_goal: f64,
    calorie_goal: f64,
}

impl<S: KeyValueStore> GoalsStore<S> {
    /// Creates a store holding the default goals.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            protein_goal: DEFAULT_PROTEIN_GOAL,
            calorie_goal: DEFAULT_CALORIE_GOAL,
        }
    }

    /// Loads saved goals. Missing, empty or unparsable values leave the
    /// current goal unchanged.
    pub fn initialize(&mut self) {
        if let Some(goal) = self.load_goal(PROTEIN_GOAL_KEY) {
            self.protein_goal = goal;
        }
        if let Some(goal) = self.load_goal(CALORIE_GOAL_KEY) {
            self.calorie_goal = goal;
        }
    }

    fn load_goal(&self, key: &str) -> Option<f64> {
        let saved = match self.storage.get(key) {
            Ok(saved) => saved?,
            Err(e) => {
                tracing::error!("Error loading goals: {}", e);
                return None;
            }
        };
        let saved = saved.trim();
        if saved.is_empty() {
            return None;
        }
        match saved.parse::<f64>() {
            Ok(goal) if goal.is_finite() => Some(goal),
            _ => {
                tracing::warn!("Ignoring invalid {} value '{}'", key, saved);
                None
            }
        }
    }

    pub fn protein_goal(&self) -> f64 {
        self.protein_goal
    }

    pub fn calorie_goal(&self) -> f64 {
        self.calorie_goal
    }

    /// Sets the protein goal. Negative or non-finite values become 0.
    pub fn set_protein_goal(&mut self, grams: f64) {
        self.protein_goal = sanitize(grams);
        self.persist();
    }

    /// Sets the calorie goal. Negative or non-finite values become 0.
    pub fn set_calorie_goal(&mut self, calories: f64) {
        self.calorie_goal = sanitize(calories);
        self.persist();
    }

    pub fn progress(&self, totals: &MacroTotals) -> GoalProgress {
        GoalProgress {
            protein_percent: percent_of(totals.protein, self.protein_goal),
            calorie_percent: percent_of(totals.calories, self.calorie_goal),
        }
    }

    /// Writes both goals.
    fn persist(&self) {
        for (key, value) in [
            (PROTEIN_GOAL_KEY, self.protein_goal),
            (CALORIE_GOAL_KEY, self.calorie_goal),
        ] {
            if let Err(e) = self.storage.set(key, &value.to_string()) {
                tracing::error!("Error saving goals: {}", e);
            }
        }
    }
}

fn sanitize(goal: f64) -> f64 {
    if goal.is_finite() && goal > 0.0 {
        goal
    } else {
        0.0
    }
}

/// `total / goal` as a percentage capped at 100. A zero goal counts as met
/// as soon as anything was eaten.
fn percent_of(total: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        (total / goal * 100.0).min(100.0)
    } else if total > 0.0 {
        100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn totals(protein: f64, calories: f64) -> MacroTotals {
        MacroTotals {
            protein,
            calories,
            ..MacroTotals::default()
        }
    }

    #[test]
    fn test_defaults() {
        let mut store = GoalsStore::new(MemoryStore::new());
        store.initialize();
        assert_eq!(store.protein_goal(), 150.0);
        assert_eq!(store.calorie_goal(), 2000.0);
    }

    #[test]
    fn test_loads_saved_goals() {
        let storage = MemoryStore::new();
        storage.set(PROTEIN_GOAL_KEY, "180").unwrap();
        storage.set(CALORIE_GOAL_KEY, "2500.5").unwrap();

        let mut store = GoalsStore::new(storage);
        store.initialize();

        assert_eq!(store.protein_goal(), 180.0);
        assert_eq!(store.calorie_goal(), 2500.5);
    }

    #[test]
    fn test_invalid_saved_goal_keeps_default() {
        let storage = MemoryStore::new();
        storage.set(PROTEIN_GOAL_KEY, "lots").unwrap();
        storage.set(CALORIE_GOAL_KEY, "").unwrap();

        let mut store = GoalsStore::new(storage);
        store.initialize();

        assert_eq!(store.protein_goal(), DEFAULT_PROTEIN_GOAL);
        assert_eq!(store.calorie_goal(), DEFAULT_CALORIE_GOAL);
    }

    #[test]
    fn test_set_goal_persists_both_keys() {
        let storage = MemoryStore::new();
        let mut store = GoalsStore::new(storage.clone());
        store.initialize();

        store.set_protein_goal(120.0);

        assert_eq!(storage.get(PROTEIN_GOAL_KEY).unwrap(), Some("120".to_string()));
        assert_eq!(storage.get(CALORIE_GOAL_KEY).unwrap(), Some("2000".to_string()));

        let mut reloaded = GoalsStore::new(storage);
        reloaded.initialize();
        assert_eq!(reloaded.protein_goal(), 120.0);
    }

    #[test]
    fn test_set_goal_sanitizes() {
        let mut store = GoalsStore::new(MemoryStore::new());
        store.set_calorie_goal(f64::NAN);
        assert_eq!(store.calorie_goal(), 0.0);
        store.set_protein_goal(-5.0);
        assert_eq!(store.protein_goal(), 0.0);
    }

    #[test]
    fn test_progress() {
        let store = GoalsStore::new(MemoryStore::new());

        let progress = store.progress(&totals(75.0, 500.0));
        assert_eq!(progress.protein_percent, 50.0);
        assert_eq!(progress.calorie_percent, 25.0);

        let progress = store.progress(&totals(300.0, 2000.0));
        assert_eq!(progress.protein_percent, 100.0);
        assert_eq!(progress.calorie_percent, 100.0);
    }

    #[test]
    fn test_progress_with_zero_goal() {
        let mut store = GoalsStore::new(MemoryStore::new());
        store.set_protein_goal(0.0);

        assert_eq!(store.progress(&totals(0.0, 0.0)).protein_percent, 0.0);
        assert_eq!(store.progress(&totals(10.0, 0.0)).protein_percent, 100.0);
    }
}
