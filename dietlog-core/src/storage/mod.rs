//! Key-value persistence for the stores.
//!
//! Every store reads and writes whole values under fixed string keys. The
//! keys live in one process-wide namespace, so each store uses its own:
//!
//! | Key               | Value                              |
//! |-------------------|------------------------------------|
//! | `foods`           | JSON array of food entries         |
//! | `mealPlans`       | JSON array of meal plan days       |
//! | `last_reset_date` | `YYYY-MM-DD` of the last rollover  |
//! | `proteinGoal`     | numeric string                     |
//! | `calorieGoal`     | numeric string                     |
//!
//! [`FileStore`] keeps one file per key in a data directory. [`MemoryStore`]
//! keeps values in memory.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::io;
use std::path::PathBuf;

pub const FOODS_KEY: &str = "foods";
pub const MEAL_PLANS_KEY: &str = "mealPlans";
pub const LAST_RESET_KEY: &str = "last_reset_date";
pub const PROTEIN_GOAL_KEY: &str = "proteinGoal";
pub const CALORIE_GOAL_KEY: &str = "calorieGoal";

/// A string-keyed store of string values.
pub trait KeyValueStore {
    /// Returns the value for `key`, or `None` if it was never set or has
    /// been removed.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Errors from the key-value layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Keys double as file names, so only a safe character set is allowed.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        for key in [
            FOODS_KEY,
            MEAL_PLANS_KEY,
            LAST_RESET_KEY,
            PROTEIN_GOAL_KEY,
            CALORIE_GOAL_KEY,
        ] {
            assert!(validate_key(key).is_ok(), "{key} should be valid");
        }

        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("a/b").is_err());
    }

    #[test]
    fn test_keys_are_distinct() {
        let mut keys = vec![
            FOODS_KEY,
            MEAL_PLANS_KEY,
            LAST_RESET_KEY,
            PROTEIN_GOAL_KEY,
            CALORIE_GOAL_KEY,
        ];
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 5);
    }
}
