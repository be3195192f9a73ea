//! Patch helpers for nullable columns.
//!
//! A nullable patch value is `Option<Option<T>>`: the outer `None` means the key was absent
//! and the stored value stays, `Some(None)` is an explicit `null` that clears it.

use serde::{Deserialize, Deserializer};

/// Deserialize a present key into `Some(..)`, so an explicit `null` becomes `Some(None)`.
///
/// Pair with `#[serde(default)]` so an absent key stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolve a nullable patch value against the stored one.
pub fn merge_nullable<T: Clone>(patch: &Option<Option<T>>, stored: Option<T>) -> Option<T> {
    match patch {
        Some(value) => value.clone(),
        None => stored,
    }
}
