//! This is a library for storing named locations and finding the ones that are
//! near a given point.

use serde::{Deserialize, Deserializer};

pub mod core;
pub mod error;
pub mod geo;
pub mod location;
pub mod memory;
pub mod search;
pub mod tripcost;

pub use crate::core::database::Database;
pub use error::Error;
pub use error::Result;

/// Deserializes any value into a number, treating missing, null and non-numeric
/// values as `None`. Request handlers use this so that a malformed coordinate is
/// reported as an invalid argument rather than a parse failure.
pub fn number_or_none<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_f64))
}
