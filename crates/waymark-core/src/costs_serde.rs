//! `#[serde(with = "...")]` helpers for fixed-size cost tables.
//!
//! Infinite costs mark impassable entries. JSON has no infinity, so such
//! entries are written as `null` and read back as `f64::INFINITY`.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer, const N: usize>(table: &[f64; N], s: S) -> Result<S::Ok, S::Error> {
    let entries: Vec<Option<f64>> = table.iter().map(|&c| c.is_finite().then_some(c)).collect();
    entries.serialize(s)
}

pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(d: D) -> Result<[f64; N], D::Error> {
    let entries = Vec::<Option<f64>>::deserialize(d)?;
    let len = entries.len();
    let costs: Vec<f64> = entries
        .into_iter()
        .map(|c| c.unwrap_or(f64::INFINITY))
        .collect();
    costs
        .try_into()
        .map_err(|_| D::Error::invalid_length(len, &"one cost per table entry"))
}
