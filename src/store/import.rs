use anyhow::{Context, Result};
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use super::types::ClinicRecord;
use crate::rating::ClinicSignals;

/// A single document or a list of them.
///
/// Picks the shape from the top-level node (sequence or mapping) and then
/// deserializes the concrete type, so field errors such as an unknown key
/// reach the user unchanged.
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

struct OneOrManyVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrManyVisitor<T> {
    type Value = OneOrMany<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a clinic record or a list of clinic records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        Vec::deserialize(SeqAccessDeserializer::new(seq)).map(OneOrMany::Many)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(MapAccessDeserializer::new(map)).map(OneOrMany::One)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OneOrManyVisitor(PhantomData))
    }
}

/// Parse a JSON or YAML document, choosing by file extension (`.json` is JSON,
/// anything else is YAML).
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))
    }
}

/// Read one clinic record or a list of them
pub fn read_clinic_records(path: &Path) -> Result<Vec<ClinicRecord>> {
    let records = match read_document::<OneOrMany<ClinicRecord>>(path)? {
        OneOrMany::Many(records) => records,
        OneOrMany::One(record) => vec![record],
    };
    Ok(records)
}

/// Read a bare signals document (no identity fields)
pub fn read_signals(path: &Path) -> Result<ClinicSignals> {
    read_document(path)
}
