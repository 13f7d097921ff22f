use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::{compute_ratings_with, validate_signals, ClinicSignals, RatingConfig, RatingResult};

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicStore {
    pub version: u32,
    #[serde(default)]
    pub clinics: Vec<ClinicRecord>,
}

/// One clinic: identity, raw signals, and the indices last derived from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClinicRecord {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub signals: ClinicSignals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<RatedIndices>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatedIndices {
    #[serde(flatten)]
    pub result: RatingResult,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl ClinicRecord {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, signals: ClinicSignals) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            city: None,
            signals,
            ratings: None,
        }
    }

    pub fn composite_score(&self) -> Option<u32> {
        self.ratings.as_ref().map(|r| r.result.composite_score)
    }

    /// True when stored indices are missing or differ from a fresh computation
    pub fn is_stale(&self, config: &RatingConfig) -> bool {
        match &self.ratings {
            None => true,
            Some(rated) => rated.result != compute_ratings_with(&self.signals, config),
        }
    }

    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.slug.is_empty() {
            errors.push("slug: must not be empty".to_string());
        } else if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            errors.push(format!(
                "slug: '{}' may only contain a-z, 0-9 and '-'",
                self.slug
            ));
        }

        if self.name.trim().is_empty() {
            errors.push("name: must not be empty".to_string());
        }

        if let Err(signal_errors) = validate_signals(&self.signals) {
            errors.extend(signal_errors.into_iter().map(|e| format!("signals.{}", e)));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ClinicStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClinicStore {
    /// Create a new empty store with the current version
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION,
            clinics: Vec::new(),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&ClinicRecord> {
        self.clinics.iter().find(|c| c.slug == slug)
    }

    pub fn len(&self) -> usize {
        self.clinics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clinics.is_empty()
    }

    /// Validate a record, rate it, and insert or replace it by slug.
    ///
    /// Signals and their indices are always written together, so a stored
    /// record never carries indices derived from other attributes.
    pub fn upsert(
        &mut self,
        mut record: ClinicRecord,
        config: &RatingConfig,
        now: DateTime<Utc>,
    ) -> Result<UpsertOutcome, Vec<String>> {
        record.validate()?;

        let result = compute_ratings_with(&record.signals, config);
        record.ratings = Some(RatedIndices {
            result,
            rated_at: now,
        });

        tracing::debug!(
            slug = %record.slug,
            composite = result.composite_score,
            "rated clinic"
        );

        match self.clinics.iter_mut().find(|c| c.slug == record.slug) {
            Some(existing) => {
                *existing = record;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.clinics.push(record);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Upsert a batch of records, all or nothing.
    ///
    /// Returns `(inserted, updated)`. If any record is invalid the store is
    /// left untouched and every error is reported as `clinics[i].<field>`.
    pub fn import_all(
        &mut self,
        records: Vec<ClinicRecord>,
        config: &RatingConfig,
        now: DateTime<Utc>,
    ) -> Result<(usize, usize), Vec<String>> {
        let mut staged = self.clone();
        let mut errors = Vec::new();
        let (mut inserted, mut updated) = (0, 0);

        for (i, record) in records.into_iter().enumerate() {
            match staged.upsert(record, config, now) {
                Ok(UpsertOutcome::Inserted) => inserted += 1,
                Ok(UpsertOutcome::Updated) => updated += 1,
                Err(record_errors) => {
                    errors.extend(record_errors.into_iter().map(|e| format!("clinics[{}].{}", i, e)));
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        *self = staged;
        Ok((inserted, updated))
    }

    /// Check every record and require unique slugs, as a loaded document must
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for (i, record) in self.clinics.iter().enumerate() {
            if let Err(record_errors) = record.validate() {
                errors.extend(record_errors.into_iter().map(|e| format!("clinics[{}].{}", i, e)));
            }
            if !seen.insert(record.slug.as_str()) {
                errors.push(format!("clinics[{}].slug: duplicate slug '{}'", i, record.slug));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Remove a clinic by slug
    /// Returns true if the clinic was present, false otherwise
    pub fn remove(&mut self, slug: &str) -> bool {
        let before = self.clinics.len();
        self.clinics.retain(|c| c.slug != slug);
        self.clinics.len() != before
    }

    /// Recompute every record's indices. Returns how many records changed.
    ///
    /// Records whose indices are already current keep their `rated_at`.
    pub fn rescore(&mut self, config: &RatingConfig, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for record in &mut self.clinics {
            let result = compute_ratings_with(&record.signals, config);
            let current = record
                .ratings
                .as_ref()
                .is_some_and(|rated| rated.result == result);
            if !current {
                tracing::debug!(slug = %record.slug, composite = result.composite_score, "rescored");
                record.ratings = Some(RatedIndices {
                    result,
                    rated_at: now,
                });
                changed += 1;
            }
        }
        changed
    }

    /// Records whose stored indices no longer match their signals
    pub fn stale(&self, config: &RatingConfig) -> Vec<&ClinicRecord> {
        self.clinics.iter().filter(|c| c.is_stale(config)).collect()
    }
}
