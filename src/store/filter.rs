use std::cmp::Ordering;

use anyhow::{Context, Result};
use glob::Pattern;

use super::types::{ClinicRecord, ClinicStore};

/// Narrow a listing by city and slug pattern
#[derive(Debug, Clone, Default)]
pub struct ClinicFilter {
    city: Option<String>,
    slug: Option<Pattern>,
}

impl ClinicFilter {
    pub fn new(city: Option<&str>, slug_pattern: Option<&str>) -> Result<Self> {
        let slug = slug_pattern
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid slug pattern '{}'", p)))
            .transpose()?;
        Ok(Self {
            city: city.map(str::to_lowercase),
            slug,
        })
    }

    pub fn matches(&self, record: &ClinicRecord) -> bool {
        if let Some(ref city) = self.city {
            let same_city = record
                .city
                .as_deref()
                .is_some_and(|c| c.to_lowercase() == *city);
            if !same_city {
                return false;
            }
        }
        if let Some(ref pattern) = self.slug {
            if !pattern.matches(&record.slug) {
                return false;
            }
        }
        true
    }
}

/// Ranking order: composite descending, then name, then slug. Unrated records sort last.
pub fn compare_ranked(a: &ClinicRecord, b: &ClinicRecord) -> Ordering {
    // Primary: score descending (None < Some, so reversed puts unrated last)
    b.composite_score()
        .cmp(&a.composite_score())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.slug.cmp(&b.slug))
}

impl ClinicStore {
    /// Clinics matching `filter`, best first
    pub fn ranked(&self, filter: &ClinicFilter) -> Vec<&ClinicRecord> {
        let mut ranked: Vec<&ClinicRecord> =
            self.clinics.iter().filter(|c| filter.matches(c)).collect();
        ranked.sort_by(|a, b| compare_ranked(a, b));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{ClinicSignals, RatingConfig};
    use chrono::Utc;

    fn create_test_clinic(slug: &str, name: &str, city: &str, licenses: bool) -> ClinicRecord {
        let mut record = ClinicRecord::new(
            slug,
            name,
            ClinicSignals {
                has_licenses: licenses,
                ..Default::default()
            },
        );
        record.city = Some(city.to_string());
        record
    }

    fn sample_store() -> ClinicStore {
        let mut store = ClinicStore::new();
        let config = RatingConfig::default();
        for record in [
            create_test_clinic("smile-balti", "Smile", "Bălți", false),
            create_test_clinic("dent-art", "Dent Art", "Chișinău", true),
            create_test_clinic("alfa-dent", "alfa Dent", "Chișinău", false),
        ] {
            store.upsert(record, &config, Utc::now()).unwrap();
        }
        store
    }

    #[test]
    fn test_ranked_by_composite_then_name() {
        let store = sample_store();
        let slugs: Vec<&str> = store
            .ranked(&ClinicFilter::default())
            .iter()
            .map(|c| c.slug.as_str())
            .collect();
        // dent-art holds a license; the other two tie at 65 and sort by name
        assert_eq!(slugs, vec!["dent-art", "alfa-dent", "smile-balti"]);
    }

    #[test]
    fn test_unrated_sort_last() {
        let mut store = sample_store();
        store
            .clinics
            .push(ClinicRecord::new("aaa", "AAA", ClinicSignals::default()));
        let ranked = store.ranked(&ClinicFilter::default());
        assert_eq!(ranked.last().unwrap().slug, "aaa");
    }

    #[test]
    fn test_city_filter_case_insensitive() {
        let store = sample_store();
        let filter = ClinicFilter::new(Some("CHIȘINĂU"), None).unwrap();
        let ranked = store.ranked(&filter);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|c| c.city.as_deref() == Some("Chișinău")));
    }

    #[test]
    fn test_slug_glob_filter() {
        let store = sample_store();
        let filter = ClinicFilter::new(None, Some("*-dent")).unwrap();
        let ranked = store.ranked(&filter);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].slug, "alfa-dent");
    }

    #[test]
    fn test_invalid_glob_errors() {
        assert!(ClinicFilter::new(None, Some("[unclosed")).is_err());
    }

    #[test]
    fn test_filter_without_city_excludes_cityless_when_city_requested() {
        let record = ClinicRecord::new("x", "X", ClinicSignals::default());
        let filter = ClinicFilter::new(Some("Chișinău"), None).unwrap();
        assert!(!filter.matches(&record));
        assert!(ClinicFilter::default().matches(&record));
    }
}
