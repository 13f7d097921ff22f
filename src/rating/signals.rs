use serde::{Deserialize, Serialize};

/// Raw attributes of one clinic at scoring time.
///
/// Every flag defaults to `false` when missing from a serialized record, so
/// the engine never sees an "unknown" flag.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClinicSignals {
    /// Aggregated third-party review rating (0.0 - 5.0)
    pub external_rating: Option<f64>,
    /// Number of third-party reviews backing `external_rating`
    pub external_rating_count: Option<u32>,
    pub doctor_experience_years: u32,

    pub has_licenses: bool,
    pub has_certificates: bool,

    pub online_booking: bool,
    pub weekend_hours: bool,
    pub evening_hours: bool,
    pub urgent_care_available: bool,
    pub convenient_location: bool,

    pub published_pricing: bool,
    pub free_consultation: bool,
    pub interest_free_installment: bool,
    pub implant_warranty: bool,
    pub popular_service_promotions: bool,
    pub online_price_calculator: bool,
}

impl ClinicSignals {
    /// The five access/convenience flags, labelled.
    pub fn access_flags(&self) -> [(&'static str, bool); 5] {
        [
            ("Online booking", self.online_booking),
            ("Weekend hours", self.weekend_hours),
            ("Evening hours", self.evening_hours),
            ("Urgent care", self.urgent_care_available),
            ("Convenient location", self.convenient_location),
        ]
    }
}

/// Four sub-indices plus the weighted composite.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct RatingResult {
    pub reviews_index: u32,
    pub trust_index: u32,
    pub access_index: u32,
    pub price_index: u32,
    pub composite_score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_flags_default_to_false() {
        let yaml = r#"
external_rating: 4.7
doctor_experience_years: 12
online_booking: true
"#;
        let signals: ClinicSignals = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(signals.external_rating, Some(4.7));
        assert!(signals.external_rating_count.is_none());
        assert_eq!(signals.doctor_experience_years, 12);
        assert!(signals.online_booking);
        assert!(!signals.has_licenses);
        assert!(!signals.published_pricing);
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        let signals: ClinicSignals = serde_json::from_str("{}").unwrap();
        assert_eq!(signals, ClinicSignals::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ClinicSignals, _> = serde_json::from_str(r#"{"parking": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_access_flags_order() {
        let signals = ClinicSignals {
            weekend_hours: true,
            convenient_location: true,
            ..Default::default()
        };
        let flags: Vec<bool> = signals.access_flags().iter().map(|(_, on)| *on).collect();
        assert_eq!(flags, vec![false, true, false, false, true]);
    }
}
