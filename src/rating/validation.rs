use super::config::RatingConfig;
use super::signals::ClinicSignals;

const WEIGHT_TOLERANCE: f64 = 1e-6;
const MAX_EXTERNAL_RATING: f64 = 5.0;

/// Validate rating configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_rating(config: &RatingConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let weights = [
        ("trust", config.weights.trust),
        ("reviews", config.weights.reviews),
        ("price", config.weights.price),
        ("access", config.weights.access),
    ];
    let mut weights_usable = true;
    for (name, weight) in weights {
        if !weight.is_finite() || weight < 0.0 {
            errors.push(format!(
                "rating.weights.{}: must be a non-negative number, got {}",
                name, weight
            ));
            weights_usable = false;
        }
    }
    if weights_usable {
        let sum = config.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            errors.push(format!("rating.weights: must sum to 1.0, got {}", sum));
        }
    }

    let reviews = &config.reviews;
    if !reviews.rating_threshold.is_finite() {
        errors.push("rating.reviews.rating_threshold: must be a finite number".to_string());
    }
    if !reviews.rating_span.is_finite() || reviews.rating_span <= 0.0 {
        errors.push(format!(
            "rating.reviews.rating_span: must be positive, got {}",
            reviews.rating_span
        ));
    }
    if reviews.volume_step == 0 {
        errors.push("rating.reviews.volume_step: must be at least 1".to_string());
    }

    let bases = [
        ("reviews", config.reviews.base),
        ("trust", config.trust.base),
        ("access", config.access.base),
        ("price", config.price.base),
    ];
    for (name, base) in bases {
        if base > config.ceiling {
            errors.push(format!(
                "rating.{}.base: {} exceeds ceiling {}",
                name, base, config.ceiling
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate raw clinic attributes before they reach the engine.
///
/// The engine itself never rejects input; callers that accept user-submitted
/// records run this first.
pub fn validate_signals(signals: &ClinicSignals) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match signals.external_rating {
        Some(rating) if !rating.is_finite() => {
            errors.push("external_rating: must be a finite number".to_string());
        }
        Some(rating) if !(0.0..=MAX_EXTERNAL_RATING).contains(&rating) => {
            errors.push(format!(
                "external_rating: must be between 0.0 and {:.1}, got {}",
                MAX_EXTERNAL_RATING, rating
            ));
        }
        Some(_) => {}
        None => {
            if signals.external_rating_count.is_some() {
                errors.push(
                    "external_rating_count: present without external_rating".to_string(),
                );
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        assert!(validate_rating(&RatingConfig::default()).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = RatingConfig::default();
        config.weights.trust = 0.5;
        let errors = validate_rating(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("rating.weights"));
        assert!(errors[0].contains("sum to 1.0"));
    }

    #[test]
    fn test_rebalanced_weights_pass() {
        let mut config = RatingConfig::default();
        config.weights.trust = 0.4;
        config.weights.access = 0.1;
        assert!(validate_rating(&config).is_ok());
    }

    #[test]
    fn test_negative_weight() {
        let mut config = RatingConfig::default();
        config.weights.access = -0.2;
        config.weights.trust = 0.7;
        let errors = validate_rating(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("rating.weights.access"));
    }

    #[test]
    fn test_zero_volume_step() {
        let mut config = RatingConfig::default();
        config.reviews.volume_step = 0;
        let errors = validate_rating(&config).unwrap_err();
        assert!(errors[0].contains("rating.reviews.volume_step"));
    }

    #[test]
    fn test_base_above_ceiling() {
        let mut config = RatingConfig::default();
        config.price.base = 120;
        let errors = validate_rating(&config).unwrap_err();
        assert!(errors[0].contains("rating.price.base"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RatingConfig::default();
        config.weights.reviews = 0.9; // Error 1
        config.reviews.rating_span = 0.0; // Error 2
        config.reviews.volume_step = 0; // Error 3
        config.trust.base = 150; // Error 4
        let errors = validate_rating(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_valid_signals() {
        let signals = ClinicSignals {
            external_rating: Some(4.8),
            external_rating_count: Some(120),
            doctor_experience_years: 15,
            ..Default::default()
        };
        assert!(validate_signals(&signals).is_ok());
        assert!(validate_signals(&ClinicSignals::default()).is_ok());
    }

    #[test]
    fn test_rating_bounds_inclusive() {
        for rating in [0.0, 5.0] {
            let signals = ClinicSignals {
                external_rating: Some(rating),
                ..Default::default()
            };
            assert!(validate_signals(&signals).is_ok(), "rating={}", rating);
        }
    }

    #[test]
    fn test_rating_above_five_rejected() {
        let signals = ClinicSignals {
            external_rating: Some(5.2),
            ..Default::default()
        };
        let errors = validate_signals(&signals).unwrap_err();
        assert!(errors[0].contains("external_rating"));
    }

    #[test]
    fn test_negative_rating_rejected() {
        let signals = ClinicSignals {
            external_rating: Some(-1.0),
            ..Default::default()
        };
        assert!(validate_signals(&signals).is_err());
    }

    #[test]
    fn test_nan_rating_rejected() {
        let signals = ClinicSignals {
            external_rating: Some(f64::NAN),
            ..Default::default()
        };
        let errors = validate_signals(&signals).unwrap_err();
        assert!(errors[0].contains("finite"));
    }

    #[test]
    fn test_count_without_rating_rejected() {
        let signals = ClinicSignals {
            external_rating_count: Some(40),
            ..Default::default()
        };
        let errors = validate_signals(&signals).unwrap_err();
        assert!(errors[0].contains("external_rating_count"));
    }
}
