use super::config::{AccessPoints, CompositeWeights, PricePoints, RatingConfig, ReviewsPoints, TrustPoints};
use super::signals::{ClinicSignals, RatingResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub label: String, // e.g. "Licenses", "Rating 4.5", "320 reviews"
    pub points: u32,
}

/// How one sub-index was assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBreakdown {
    pub base: u32,
    pub contributions: Vec<Contribution>,
    pub value: u32,
    /// True when the raw sum exceeded the ceiling and was cut down
    pub clamped: bool,
}

impl IndexBreakdown {
    fn new(base: u32) -> Self {
        Self {
            base,
            contributions: Vec::new(),
            value: base,
            clamped: false,
        }
    }

    fn award(&mut self, label: impl Into<String>, points: u32) {
        if points == 0 {
            return;
        }
        self.value = self.value.saturating_add(points);
        self.contributions.push(Contribution {
            label: label.into(),
            points,
        });
    }

    fn finish(mut self, ceiling: u32) -> Self {
        if self.value > ceiling {
            self.value = ceiling;
            self.clamped = true;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingExplanation {
    pub result: RatingResult,
    pub reviews: IndexBreakdown,
    pub trust: IndexBreakdown,
    pub access: IndexBreakdown,
    pub price: IndexBreakdown,
    /// Weighted sum before rounding
    pub composite_raw: f64,
}

/// Rate a clinic with the default constants.
pub fn compute_ratings(signals: &ClinicSignals) -> RatingResult {
    compute_ratings_with(signals, &RatingConfig::default())
}

/// Rate a clinic with explicit constants.
///
/// Total over its input: out-of-range values are absorbed by the per-index
/// ceiling rather than reported.
pub fn compute_ratings_with(signals: &ClinicSignals, config: &RatingConfig) -> RatingResult {
    explain_ratings(signals, config).result
}

pub fn explain_ratings(signals: &ClinicSignals, config: &RatingConfig) -> RatingExplanation {
    let reviews = reviews_index(signals, &config.reviews).finish(config.ceiling);
    let trust = trust_index(signals, &config.trust).finish(config.ceiling);
    let access = access_index(signals, &config.access).finish(config.ceiling);
    let price = price_index(signals, &config.price).finish(config.ceiling);

    let composite_raw = weighted_sum(
        &config.weights,
        trust.value,
        reviews.value,
        price.value,
        access.value,
    );

    RatingExplanation {
        result: RatingResult {
            reviews_index: reviews.value,
            trust_index: trust.value,
            access_index: access.value,
            price_index: price.value,
            composite_score: composite_raw.round().max(0.0) as u32,
        },
        reviews,
        trust,
        access,
        price,
        composite_raw,
    }
}

fn reviews_index(signals: &ClinicSignals, points: &ReviewsPoints) -> IndexBreakdown {
    let mut index = IndexBreakdown::new(points.base);

    // Below the threshold there is no bonus and no penalty
    if let Some(rating) = signals.external_rating {
        if rating >= points.rating_threshold {
            let fraction = ((rating - points.rating_threshold) / points.rating_span).min(1.0);
            let bonus = (fraction * points.rating_points as f64).round() as u32;
            index.award(format!("Rating {:.1}", rating), bonus);
        }
    }

    if let Some(count) = signals.external_rating_count {
        let steps = count.checked_div(points.volume_step).unwrap_or(0);
        let bonus = steps.saturating_mul(points.volume_points).min(points.volume_cap);
        index.award(format!("{} reviews", count), bonus);
    }

    index
}

fn trust_index(signals: &ClinicSignals, points: &TrustPoints) -> IndexBreakdown {
    let mut index = IndexBreakdown::new(points.base);

    if signals.has_licenses {
        index.award("Licenses", points.licenses);
    }
    if signals.has_certificates {
        index.award("Certificates", points.certificates);
    }

    let years = signals.doctor_experience_years;
    index.award(
        format!("{} years experience", years),
        years.min(points.experience_cap),
    );

    index
}

fn access_index(signals: &ClinicSignals, points: &AccessPoints) -> IndexBreakdown {
    let mut index = IndexBreakdown::new(points.base);
    for (label, on) in signals.access_flags() {
        if on {
            index.award(label, points.per_flag);
        }
    }
    index
}

fn price_index(signals: &ClinicSignals, points: &PricePoints) -> IndexBreakdown {
    let mut index = IndexBreakdown::new(points.base);

    let flags = [
        ("Published pricing", signals.published_pricing, points.published_pricing),
        ("Implant warranty", signals.implant_warranty, points.implant_warranty),
        (
            "Service promotions",
            signals.popular_service_promotions,
            points.popular_service_promotions,
        ),
        ("Free consultation", signals.free_consultation, points.free_consultation),
        (
            "Interest-free installment",
            signals.interest_free_installment,
            points.interest_free_installment,
        ),
        (
            "Online price calculator",
            signals.online_price_calculator,
            points.online_price_calculator,
        ),
    ];

    for (label, on, value) in flags {
        if on {
            index.award(label, value);
        }
    }

    index
}

fn weighted_sum(weights: &CompositeWeights, trust: u32, reviews: u32, price: u32, access: u32) -> f64 {
    trust as f64 * weights.trust
        + reviews as f64 * weights.reviews
        + price as f64 * weights.price
        + access as f64 * weights.access
}
