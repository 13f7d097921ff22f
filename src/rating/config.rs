use serde::{Deserialize, Serialize};

/// Point values and weights used by the rating engine.
///
/// Every field defaults to the production constants, so a config only needs
/// to name what it overrides.
///
/// Example YAML:
/// ```yaml
/// rating:
///   reviews:
///     volume_cap: 10
///   price:
///     published_pricing: 15
///   weights:
///     trust: 0.30
///     reviews: 0.25
///     price: 0.25
///     access: 0.20
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RatingConfig {
    /// Upper bound applied to every sub-index
    pub ceiling: u32,
    pub reviews: ReviewsPoints,
    pub trust: TrustPoints,
    pub access: AccessPoints,
    pub price: PricePoints,
    pub weights: CompositeWeights,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            ceiling: 100,
            reviews: ReviewsPoints::default(),
            trust: TrustPoints::default(),
            access: AccessPoints::default(),
            price: PricePoints::default(),
            weights: CompositeWeights::default(),
        }
    }
}

/// External-review reputation points.
///
/// The rating bonus is linear across `rating_threshold ..= rating_threshold + rating_span`
/// and reaches `rating_points` at the top of that band.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewsPoints {
    pub base: u32,
    pub rating_threshold: f64,
    pub rating_span: f64,
    pub rating_points: u32,
    /// Reviews per volume step (e.g. every full 100 reviews)
    pub volume_step: u32,
    pub volume_points: u32,
    pub volume_cap: u32,
}

impl Default for ReviewsPoints {
    fn default() -> Self {
        Self {
            base: 70,
            rating_threshold: 4.0,
            rating_span: 1.0,
            rating_points: 20,
            volume_step: 100,
            volume_points: 2,
            volume_cap: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TrustPoints {
    pub base: u32,
    pub licenses: u32,
    pub certificates: u32,
    /// One point per year of experience, up to this many
    pub experience_cap: u32,
}

impl Default for TrustPoints {
    fn default() -> Self {
        Self {
            base: 70,
            licenses: 5,
            certificates: 5,
            experience_cap: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AccessPoints {
    pub base: u32,
    pub per_flag: u32,
}

impl Default for AccessPoints {
    fn default() -> Self {
        Self {
            base: 70,
            per_flag: 6,
        }
    }
}

/// Pricing transparency points. Unlike the other indices each flag carries
/// its own weight.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PricePoints {
    pub base: u32,
    pub published_pricing: u32,
    pub implant_warranty: u32,
    pub popular_service_promotions: u32,
    pub free_consultation: u32,
    pub interest_free_installment: u32,
    pub online_price_calculator: u32,
}

impl Default for PricePoints {
    fn default() -> Self {
        Self {
            base: 50,
            published_pricing: 15,
            implant_warranty: 10,
            popular_service_promotions: 10,
            free_consultation: 5,
            interest_free_installment: 5,
            online_price_calculator: 5,
        }
    }
}

/// Composite weights. Must sum to 1.0.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeWeights {
    pub trust: f64,
    pub reviews: f64,
    pub price: f64,
    pub access: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            trust: 0.30,
            reviews: 0.25,
            price: 0.25,
            access: 0.20,
        }
    }
}

impl CompositeWeights {
    pub fn sum(&self) -> f64 {
        self.trust + self.reviews + self.price + self.access
    }
}
