use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rating::RatingConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Clinic store location (defaults to ~/.config/clinic-rank/clinics.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,

    /// Point values and weights; omitted sections keep their defaults
    #[serde(default)]
    pub rating: Option<RatingConfig>,
}

impl Config {
    /// Rating constants in effect, falling back to the defaults.
    pub fn effective_rating(&self) -> RatingConfig {
        self.rating.clone().unwrap_or_default()
    }
}
