pub mod config;
pub mod engine;
pub mod signals;
pub mod validation;

pub use config::*;
pub use engine::{
    compute_ratings, compute_ratings_with, explain_ratings, Contribution, IndexBreakdown,
    RatingExplanation,
};
pub use signals::{ClinicSignals, RatingResult};
pub use validation::{validate_rating, validate_signals};
