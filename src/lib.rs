pub mod config;
pub mod output;
pub mod rating;
pub mod store;
