// lib.rs
pub mod aggregation;
pub mod analytics;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod picker;
pub mod pivot;
pub mod store;
pub mod user_interaction;
pub mod wizard;

pub use dashboard::Dashboard;
pub use error::{DashboardError, Result};
