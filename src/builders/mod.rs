//! Builders
//!
//! Fluent builders for reporting configuration.

pub mod config;

pub use config::{analytics_config, AnalyticsConfigBuilder};
