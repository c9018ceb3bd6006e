//! Data Types
//!
//! Provider payloads and configuration constants.

pub mod config;
pub mod report;
pub mod token;

pub use config::*;
pub use report::*;
pub use token::*;
