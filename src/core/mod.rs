//! Core Components
//!
//! Transport, parameter handling, decoding and time.

pub mod clock;
pub mod envelope;
pub mod http;
pub mod params;
pub mod transport;

pub use clock::*;
pub use envelope::*;
pub use http::*;
pub use params::*;
pub use transport::*;
