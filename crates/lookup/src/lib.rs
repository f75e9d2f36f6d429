//! HTTP lookup clients for the almanac assistant.
//!
//! This crate wraps the two external data providers the assistant can
//! consult: OpenWeatherMap for current weather and Polygon for previous-day
//! stock aggregates. Each client issues a single GET with a bounded timeout
//! and decodes the fields the assistant needs — no retries, no caching.

mod error;
mod stocks;
mod weather;

pub use error::{LookupError, Result};
pub use stocks::StocksClient;
pub use weather::WeatherClient;

use std::time::Duration;

/// Timeout applied to every outbound lookup request.
pub(crate) const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
