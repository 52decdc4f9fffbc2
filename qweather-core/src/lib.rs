//! Data-access core for a QWeather-backed weather app.
//!
//! This crate defines:
//! - Configuration handling (API key, unit, language, cache intervals)
//! - Outcome classification for single upstream calls
//! - A category fetch facade that never surfaces nulls or network errors
//!
//! It is used by `qweather-cli`, but can also be reused by other binaries or
//! services (a UI layer would sit on top of [`WeatherRepo`]).

pub mod api;
pub mod config;
pub mod model;
pub mod repo;
pub mod response;

pub use api::{QWeatherClient, WeatherApi};
pub use config::{CacheIntervals, FetchConfig, Unit};
pub use model::{Horizon, Location};
pub use repo::WeatherRepo;
pub use response::{ErrorHook, FetchError, Outcome};
