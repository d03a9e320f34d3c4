//! Core library for the weather web app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Query resolution and the OpenWeather provider
//! - Extraction of a report from provider payloads
//! - HTML rendering of reports and error pages
//!
//! It is used by `weather-web`, but has no dependency on any HTTP server.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;
pub mod report;
pub mod resolver;
pub mod service;

pub use config::Config;
pub use error::{UpstreamError, WeatherError};
pub use model::{DayForecast, Location, ProviderPayload, Units, WeatherQuery, WeatherReport};
pub use provider::WeatherProvider;
pub use resolver::{ProviderRequest, resolve_query};
pub use service::WeatherService;
