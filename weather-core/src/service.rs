use std::sync::Arc;

use crate::{
    Config, WeatherError, WeatherProvider, WeatherQuery, WeatherReport,
    provider::provider_from_config, render,
};

/// Glue between a provider and the renderer. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Fails with [`WeatherError::Configuration`] before any provider call
    /// when the API key is missing.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let provider = provider_from_config(config)?;
        Ok(Self::new(Arc::from(provider)))
    }

    pub async fn lookup(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let payload = self.provider.fetch(query).await.inspect_err(|e| {
            tracing::warn!(
                location = %query.location,
                status = provider_status(e),
                source = "api",
                error = %e,
                "lookup failed"
            );
        })?;

        let report = WeatherReport::from_payload(&payload, query.units).inspect_err(|e| {
            tracing::error!(
                location = %query.location,
                status = 200,
                source = "api",
                error = %e,
                "could not extract report"
            );
        })?;

        tracing::info!(
            location = %query.location,
            status = 200,
            source = "api",
            days = report.forecast.len(),
            "served weather"
        );
        Ok(report)
    }

    /// Look up and render in one step; errors become an error page.
    /// Returns the HTTP status alongside the page.
    pub async fn page_for(&self, query: &WeatherQuery) -> (u16, String) {
        match self.lookup(query).await {
            Ok(report) => (200, render::report_page(&report)),
            Err(e) => (e.http_status(), render::error_page(&e)),
        }
    }
}

/// Status the provider answered with; 0 when the failure came before any
/// response.
fn provider_status(error: &WeatherError) -> u16 {
    match error {
        WeatherError::Upstream(e) => e.status(),
        _ => 0,
    }
}
