use async_trait::async_trait;
use reqwest::{Client, header::RETRY_AFTER};
use std::time::Duration;

use crate::{
    config::Config,
    error::{UpstreamError, WeatherError},
    model::{Location, ProviderPayload, WeatherQuery},
    resolver::ProviderRequest,
};

use super::WeatherProvider;

const USER_AGENT: &str = concat!("weather-web/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    lang: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            lang: "en".to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.api_key()?.to_owned();

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            http,
        })
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn current_request(&self, query: &WeatherQuery) -> ProviderRequest {
        self.build_request("weather", query)
    }

    pub fn forecast_request(&self, query: &WeatherQuery) -> ProviderRequest {
        self.build_request("forecast", query)
    }

    fn build_request(&self, resource: &str, query: &WeatherQuery) -> ProviderRequest {
        let mut params = match &query.location {
            Location::City(name) => vec![("q".to_string(), name.clone())],
            Location::Coordinates { lat, lon } => vec![
                ("lat".to_string(), lat.to_string()),
                ("lon".to_string(), lon.to_string()),
            ],
        };
        params.push(("appid".to_string(), self.api_key.clone()));
        params.push(("units".to_string(), query.units.as_str().to_string()));
        params.push(("lang".to_string(), self.lang.clone()));

        ProviderRequest {
            endpoint: format!("{}/{}", self.base_url, resource),
            params,
        }
    }

    async fn execute(&self, request: &ProviderRequest) -> Result<serde_json::Value, WeatherError> {
        tracing::debug!(endpoint = %request.endpoint, "calling OpenWeather");

        // `without_url` keeps the appid out of error messages and logs.
        let res = self
            .http
            .get(&request.endpoint)
            .query(&request.params)
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.without_url().to_string()))?;

        let status = res.status();
        let retry_after = res
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());

        let body = res
            .text()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(UpstreamError::from_status(status.as_u16(), retry_after, &body).into());
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::from(UpstreamError::Malformed(format!("{}: {e}", request.endpoint)))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, query: &WeatherQuery) -> Result<ProviderPayload, WeatherError> {
        let current = self.execute(&self.current_request(query)).await?;
        let forecast = self.execute(&self.forecast_request(query)).await?;

        Ok(ProviderPayload { current, forecast })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Units;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london() -> WeatherQuery {
        WeatherQuery {
            location: Location::City("London".into()),
            units: Units::Metric,
        }
    }

    #[test]
    fn city_request_carries_key_units_and_lang() {
        let provider = OpenWeatherProvider::new("KEY".into(), "http://provider/data/2.5/")
            .with_lang("fr");
        let req = provider.current_request(&london());

        assert_eq!(req.endpoint, "http://provider/data/2.5/weather");
        assert_eq!(req.param("q"), Some("London"));
        assert_eq!(req.param("appid"), Some("KEY"));
        assert_eq!(req.param("units"), Some("metric"));
        assert_eq!(req.param("lang"), Some("fr"));
        assert_eq!(req.param("lat"), None);
    }

    #[test]
    fn coordinate_request_uses_lat_lon() {
        let provider = OpenWeatherProvider::new("KEY".into(), "http://provider");
        let query = WeatherQuery {
            location: Location::Coordinates { lat: 51.5, lon: -0.12 },
            units: Units::Imperial,
        };
        let req = provider.forecast_request(&query);

        assert_eq!(req.endpoint, "http://provider/forecast");
        assert_eq!(req.param("lat"), Some("51.5"));
        assert_eq!(req.param("lon"), Some("-0.12"));
        assert_eq!(req.param("units"), Some("imperial"));
        assert_eq!(req.param("q"), None);
    }

    #[test]
    fn from_config_requires_api_key() {
        let err = OpenWeatherProvider::from_config(&Config::default()).unwrap_err();
        assert!(matches!(err, WeatherError::Configuration(_)));
    }

    #[tokio::test]
    async fn fetch_returns_both_payloads() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "London"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "London",
                "main": {"temp": 18.3}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into(), mock_server.uri());
        let payload = provider.fetch(&london()).await.unwrap();

        assert_eq!(payload.current["name"], "London");
        assert_eq!(payload.forecast["list"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn not_found_skips_forecast_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into(), mock_server.uri());
        let result = provider.fetch(&london()).await;

        assert!(matches!(result, Err(WeatherError::Upstream(UpstreamError::NotFound))));
    }

    #[tokio::test]
    async fn unauthorized_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::new("BAD".into(), mock_server.uri());
        let result = provider.fetch(&london()).await;

        assert!(matches!(result, Err(WeatherError::Upstream(UpstreamError::Unauthorized))));
    }

    #[tokio::test]
    async fn rate_limited_carries_retry_after() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "30"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into(), mock_server.uri());
        let result = provider.fetch(&london()).await;

        assert!(matches!(
            result,
            Err(WeatherError::Upstream(UpstreamError::RateLimited { retry_after: Some(30) }))
        ));
    }

    #[tokio::test]
    async fn server_error_on_forecast_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into(), mock_server.uri());
        let result = provider.fetch(&london()).await;

        assert!(matches!(
            result,
            Err(WeatherError::Upstream(UpstreamError::Server { status: 503 }))
        ));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into(), mock_server.uri());
        let result = provider.fetch(&london()).await;

        assert!(matches!(result, Err(WeatherError::Upstream(UpstreamError::Malformed(_)))));
    }

    #[tokio::test]
    async fn unreachable_provider_hides_api_key() {
        // Nothing listens on port 1.
        let provider = OpenWeatherProvider::new("SECRET".into(), "http://127.0.0.1:1");
        let err = provider.fetch(&london()).await.unwrap_err();

        assert!(matches!(err, WeatherError::Upstream(UpstreamError::Unreachable(_))));
        assert!(!err.to_string().contains("SECRET"));
    }
}
