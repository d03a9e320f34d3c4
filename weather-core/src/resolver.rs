//! Turning raw request input into a [`WeatherQuery`].

use crate::{
    error::WeatherError,
    model::{Location, Units, WeatherQuery},
};

/// A fully resolved outbound provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl ProviderRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Pick the location from user input. Exactly one of a city name or a full
/// coordinate pair must be present.
pub fn parse_location(
    city: Option<&str>,
    lat: Option<&str>,
    lon: Option<&str>,
) -> Result<Location, WeatherError> {
    let city = city.map(str::trim).filter(|c| !c.is_empty());
    let lat = lat.map(str::trim).filter(|v| !v.is_empty());
    let lon = lon.map(str::trim).filter(|v| !v.is_empty());

    match (city, lat, lon) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(WeatherError::InvalidQuery(
            "Enter either a city name or coordinates, not both.".to_string(),
        )),
        (Some(city), None, None) => Ok(Location::City(city.to_string())),
        (None, Some(lat), Some(lon)) => {
            let lat = parse_coordinate(lat, "latitude", 90.0)?;
            let lon = parse_coordinate(lon, "longitude", 180.0)?;
            Ok(Location::Coordinates { lat, lon })
        }
        (None, Some(_), None) | (None, None, Some(_)) => Err(WeatherError::InvalidQuery(
            "Both latitude and longitude are required.".to_string(),
        )),
        (None, None, None) => Err(WeatherError::InvalidQuery(
            "Please enter a city name.".to_string(),
        )),
    }
}

fn parse_coordinate(raw: &str, name: &str, limit: f64) -> Result<f64, WeatherError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| WeatherError::InvalidQuery(format!("Invalid {name} '{raw}'.")))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(WeatherError::InvalidQuery(format!(
            "The {name} must be between -{limit} and {limit}."
        )));
    }

    Ok(value)
}

/// Build a query from raw form or query-string fields, falling back to
/// `default_units` when none were given.
pub fn resolve_query(
    city: Option<&str>,
    lat: Option<&str>,
    lon: Option<&str>,
    units: Option<&str>,
    default_units: Units,
) -> Result<WeatherQuery, WeatherError> {
    let location = parse_location(city, lat, lon)?;
    let units = match units.map(str::trim).filter(|u| !u.is_empty()) {
        Some(u) => Units::try_from(u)?,
        None => default_units,
    };

    Ok(WeatherQuery { location, units })
}
