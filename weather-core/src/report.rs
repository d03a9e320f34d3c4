//! Extraction of a [`WeatherReport`] from raw OpenWeather payloads.
//!
//! The forecast endpoint returns three-hour slots; they are folded into one
//! [`DayForecast`] per local calendar day, keeping provider order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    error::WeatherError,
    model::{DayForecast, ProviderPayload, Units, WeatherReport},
};

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    timezone: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    #[serde(default)]
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl WeatherReport {
    /// Build a report from the provider payload. Any missing or mistyped
    /// field fails the whole report.
    pub fn from_payload(payload: &ProviderPayload, units: Units) -> Result<Self, WeatherError> {
        let current: OwCurrentResponse = decode(&payload.current, "current weather")?;
        let forecast: OwForecastResponse = decode(&payload.forecast, "forecast")?;

        let condition = first_condition(&current.weather, "current weather")?;

        let location_name = match current.sys.and_then(|s| s.country).filter(|c| !c.is_empty()) {
            Some(country) if !current.name.is_empty() => format!("{}, {}", current.name, country),
            _ => current.name,
        };

        Ok(WeatherReport {
            location_name,
            temperature: current.main.temp,
            feels_like: current.main.feels_like,
            humidity_pct: current.main.humidity,
            wind_speed: current.wind.speed,
            condition,
            observed_at: local_time(current.dt, current.timezone)?,
            units,
            forecast: summarize_days(&forecast.list, forecast.city.timezone)?,
        })
    }
}

fn decode<T: DeserializeOwned>(value: &serde_json::Value, what: &str) -> Result<T, WeatherError> {
    T::deserialize(value)
        .map_err(|e| WeatherError::Render(format!("unexpected {what} payload: {e}")))
}

fn first_condition(weather: &[OwWeather], what: &str) -> Result<String, WeatherError> {
    weather
        .first()
        .map(|w| w.description.clone())
        .ok_or_else(|| WeatherError::Render(format!("{what} payload has no condition")))
}

fn local_time(ts: i64, offset_secs: i64) -> Result<NaiveDateTime, WeatherError> {
    ts.checked_add(offset_secs)
        .and_then(|local| DateTime::from_timestamp(local, 0))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| WeatherError::Render(format!("timestamp {ts} is out of range")))
}

fn summarize_days(
    list: &[OwForecastEntry],
    offset_secs: i64,
) -> Result<Vec<DayForecast>, WeatherError> {
    let mut days: Vec<(NaiveDate, Vec<(NaiveDateTime, &OwForecastEntry)>)> = Vec::new();

    for entry in list {
        let local = local_time(entry.dt, offset_secs)?;
        let date = local.date();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, slots)) => slots.push((local, entry)),
            None => days.push((date, vec![(local, entry)])),
        }
    }

    days.into_iter()
        .map(|(date, slots)| summarize_day(date, &slots))
        .collect()
}

fn summarize_day(
    date: NaiveDate,
    slots: &[(NaiveDateTime, &OwForecastEntry)],
) -> Result<DayForecast, WeatherError> {
    let temp_min = slots
        .iter()
        .map(|(_, e)| e.main.temp_min)
        .fold(f64::INFINITY, f64::min);
    let temp_max = slots
        .iter()
        .map(|(_, e)| e.main.temp_max)
        .fold(f64::NEG_INFINITY, f64::max);

    // The slot nearest local noon stands for the whole day.
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| WeatherError::Render(format!("invalid forecast date {date}")))?;
    let (_, representative) = slots
        .iter()
        .min_by_key(|(t, _)| (*t - noon).num_seconds().abs())
        .ok_or_else(|| WeatherError::Render(format!("no forecast slots for {date}")))?;

    Ok(DayForecast {
        date,
        temp_min,
        temp_max,
        humidity_pct: representative.main.humidity,
        condition: first_condition(&representative.weather, "forecast")?,
    })
}
