use std::{convert::Infallible, sync::Arc};

use serde::Deserialize;
use warp::{Filter, Rejection, Reply, http::StatusCode};
use weather_core::{Config, Units, WeatherError, WeatherService, render, resolve_query};

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: WeatherService,
    pub default_units: Units,
}

impl AppState {
    /// Fails with a configuration error when no API key is set.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        Ok(Self {
            service: WeatherService::from_config(config)?,
            default_units: config.units,
        })
    }
}

/// Fields accepted from the query string or the search form.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub units: Option<String>,
}

const MAX_FORM_BYTES: u64 = 4 * 1024;

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    // Path before method, so unknown paths reject as not-found rather than
    // method-not-allowed.
    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(render::index_page()));

    let stylesheet = warp::path!("static" / "style.css")
        .and(warp::get())
        .map(|| {
            warp::reply::with_header(render::STYLESHEET, "content-type", "text/css; charset=utf-8")
        });

    let lookup_get = warp::path!("weather")
        .and(warp::get())
        .and(warp::query::<LookupParams>())
        .and(with_state(state.clone()))
        .and_then(handle_lookup);

    let lookup_post = warp::path!("weather")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::form::<LookupParams>())
        .and(with_state(state))
        .and_then(handle_lookup);

    index
        .or(stylesheet)
        .or(lookup_get)
        .or(lookup_post)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn handle_lookup(
    params: LookupParams,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    let query = resolve_query(
        params.city.as_deref(),
        params.lat.as_deref(),
        params.lon.as_deref(),
        params.units.as_deref(),
        state.default_units,
    );

    let (status, page) = match query {
        Ok(query) => state.service.page_for(&query).await,
        Err(e) => {
            tracing::info!(error = %e, "rejected lookup");
            (e.http_status(), render::error_page(&e))
        }
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok(warp::reply::with_status(warp::reply::html(page), status))
}

/// Turns warp's own rejections into the same HTML error page the lookup
/// handler renders.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.find::<warp::reject::InvalidQuery>().is_some()
        || err.find::<warp::body::BodyDeserializeError>().is_some()
    {
        (StatusCode::BAD_REQUEST, "The search could not be read. Please use the form.")
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Searches must be submitted as a form.")
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "The search request is too large.")
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "The search request is missing its length.")
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Page not found.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "That method is not supported here.")
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong. Please try again.")
    };

    tracing::info!(status = status.as_u16(), reason = message, "rejected request");
    let page = render::error_page(&WeatherError::InvalidQuery(message.to_string()));
    Ok(warp::reply::with_status(warp::reply::html(page), status))
}
