mod places;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use healthnav_core::{AppConfig, ValidationError};
use healthnav_places::{PlacesClient, PlacesError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState};

#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured; searches then fail with a
    /// configuration error.
    pub places: Option<Arc<PlacesClient>>,
    pub details_concurrency: usize,
}

impl AppState {
    /// Builds the shared Places client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the HTTP client cannot be built or the base
    /// URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, PlacesError> {
        let places = match config.places_api_key.as_deref() {
            Some(key) => {
                let client = PlacesClient::with_base_url(
                    key,
                    config.places_timeout_secs,
                    &config.places_base_url,
                )?
                .with_retry(config.places_max_retries, config.places_retry_backoff_ms);
                Some(Arc::new(client))
            }
            None => None,
        };

        Ok(Self {
            places,
            details_concurrency: config.details_concurrency,
        })
    }
}

/// Error body shared by every endpoint: `{ "error", "reason"?, "details"? }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            reason: None,
            details: None,
        }
    }

    pub fn validation(err: &ValidationError) -> Self {
        Self {
            reason: Some(err.reason()),
            ..Self::new(StatusCode::BAD_REQUEST, err.to_string())
        }
    }

    /// The query string itself could not be decoded (duplicate keys, bad
    /// percent-encoding), before any parameter could be validated.
    pub fn bad_query(details: String) -> Self {
        Self {
            reason: Some("InvalidQuery"),
            details: Some(details),
            ..Self::new(StatusCode::BAD_REQUEST, "Malformed query string")
        }
    }

    pub fn configuration() -> Self {
        Self {
            reason: Some("ConfigurationError"),
            ..Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Google Places API key not configured",
            )
        }
    }

    /// Relays a directory error with the directory's own status code.
    pub fn upstream(status: u16, body: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        Self {
            details: Some(body),
            ..Self::new(status, "Google Places API error")
        }
    }

    pub fn internal(details: String) -> Self {
        Self {
            reason: Some("InternalError"),
            details: Some(details),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(&self)).into_response();
        if self.status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
        }
        response
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    places_api: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthData> {
    Json(HealthData {
        status: "ok",
        places_api: if state.places.is_some() {
            "configured"
        } else {
            "missing_credential"
        },
    })
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

fn build_cors() -> CorsLayer {
    let request_id = HeaderName::from_static("x-request-id");
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
}

fn places_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/places/nearby",
            get(places::nearby_places).fallback(method_not_allowed),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route(
        "/api/health",
        get(health).fallback(method_not_allowed),
    );

    Router::new()
        .merge(public_routes)
        .merge(places_router(rate_limit))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
