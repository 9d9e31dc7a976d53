//! HTTP client for the Google Places web service.
//!
//! Wraps `reqwest` with API key management, retry policy and typed response
//! deserialization for the two lookups the service needs: nearby search and
//! place details.

use std::time::Duration;

use healthnav_core::SearchRequest;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{DetailsResponse, NearbySearchResponse, Place};

/// Client for the Google Places web service.
///
/// The base URL is injected so tests can point the client at a mock server.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Creates a client rooted at `base_url`
    /// (`https://maps.googleapis.com/maps/api/place/` in production).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("healthnav/0.1 (facility-search)")
            .build()?;

        // Exactly one trailing slash, otherwise `Url::join` replaces the last
        // path segment instead of appending to it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Enables retries on transient failures. `max_retries = 0` disables them.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs a nearby search around the request origin.
    ///
    /// The envelope is returned as-is, including application-level statuses
    /// such as `ZERO_RESULTS`; only the HTTP status is treated as failure.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Upstream`] on a non-2xx response, with its body.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn nearby_search(
        &self,
        request: &SearchRequest,
    ) -> Result<NearbySearchResponse<Place>, PlacesError> {
        let location = format!(
            "{},{}",
            request.origin.latitude(),
            request.origin.longitude()
        );
        let radius = request.radius_meters.to_string();
        let url = self.build_url(
            "nearbysearch/json",
            &[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", request.category.as_str()),
            ],
        )?;

        let response: NearbySearchResponse<Place> = self
            .get_json(&url, || format!("nearbysearch(location={location})"))
            .await?;

        if let Some(status) = response.status().filter(|s| !matches!(*s, "OK" | "ZERO_RESULTS"))
        {
            tracing::warn!(status, "nearby search returned non-OK application status");
        }
        Ok(response)
    }

    /// Fetches the details record for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::MissingResult`] if the response has no `result`.
    /// - [`PlacesError::Upstream`], [`PlacesError::Http`],
    ///   [`PlacesError::Deserialize`] as for [`Self::nearby_search`].
    pub async fn place_details(&self, place_id: &str, fields: &str) -> Result<Place, PlacesError> {
        let url = self.build_url(
            "details/json",
            &[("place_id", place_id), ("fields", fields)],
        )?;

        let envelope: DetailsResponse = self
            .get_json(&url, || format!("details(place_id={place_id})"))
            .await?;

        envelope.result.ok_or_else(|| PlacesError::MissingResult {
            place_id: place_id.to_owned(),
            status: envelope.status,
        })
    }

    /// Builds `{base}{endpoint}?{extra...}&key=...` with percent-encoded values.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// GETs `url` under the retry policy and parses the body.
    ///
    /// `context` names the call in errors; the URL itself is never used there
    /// because it carries the API key.
    async fn get_json<T, C>(&self, url: &Url, context: C) -> Result<T, PlacesError>
    where
        T: DeserializeOwned,
        C: FnOnce() -> String,
    {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, move || {
            self.fetch_body(url)
        })
        .await?;

        serde_json::from_str(&body).map_err(|source| PlacesError::Deserialize {
            context: context(),
            source,
        })
    }

    async fn fetch_body(&self, url: &Url) -> Result<String, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(PlacesError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
