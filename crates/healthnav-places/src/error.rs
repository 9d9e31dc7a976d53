use thiserror::Error;

/// Errors returned by the Google Places client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client. The request URL
    /// is stripped before wrapping since it carries the API key.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The directory answered with a non-2xx status.
    #[error("Places API returned HTTP {status}")]
    Upstream { status: u16, body: String },

    /// A details response parsed but carried no `result` object.
    #[error("no details result for place {place_id} (status {status:?})")]
    MissingResult {
        place_id: String,
        status: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
