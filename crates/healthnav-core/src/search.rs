//! Query-parameter validation for the nearby facility search.

use serde::Deserialize;
use thiserror::Error;

use crate::geo::Coordinate;

pub const DEFAULT_RADIUS_METERS: i64 = 10_000;
pub const MAX_RADIUS_METERS: i64 = 50_000;
pub const DEFAULT_CATEGORY: &str = "hospital";

/// Raw query string as received by the HTTP layer. Every field is optional so
/// that absence can be reported as a validation error instead of a
/// deserialization failure.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawSearchParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub origin: Coordinate,
    pub radius_meters: i64,
    pub category: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameters: lat and lng")]
    MissingParameter,

    #[error("Invalid latitude or longitude")]
    InvalidNumber,

    #[error("Invalid radius. Must be an integer between 1 and 50000")]
    InvalidRadius,
}

impl ValidationError {
    /// Machine-readable reason code sent to clients alongside the message.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingParameter => "MissingParameter",
            ValidationError::InvalidNumber => "InvalidNumber",
            ValidationError::InvalidRadius => "InvalidRadius",
        }
    }
}

/// Validates raw query parameters into a [`SearchRequest`].
///
/// # Errors
///
/// - [`ValidationError::MissingParameter`] if `lat` or `lng` is absent or blank.
/// - [`ValidationError::InvalidNumber`] if either is not a finite number inside
///   the WGS84 range.
/// - [`ValidationError::InvalidRadius`] if `radius` is present but not an
///   integer in `1..=50000`.
pub fn validate_search(params: &RawSearchParams) -> Result<SearchRequest, ValidationError> {
    let (Some(lat), Some(lng)) = (
        non_blank(params.lat.as_deref()),
        non_blank(params.lng.as_deref()),
    ) else {
        return Err(ValidationError::MissingParameter);
    };

    let latitude = parse_finite(lat)?;
    let longitude = parse_finite(lng)?;
    let origin =
        Coordinate::new(latitude, longitude).map_err(|_| ValidationError::InvalidNumber)?;

    let radius_meters = match params.radius.as_deref() {
        None => DEFAULT_RADIUS_METERS,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|r| (1..=MAX_RADIUS_METERS).contains(r))
            .ok_or(ValidationError::InvalidRadius)?,
    };

    let category = non_blank(params.category.as_deref())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    Ok(SearchRequest {
        origin,
        radius_meters,
        category,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_finite(raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::InvalidNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(lat: Option<&str>, lng: Option<&str>, radius: Option<&str>) -> RawSearchParams {
        RawSearchParams {
            lat: lat.map(str::to_string),
            lng: lng.map(str::to_string),
            radius: radius.map(str::to_string),
            category: None,
        }
    }

    #[test]
    fn accepts_minimal_request_with_defaults() {
        let req = validate_search(&params(Some("20.27"), Some("85.84"), None)).unwrap();
        assert!((req.origin.latitude() - 20.27).abs() < f64::EPSILON);
        assert!((req.origin.longitude() - 85.84).abs() < f64::EPSILON);
        assert_eq!(req.radius_meters, DEFAULT_RADIUS_METERS);
        assert_eq!(req.category, "hospital");
    }

    #[test]
    fn missing_lat_is_missing_parameter() {
        let err = validate_search(&params(None, Some("85.84"), None)).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter);
        assert_eq!(err.reason(), "MissingParameter");
    }

    #[test]
    fn missing_lng_is_missing_parameter() {
        let err = validate_search(&params(Some("20.27"), None, None)).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter);
    }

    #[test]
    fn blank_lat_is_missing_parameter() {
        let err = validate_search(&params(Some("  "), Some("85.84"), None)).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter);
    }

    #[test]
    fn non_numeric_lat_is_invalid_number() {
        let err = validate_search(&params(Some("north"), Some("85.84"), None)).unwrap_err();
        assert_eq!(err, ValidationError::InvalidNumber);
        assert_eq!(err.reason(), "InvalidNumber");
    }

    #[test]
    fn non_finite_lng_is_invalid_number() {
        for raw in ["NaN", "inf", "-infinity"] {
            let err = validate_search(&params(Some("0"), Some(raw), None)).unwrap_err();
            assert_eq!(err, ValidationError::InvalidNumber, "input {raw}");
        }
    }

    #[test]
    fn out_of_range_lat_is_invalid_number() {
        let err = validate_search(&params(Some("91"), Some("0"), None)).unwrap_err();
        assert_eq!(err, ValidationError::InvalidNumber);
    }

    #[test]
    fn radius_at_upper_bound_is_accepted() {
        let req = validate_search(&params(Some("0"), Some("0"), Some("50000"))).unwrap();
        assert_eq!(req.radius_meters, 50_000);
    }

    #[test]
    fn radius_above_upper_bound_is_rejected() {
        let err = validate_search(&params(Some("0"), Some("0"), Some("50001"))).unwrap_err();
        assert_eq!(err, ValidationError::InvalidRadius);
        assert_eq!(err.reason(), "InvalidRadius");
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        for raw in ["0", "-10"] {
            let err = validate_search(&params(Some("0"), Some("0"), Some(raw))).unwrap_err();
            assert_eq!(err, ValidationError::InvalidRadius, "input {raw}");
        }
    }

    #[test]
    fn non_integer_radius_is_rejected() {
        for raw in ["abc", "1500.5", ""] {
            let err = validate_search(&params(Some("0"), Some("0"), Some(raw))).unwrap_err();
            assert_eq!(err, ValidationError::InvalidRadius, "input {raw:?}");
        }
    }

    #[test]
    fn missing_coordinates_win_over_bad_radius() {
        let err = validate_search(&params(None, None, Some("99999"))).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter);
    }

    #[test]
    fn category_is_trimmed_and_passed_through() {
        let mut p = params(Some("0"), Some("0"), None);
        p.category = Some(" pharmacy ".to_string());
        assert_eq!(validate_search(&p).unwrap().category, "pharmacy");
    }

    #[test]
    fn blank_category_falls_back_to_hospital() {
        let mut p = params(Some("0"), Some("0"), None);
        p.category = Some(String::new());
        assert_eq!(validate_search(&p).unwrap().category, DEFAULT_CATEGORY);
    }

    #[test]
    fn raw_params_deserialize_type_field() {
        let p: RawSearchParams =
            serde_json::from_value(serde_json::json!({"lat": "1", "lng": "2", "type": "doctor"}))
                .unwrap();
        assert_eq!(p.category.as_deref(), Some("doctor"));
        assert!(p.radius.is_none());
    }
}
