//! Google Places (legacy web service) response types.
//!
//! Only the fields the service reasons about are typed. Everything else the
//! directory returns is kept in flattened maps and written back out unchanged,
//! so clients see the upstream record shape plus whatever we add.

use healthnav_core::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    /// `viewport` and anything else the directory sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single directory record, from either nearby search or details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Place {
    /// The record's location, if it has one that is a valid coordinate.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        let loc = self.geometry.as_ref()?.location?;
        Coordinate::new(loc.lat, loc.lng).ok()
    }

    /// Overlays a details record onto this nearby-search record.
    ///
    /// Fields present in `details` win, including geometry; fields it lacks
    /// keep their nearby-search values.
    #[must_use]
    pub fn merge_details(mut self, details: Place) -> Place {
        self.extra.extend(details.extra);
        Place {
            place_id: details.place_id.or(self.place_id),
            name: details.name.or(self.name),
            geometry: merge_geometry(self.geometry, details.geometry),
            formatted_address: details.formatted_address.or(self.formatted_address),
            formatted_phone_number: details
                .formatted_phone_number
                .or(self.formatted_phone_number),
            rating: details.rating.or(self.rating),
            opening_hours: details.opening_hours.or(self.opening_hours),
            website: details.website.or(self.website),
            extra: self.extra,
        }
    }
}

/// Detail geometry wins key by key, but a detail geometry without a
/// `location` never erases the coarse one.
fn merge_geometry(coarse: Option<Geometry>, detailed: Option<Geometry>) -> Option<Geometry> {
    match (coarse, detailed) {
        (Some(mut coarse), Some(detailed)) => {
            coarse.extra.extend(detailed.extra);
            Some(Geometry {
                location: detailed.location.or(coarse.location),
                extra: coarse.extra,
            })
        }
        (coarse, detailed) => detailed.or(coarse),
    }
}

/// Envelope of a `nearbysearch` response.
///
/// Generic over the result type so the same envelope (`status`,
/// `html_attributions`, `next_page_token`, ...) can be sent back to clients
/// with ranked results in place of the raw ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbySearchResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl<T> NearbySearchResponse<T> {
    /// The directory's application-level status (`OK`, `ZERO_RESULTS`, ...).
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.rest.get("status").and_then(Value::as_str)
    }

    /// Swaps the result list while keeping the rest of the envelope.
    #[must_use]
    pub fn with_results<U>(self, results: Vec<U>) -> NearbySearchResponse<U> {
        NearbySearchResponse {
            results,
            rest: self.rest,
        }
    }
}

/// Envelope of a `details` response.
#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    #[serde(default)]
    pub result: Option<Place>,
    #[serde(default)]
    pub status: Option<String>,
}
