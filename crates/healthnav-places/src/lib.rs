pub mod client;
pub mod enrich;
pub mod error;
pub mod rank;
pub(crate) mod retry;
pub mod types;

pub use client::PlacesClient;
pub use enrich::{enrich_places, DETAIL_FIELDS};
pub use error::PlacesError;
pub use rank::{rank_by_distance, RankedPlace};
pub use types::{DetailsResponse, Geometry, LatLng, NearbySearchResponse, Place};
