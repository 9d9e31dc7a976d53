//! Detail enrichment for nearby-search candidates.

use futures::stream::{self, StreamExt};

use crate::client::PlacesClient;
use crate::types::Place;

/// Fields requested from the details endpoint.
pub const DETAIL_FIELDS: &str = "place_id,name,formatted_address,formatted_phone_number,\
international_phone_number,geometry,rating,user_ratings_total,opening_hours,website,url,\
business_status,types,vicinity";

/// Fetches the details record for every candidate and merges it in.
///
/// Up to `concurrency` lookups run at once. `buffered` yields in input order,
/// so each output element is the enrichment of the input at the same index.
///
/// A failed lookup never fails the batch: the candidate comes back exactly as
/// the nearby search returned it.
pub async fn enrich_places(
    client: &PlacesClient,
    places: Vec<Place>,
    concurrency: usize,
) -> Vec<Place> {
    stream::iter(places)
        .map(|place| enrich_place(client, place))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

async fn enrich_place(client: &PlacesClient, place: Place) -> Place {
    let Some(place_id) = place.place_id.clone() else {
        tracing::debug!(name = ?place.name, "candidate has no place_id; skipping details");
        return place;
    };

    match client.place_details(&place_id, DETAIL_FIELDS).await {
        Ok(details) => place.merge_details(details),
        Err(e) => {
            tracing::warn!(
                place_id = %place_id,
                error = %e,
                "place details lookup failed; keeping nearby-search data"
            );
            place
        }
    }
}
