use healthnav_core::{haversine_km, Coordinate};
use serde::Serialize;

use crate::types::Place;

/// A place with its great-circle distance from the search origin.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPlace {
    #[serde(flatten)]
    pub place: Place,
    /// Kilometers.
    pub distance: f64,
}

/// Attaches distances from `origin` and sorts nearest-first.
///
/// Places without a usable location get distance `0.0`. The sort is stable,
/// so equal distances keep their input order.
#[must_use]
pub fn rank_by_distance(origin: Coordinate, places: Vec<Place>) -> Vec<RankedPlace> {
    let mut ranked: Vec<RankedPlace> = places
        .into_iter()
        .map(|mut place| {
            // Our own field replaces any upstream one of the same name.
            place.extra.remove("distance");
            let distance = place
                .coordinate()
                .map_or(0.0, |c| haversine_km(origin, c));
            RankedPlace { place, distance }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}
