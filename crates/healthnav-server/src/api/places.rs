use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use healthnav_core::{validate_search, RawSearchParams};
use healthnav_places::{
    enrich_places, rank_by_distance, NearbySearchResponse, PlacesError, RankedPlace,
};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

/// Progress of one search request, recorded on log lines and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Stage {
    Validating,
    Searching,
    Enriching,
    Assembling,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Validating => write!(f, "validating"),
            Stage::Searching => write!(f, "searching"),
            Stage::Enriching => write!(f, "enriching"),
            Stage::Assembling => write!(f, "assembling"),
        }
    }
}

/// `GET /api/places/nearby?lat=&lng=&radius=&type=`
///
/// Returns the directory's nearby-search envelope with `results` replaced by
/// detail-enriched places sorted nearest-first, each carrying `distance` in km.
pub(super) async fn nearby_places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<RawSearchParams>, QueryRejection>,
) -> Result<Json<NearbySearchResponse<RankedPlace>>, ApiError> {
    let request_id = req_id.0;

    // Credential first: a server without a key fails the same way for every
    // request, whatever the parameters.
    let Some(client) = state.places.as_deref() else {
        tracing::error!(request_id = %request_id, "GOOGLE_PLACES_API_KEY is not configured");
        return Err(ApiError::configuration());
    };

    tracing::debug!(
        request_id = %request_id,
        stage = %Stage::Validating,
        "nearby search started"
    );
    let Query(params) = query.map_err(|rejection| {
        tracing::debug!(
            request_id = %request_id,
            error = %rejection,
            "malformed query string"
        );
        ApiError::bad_query(rejection.body_text())
    })?;
    let request = validate_search(&params).map_err(|e| {
        tracing::debug!(
            request_id = %request_id,
            reason = e.reason(),
            "search parameters rejected"
        );
        ApiError::validation(&e)
    })?;

    tracing::debug!(
        request_id = %request_id,
        stage = %Stage::Searching,
        radius = request.radius_meters,
        category = %request.category,
        "querying nearby search"
    );
    let mut nearby = client
        .nearby_search(&request)
        .await
        .map_err(|e| search_failure(&request_id, Stage::Searching, e))?;

    let candidates = std::mem::take(&mut nearby.results);
    tracing::debug!(
        request_id = %request_id,
        stage = %Stage::Enriching,
        candidates = candidates.len(),
        "fetching place details"
    );
    let enriched = enrich_places(client, candidates, state.details_concurrency).await;

    tracing::debug!(
        request_id = %request_id,
        stage = %Stage::Assembling,
        "ranking by distance"
    );
    let ranked = rank_by_distance(request.origin, enriched);

    tracing::info!(
        request_id = %request_id,
        results = ranked.len(),
        category = %request.category,
        "nearby search completed"
    );
    Ok(Json(nearby.with_results(ranked)))
}

fn search_failure(request_id: &str, stage: Stage, error: PlacesError) -> ApiError {
    match error {
        PlacesError::Upstream { status, body } => {
            tracing::warn!(
                request_id = %request_id,
                %stage,
                status,
                "Places API returned an error status"
            );
            ApiError::upstream(status, body)
        }
        other => {
            tracing::error!(
                request_id = %request_id,
                %stage,
                error = %other,
                "nearby search failed"
            );
            ApiError::internal(other.to_string())
        }
    }
}
