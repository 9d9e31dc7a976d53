//! Integration tests for `PlacesClient` using wiremock HTTP mocks.

use healthnav_core::{validate_search, RawSearchParams, SearchRequest};
use healthnav_places::{PlacesClient, PlacesError, DETAIL_FIELDS};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 5, base_url)
        .expect("client construction should not fail")
}

fn search_request() -> SearchRequest {
    validate_search(&RawSearchParams {
        lat: Some("20.27".to_string()),
        lng: Some("85.84".to_string()),
        radius: Some("5000".to_string()),
        category: Some("hospital".to_string()),
    })
    .expect("valid request")
}

#[tokio::test]
async fn nearby_search_sends_location_radius_type_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("location", "20.27,85.84"))
        .and(query_param("radius", "5000"))
        .and(query_param("type", "hospital"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "html_attributions": [],
            "status": "OK",
            "results": [
                { "place_id": "p1", "name": "Capital Hospital",
                  "geometry": { "location": { "lat": 20.26, "lng": 85.83 } } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .nearby_search(&search_request())
        .await
        .expect("nearby search should succeed");

    assert_eq!(response.status(), Some("OK"));
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].name.as_deref(), Some("Capital Hospital"));
}

#[tokio::test]
async fn nearby_search_passes_zero_results_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let response = test_client(&server.uri())
        .nearby_search(&search_request())
        .await
        .expect("zero results is not an error");
    assert!(response.results.is_empty());
    assert_eq!(response.status(), Some("ZERO_RESULTS"));
}

#[tokio::test]
async fn nearby_search_surfaces_upstream_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .nearby_search(&search_request())
        .await
        .expect_err("403 should fail");

    match err {
        PlacesError::Upstream { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "quota exhausted");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn nearby_search_reports_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .nearby_search(&search_request())
        .await
        .expect_err("html should not parse");
    assert!(matches!(err, PlacesError::Deserialize { .. }));
    assert!(
        !err.to_string().contains("test-key"),
        "error text must not leak the API key: {err}"
    );
}

#[tokio::test]
async fn nearby_search_retries_server_errors_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "results": [{ "place_id": "p1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry(2, 0);
    let response = client
        .nearby_search(&search_request())
        .await
        .expect("second attempt should succeed");
    assert_eq!(response.results.len(), 1);
}

#[tokio::test]
async fn place_details_requests_fields_and_returns_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "p1"))
        .and(query_param("fields", DETAIL_FIELDS))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": {
                "place_id": "p1",
                "formatted_address": "Unit 6, Bhubaneswar",
                "formatted_phone_number": "0674 2391983",
                "rating": 3.9
            }
        })))
        .mount(&server)
        .await;

    let details = test_client(&server.uri())
        .place_details("p1", DETAIL_FIELDS)
        .await
        .expect("details should parse");
    assert_eq!(
        details.formatted_address.as_deref(),
        Some("Unit 6, Bhubaneswar")
    );
    assert_eq!(details.rating, Some(3.9));
}

#[tokio::test]
async fn place_details_without_result_is_missing_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "INVALID_REQUEST" })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .place_details("bogus", DETAIL_FIELDS)
        .await
        .expect_err("missing result should fail");
    match err {
        PlacesError::MissingResult { place_id, status } => {
            assert_eq!(place_id, "bogus");
            assert_eq!(status.as_deref(), Some("INVALID_REQUEST"));
        }
        other => panic!("expected MissingResult, got {other:?}"),
    }
}
