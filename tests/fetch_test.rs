//! Listing fetch client against a local mock backend.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use garage_invoice::error::AppError;
use garage_invoice::fetch::{ListingClient, ListingSource};
use garage_invoice::listing::ListingRecord;

const LISTING_ID: &str = "6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f";

/// ureq blocks, so the call runs off the runtime's worker threads.
async fn fetch(server: &MockServer) -> Result<Option<ListingRecord>, AppError> {
    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        ListingClient::with_base_url(ureq::agent(), &base).fetch_listing(LISTING_ID)
    })
    .await
    .expect("fetch task panicked")
}

fn listing_json() -> serde_json::Value {
    json!({
        "id": LISTING_ID,
        "listingTitle": "1998 E-One Hurricane Rescue Pumper",
        "listingDescription": "Kept indoors.",
        "itemBrand": "E-One",
        "sellingPrice": 38500,
        "itemWeight": 36000,
        "isShippable": true,
        "addressPrimary": "455 County Line Rd",
        "addressCity": "Lancaster",
        "addressState": "PA",
        "addressZip": "17601",
        "imageUrls": ["https://cdn.example.com/a.jpg"]
    })
}

#[tokio::test]
async fn posts_id_and_returns_listing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getListing"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "id": LISTING_ID })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "listing": listing_json() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = fetch(&server).await.unwrap().expect("listing present");
    assert_eq!(listing.id, LISTING_ID);
    assert_eq!(listing.listing_title, "1998 E-One Hurricane Rescue Pumper");
    assert_eq!(listing.selling_price, 38500.0);
    assert!(listing.is_shippable);
    assert_eq!(listing.image_urls, vec!["https://cdn.example.com/a.jpg".to_string()]);
}

#[tokio::test]
async fn null_listing_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getListing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "listing": null } })))
        .mount(&server)
        .await;

    assert!(fetch(&server).await.unwrap().is_none());
}

#[tokio::test]
async fn server_error_is_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getListing"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetch(&server).await.unwrap_err();
    assert!(matches!(err, AppError::Network(ref msg) if msg.contains("500")), "got {err:?}");
}

#[tokio::test]
async fn body_without_result_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getListing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "nope" })))
        .mount(&server)
        .await;

    assert!(matches!(fetch(&server).await, Err(AppError::Network(_))));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getListing"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    assert!(matches!(fetch(&server).await, Err(AppError::Network(_))));
}
