//! Integration tests for device location endpoints.
//!
//! Run with: cargo test --test locations_integration

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, get_request, json_request, parse_response_body, test_config, unique_device_id,
    unique_user_id,
};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_current_location_null_before_first_report() {
    let app = create_test_app(test_config());
    let device_id = unique_device_id();

    let response = app
        .oneshot(get_request(&format!("/api/v1/devices/{device_id}/location")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert!(body["location"].is_null());
}

#[tokio::test]
async fn test_update_location_success() {
    let app = create_test_app(test_config());
    let device_id = unique_device_id();

    let request = json_request(
        Method::POST,
        &format!("/api/v1/devices/{device_id}/location"),
        json!({ "latitude": 48.1486, "longitude": 17.1077 }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "location updated");
    assert_eq!(body["location"]["latitude"], 48.1486);
    assert_eq!(body["location"]["longitude"], 17.1077);
    assert_eq!(body["location"]["deviceId"], device_id);

    let response = app
        .oneshot(get_request(&format!("/api/v1/devices/{device_id}/location")))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["location"]["latitude"], 48.1486);
}

#[tokio::test]
async fn test_update_location_last_write_wins() {
    let app = create_test_app(test_config());
    let device_id = unique_device_id();

    for (lat, lon) in [(48.1486, 17.1077), (48.2, 17.2)] {
        let request = json_request(
            Method::POST,
            &format!("/api/v1/devices/{device_id}/location"),
            json!({ "latitude": lat, "longitude": lon }),
        );
        app.clone().oneshot(request).await.unwrap();
    }

    let response = app
        .oneshot(get_request(&format!("/api/v1/devices/{device_id}/location")))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["location"]["latitude"], 48.2);
    assert_eq!(body["location"]["longitude"], 17.2);
}

#[tokio::test]
async fn test_update_location_rejects_missing_coordinates() {
    let app = create_test_app(test_config());
    let device_id = unique_device_id();

    for payload in [
        json!({}),
        json!({ "latitude": 48.1486 }),
        json!({ "longitude": 17.1077 }),
    ] {
        let request = json_request(
            Method::POST,
            &format!("/api/v1/devices/{device_id}/location"),
            payload,
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_update_location_rejects_out_of_range_coordinates() {
    let app = create_test_app(test_config());
    let device_id = unique_device_id();

    for payload in [
        json!({ "latitude": 91.0, "longitude": 17.1077 }),
        json!({ "latitude": 48.1486, "longitude": -181.0 }),
    ] {
        let request = json_request(
            Method::POST,
            &format!("/api/v1/devices/{device_id}/location"),
            payload,
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_update_location_with_user_triggers_fence_evaluation() {
    let app = create_test_app(test_config());
    let device_id = unique_device_id();
    let user_id = unique_user_id();

    let request = json_request(
        Method::POST,
        "/api/v1/geofences",
        json!({
            "userId": user_id,
            "deviceId": device_id,
            "name": "Home",
            "latitude": 48.1486,
            "longitude": 17.1077,
            "radius": 100.0
        }),
    );
    app.clone().oneshot(request).await.unwrap();

    // Outside, then inside. The transition check runs in the background
    // and must not affect the update responses.
    for (lat, lon) in [(48.2486, 17.1077), (48.1486, 17.1077)] {
        let request = json_request(
            Method::POST,
            &format!("/api/v1/devices/{device_id}/location"),
            json!({ "userId": user_id, "latitude": lat, "longitude": lon }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // The probe endpoint agrees the device is now inside
    let request = json_request(
        Method::POST,
        "/api/v1/geofences/evaluate",
        json!({
            "userId": user_id,
            "deviceId": device_id,
            "latitude": 48.1486,
            "longitude": 17.1077
        }),
    );
    let response = app.oneshot(request).await.unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["results"][0]["isInside"], true);
}
