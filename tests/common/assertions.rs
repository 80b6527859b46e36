//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use retro_palette::{Image, Palette};

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is a valid PNG image
pub fn assert_png(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_png(),
        "Expected PNG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..8.min(response.body.len())]
    );

    // Check Content-Type header
    let content_type = response
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert_eq!(
        content_type,
        Some("image/png"),
        "Expected Content-Type: image/png"
    );
}

/// Assert JSON response has expected status field
pub fn assert_json_status(response: &TestResponse, expected_status: u16) {
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(expected_status as u64),
        "Expected JSON status {}, got {:?}. Full response: {}",
        expected_status,
        json["status"],
        serde_json::to_string_pretty(&json).unwrap()
    );
}

/// Assert an error response carries status and a message containing `needle`
pub fn assert_json_error(response: &TestResponse, expected: StatusCode, needle: &str) {
    assert_status(response, expected);
    assert_json_status(response, expected.as_u16());
    let json: serde_json::Value = response.json();
    let error = json["error"].as_str().unwrap_or_default();
    assert!(
        error.contains(needle),
        "Expected error containing {needle:?}, got {error:?}"
    );
}

/// Assert every pixel of `image` is a color of `palette`
pub fn assert_in_palette(image: &Image, palette: &Palette) {
    for (i, px) in image.pixels().enumerate() {
        assert!(
            palette.contains(px),
            "Pixel {i} is {} which is not in palette {}",
            px.to_hex(),
            palette.name()
        );
    }
}
