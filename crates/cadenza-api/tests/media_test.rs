mod helpers;

use bytes::Bytes;
use cadenza_core::models::ArtistFields;
use helpers::setup_test_app;

#[tokio::test]
async fn test_download_image_sets_content_type() {
    let app = setup_test_app();
    app.storage
        .insert_object("cover.png", Bytes::from_static(b"\x89PNGbody"));

    let response = app.client().get("/image/cover.png").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.as_bytes().as_ref(), b"\x89PNGbody");
}

#[tokio::test]
async fn test_download_audio_streams_object() {
    let app = setup_test_app();
    app.storage
        .insert_object("song.mp3", Bytes::from_static(b"ID3frames"));

    let response = app.client().get("/audio/song.mp3").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "audio/mpeg");
    assert_eq!(response.as_bytes().as_ref(), b"ID3frames");
}

#[tokio::test]
async fn test_download_missing_object_is_not_found() {
    let app = setup_test_app();

    let response = app.client().get("/image/nothing.png").await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_artist_image_by_name() {
    let app = setup_test_app();
    app.artists.seed(
        &ArtistFields {
            name: "Ana".to_string(),
            visible: true,
        },
        Some("ana.jpg"),
    );
    app.storage
        .insert_object("ana.jpg", Bytes::from_static(b"\xff\xd8jpeg"));

    let response = app.client().get("/artists/by-name/Ana/image").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/jpeg");

    let response = app.client().get("/artists/by-name/Nobody/image").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();

    let response = app.client().get("/api-docs/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let doc: serde_json::Value = response.json();
    assert!(doc["paths"].get("/admin/broadcasts").is_some());
}
