//! HTTP contract tests for the `/key-images` endpoints.

mod common;

use assert_matches::assert_matches;
use common::{key_image_json, start, KEY_IMAGE_ID};
use radmark_client::ApiError;
use radmark_core::{CreateKeyImage, DisplayState, KeyImageKey, RecordId, ToggleAction};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn new_key_image() -> CreateKeyImage {
    let key = KeyImageKey {
        study_instance_uid: "ST1".to_string(),
        series_instance_uid: "SE1".to_string(),
        sop_instance_uid: "SOP1".to_string(),
        frame_index: 0,
    };
    let display = DisplayState {
        category: Some("finding".to_string()),
        window_width: Some(400.0),
        window_center: Some(40.0),
        ..Default::default()
    };
    CreateKeyImage::new(key, display)
}

// ---------------------------------------------------------------------------
// Test: server-side toggle reports both directions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_toggle_added() {
    let (server, api) = start().await;

    Mock::given(method("POST"))
        .and(path("/api/key-images/toggle"))
        .and(body_partial_json(json!({"sopInstanceUid": "SOP1", "windowWidth": 400.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "action": "added",
            "isKeyImage": true,
            "keyImage": key_image_json()
        })))
        .mount(&server)
        .await;

    let outcome = api.toggle_key_image(&new_key_image()).await.unwrap();
    assert_eq!(outcome.action, ToggleAction::Added);
    assert!(outcome.is_key_image);
    assert_eq!(outcome.key_image.unwrap().instance_number, Some(7));
}

#[tokio::test]
async fn test_toggle_removed() {
    let (server, api) = start().await;

    Mock::given(method("POST"))
        .and(path("/api/key-images/toggle"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"action": "removed", "isKeyImage": false})),
        )
        .mount(&server)
        .await;

    let outcome = api.toggle_key_image(&new_key_image()).await.unwrap();
    assert_eq!(outcome.action, ToggleAction::Removed);
    assert!(outcome.key_image.is_none());
}

// ---------------------------------------------------------------------------
// Test: duplicate create surfaces the backend's 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_duplicate_rejected() {
    let (server, api) = start().await;

    Mock::given(method("POST"))
        .and(path("/api/key-images"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "ALREADY_EXISTS",
            "message": "Key image already exists for this instance and frame"
        })))
        .mount(&server)
        .await;

    let err = api.create_key_image(&new_key_image()).await.unwrap_err();
    assert_matches!(err, ApiError::ApiError { status: 400, .. });
}

// ---------------------------------------------------------------------------
// Test: check, list with category, delete by instance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_check_key_image() {
    let (server, api) = start().await;

    Mock::given(method("GET"))
        .and(path("/api/key-images/check"))
        .and(query_param("sopInstanceUid", "SOP1"))
        .and(query_param("frameIndex", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sopInstanceUid": "SOP1",
            "frameIndex": 3,
            "isKeyImage": true
        })))
        .mount(&server)
        .await;

    assert!(api.is_key_image("SOP1", 3).await.unwrap());
}

#[tokio::test]
async fn test_list_key_images_by_study_with_category() {
    let (server, api) = start().await;

    Mock::given(method("GET"))
        .and(path("/api/key-images/study/ST1"))
        .and(query_param("category", "finding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "studyInstanceUid": "ST1",
            "count": 1,
            "keyImages": [key_image_json()]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = api
        .list_key_images_by_study("ST1", Some("finding"))
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, KEY_IMAGE_ID.parse::<RecordId>().unwrap());
}

#[tokio::test]
async fn test_delete_key_image_by_instance() {
    let (server, api) = start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/key-images/instance/SOP1"))
        .and(query_param("frameIndex", "2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api.delete_key_image_by_instance("SOP1", 2).await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: a key-image row with a null frame index is skipped
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_null_frame_index_row_is_skipped() {
    let (server, api) = start().await;

    let mut broken = key_image_json();
    broken["id"] = json!("0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a13");
    broken["frameIndex"] = json!(null);

    Mock::given(method("GET"))
        .and(path("/api/key-images/instance/SOP1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sopInstanceUid": "SOP1",
            "count": 2,
            "keyImages": [broken, key_image_json()]
        })))
        .mount(&server)
        .await;

    let list = api.list_key_images_by_instance("SOP1").await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, KEY_IMAGE_ID.parse::<RecordId>().unwrap());
}
