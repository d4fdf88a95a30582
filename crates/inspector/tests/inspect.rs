//! End-to-end dry run against a mocked backend.

use radmark_client::MarkupApi;
use radmark_inspector::inspect_with;
use radmark_pipeline::PipelineConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn measurement(id: &str, visible: bool) -> serde_json::Value {
    json!({
        "id": id,
        "studyInstanceUid": "ST1",
        "seriesInstanceUid": "SE1",
        "sopInstanceUid": "SOP1",
        "frameIndex": 0,
        "measurementType": "LENGTH",
        "toolName": "Length",
        "value": 40.0,
        "unit": "mm",
        "pointsJson": "[{\"x\":10.0,\"y\":20.0,\"z\":0.0},{\"x\":50.0,\"y\":20.0,\"z\":0.0}]",
        "roiStatsJson": null,
        "visible": visible,
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    })
}

async fn mount_lists(server: &MockServer, annotations_status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/measurements/study/ST1"))
        .and(query_param("visibleOnly", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "studyInstanceUid": "ST1",
            "count": 2,
            "measurements": [
                measurement("0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a01", true),
                measurement("0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a02", false)
            ]
        })))
        .mount(server)
        .await;

    let annotations = if annotations_status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({
            "studyInstanceUid": "ST1",
            "count": 0,
            "annotations": []
        }))
    } else {
        ResponseTemplate::new(annotations_status).set_body_string("boom")
    };
    Mock::given(method("GET"))
        .and(path("/api/annotations/study/ST1"))
        .respond_with(annotations)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Test: visible records become insert commands; hidden ones are counted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_inspect_prints_visible_commands() {
    let server = MockServer::start().await;
    mount_lists(&server, 200).await;

    let api = MarkupApi::new(format!("{}/api", server.uri()));
    let inspection = inspect_with(api, &PipelineConfig::default(), "ST1")
        .await
        .unwrap();

    assert_eq!(inspection.commands.len(), 1);
    assert_eq!(inspection.report.skipped_invisible, 1);

    let output = serde_json::to_value(&inspection).unwrap();
    let command = &output["commands"][0];
    assert_eq!(
        command["markupUID"],
        "restored-0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a01"
    );
    assert_eq!(
        command["imageLocator"],
        "wadors:/api/wado/studies/ST1/series/SE1/instances/SOP1/frames/1"
    );
    assert_eq!(
        command["handles"],
        json!({"points": [[10.0, 20.0, 0.0], [50.0, 20.0, 0.0]]})
    );
    assert_eq!(output["report"]["skippedInvisible"], 1);
}

// ---------------------------------------------------------------------------
// Test: a failing annotation query is reported, measurements still restore
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_inspect_reports_failed_query() {
    let server = MockServer::start().await;
    mount_lists(&server, 500).await;

    let api = MarkupApi::new(format!("{}/api", server.uri()));
    let inspection = inspect_with(api, &PipelineConfig::default(), "ST1")
        .await
        .unwrap();

    assert_eq!(inspection.commands.len(), 1);
    assert_eq!(inspection.report.query_failures.len(), 1);

    let output = serde_json::to_value(&inspection).unwrap();
    assert_eq!(output["report"]["queryFailures"][0]["kind"], "annotation");
}

// ---------------------------------------------------------------------------
// Test: one undecodable measurement row does not hide the others
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_inspect_restores_around_bad_row() {
    let server = MockServer::start().await;

    let mut negative = measurement("0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a02", true);
    negative["frameIndex"] = json!(-1);
    let mut second_frame = measurement("0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a03", true);
    second_frame["frameIndex"] = json!(1);

    Mock::given(method("GET"))
        .and(path("/api/measurements/study/ST1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "studyInstanceUid": "ST1",
            "count": 3,
            "measurements": [
                measurement("0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a01", true),
                negative,
                second_frame
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/annotations/study/ST1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "studyInstanceUid": "ST1",
            "count": 0,
            "annotations": []
        })))
        .mount(&server)
        .await;

    let api = MarkupApi::new(format!("{}/api", server.uri()));
    let inspection = inspect_with(api, &PipelineConfig::default(), "ST1")
        .await
        .unwrap();

    assert_eq!(inspection.commands.len(), 2);
    assert!(inspection.report.query_failures.is_empty());
    assert!(inspection.commands[1].image_locator.ends_with("/frames/2"));
}
