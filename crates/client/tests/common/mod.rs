use radmark_client::MarkupApi;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const MEASUREMENT_ID: &str = "0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a01";
pub const ANNOTATION_ID: &str = "0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a02";
pub const KEY_IMAGE_ID: &str = "0b6f3c1e-8a55-4d7e-9f1a-2c3d4e5f6a03";

/// Start a mock backend and a client pointed at its `/api` prefix.
pub async fn start() -> (MockServer, MarkupApi) {
    let server = MockServer::start().await;
    let api = MarkupApi::new(format!("{}/api", server.uri()));
    (server, api)
}

pub fn measurement_json() -> Value {
    json!({
        "id": MEASUREMENT_ID,
        "studyInstanceUid": "ST1",
        "seriesInstanceUid": "SE1",
        "sopInstanceUid": "SOP1",
        "imageId": "wadors:/api/wado/studies/ST1/series/SE1/instances/SOP1/frames/1",
        "frameIndex": 0,
        "measurementType": "LENGTH",
        "toolName": "Length",
        "label": null,
        "value": 40.0,
        "unit": "mm",
        "pointsJson": "[{\"x\":10.0,\"y\":20.0,\"z\":0.0},{\"x\":50.0,\"y\":20.0,\"z\":0.0}]",
        "roiStatsJson": null,
        "color": null,
        "visible": true,
        "createdBy": null,
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    })
}

pub fn annotation_json() -> Value {
    json!({
        "id": ANNOTATION_ID,
        "studyInstanceUid": "ST1",
        "seriesInstanceUid": "SE1",
        "sopInstanceUid": "SOP1",
        "frameIndex": 2,
        "annotationType": "ARROW",
        "toolName": "ArrowAnnotate",
        "text": "lesion",
        "pointsJson": "[{\"x\":1,\"y\":2,\"z\":0},{\"x\":3,\"y\":4,\"z\":0}]",
        "styleJson": "{\"lineWidth\":2.0}",
        "color": "#ff0000",
        "fontSize": 14,
        "visible": true,
        "locked": false,
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    })
}

pub fn key_image_json() -> Value {
    json!({
        "id": KEY_IMAGE_ID,
        "studyInstanceUid": "ST1",
        "seriesInstanceUid": "SE1",
        "sopInstanceUid": "SOP1",
        "frameIndex": 0,
        "instanceNumber": 7,
        "description": null,
        "category": "finding",
        "windowWidth": 400.0,
        "windowCenter": 40.0,
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    })
}
