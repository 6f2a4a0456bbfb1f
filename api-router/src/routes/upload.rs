use axum::{extract::State, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use common::error::AppError;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::api_state::ApiState;

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    #[form_data(limit = "10000000")]
    pub file: Option<FieldData<NamedTempFile>>,
}

/// Mirrors the ask contract: the response body is always a message string,
/// whether ingestion succeeded or not.
pub async fn upload(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Json<Value> {
    let Some(file) = input.file else {
        return Json(json!({ "message": "⚠️ No file uploaded." }));
    };

    let file_name = file
        .metadata
        .file_name
        .clone()
        .unwrap_or_else(|| "upload.txt".to_string());

    let message = match read_and_ingest(&state, &file_name, file).await {
        Ok(()) => format!("✅ File '{file_name}' added to the knowledge base."),
        Err(err) => {
            warn!(error = %err, file_name, "upload failed");
            format!("⚠️ Upload failed: {err}")
        }
    };

    Json(json!({ "message": message }))
}

async fn read_and_ingest(
    state: &ApiState,
    file_name: &str,
    file: FieldData<NamedTempFile>,
) -> Result<(), AppError> {
    let bytes = tokio::fs::read(file.contents.path()).await?;
    info!(file_name, bytes = bytes.len(), "received document upload");

    state.ingestion.add_document(file_name, bytes).await
}
