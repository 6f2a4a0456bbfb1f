use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api_state::ApiState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Every outcome is an answer string; failures arrive pre-formatted from the
/// agent, so this handler always responds 200.
pub async fn ask(
    State(state): State<ApiState>,
    Json(input): Json<AskRequest>,
) -> Json<AskResponse> {
    info!(question_bytes = input.question.len(), "received question");

    let answer = state.agent.answer(&input.question).await;
    Json(AskResponse { answer })
}
