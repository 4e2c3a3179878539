//! Question answering endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::server::state::AppState;
use crate::types::{AnswerResponse, AskRequest, ErrorResponse};

/// POST /ask - answer a question from the database snapshot
///
/// Every outcome is a JSON object: `{answer}` on success, `{error}` otherwise.
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected /ask body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!(
                    "Invalid request body: {}",
                    rejection.body_text()
                ))),
            )
                .into_response();
        }
    };

    match state.orchestrator().answer(&request).await {
        Ok(answer) => {
            tracing::debug!("Answered with {}", answer.model);
            Json(AnswerResponse { answer: answer.text }).into_response()
        }
        Err(e) => {
            tracing::warn!("Ask failed: {}", e);
            e.into_response()
        }
    }
}
