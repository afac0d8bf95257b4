use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    metrics::SUBMISSIONS_TOTAL,
    models::{SubmitUserDataRequest, SubmitUserDataResponse},
    services::{submission_pipeline::SubmissionPipeline, AppState},
};

pub async fn submit_user_data(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitUserDataRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        user = %req.user_email,
        answers = req.answers.len(),
        "Received quiz submission"
    );

    if let Err(e) = req.validate() {
        SUBMISSIONS_TOTAL.with_label_values(&["invalid"]).inc();
        return Err((StatusCode::BAD_REQUEST, format!("Invalid submission: {e}")));
    }

    let pipeline = SubmissionPipeline::from_state(&state);

    match pipeline.submit(req).await {
        Ok(submission) => {
            SUBMISSIONS_TOTAL.with_label_values(&["accepted"]).inc();
            Ok((
                StatusCode::OK,
                Json(SubmitUserDataResponse {
                    message: "Quiz submitted successfully!".to_string(),
                    data: submission,
                }),
            ))
        }
        Err(e) => {
            SUBMISSIONS_TOTAL.with_label_values(&["rejected"]).inc();
            tracing::error!("Failed to submit quiz: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to submit quiz: {e}"),
            ))
        }
    }
}

pub async fn get_all_submissions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match state.store.list_all().await {
        Ok(submissions) => Ok((StatusCode::OK, Json(submissions))),
        Err(e) => {
            tracing::error!("Failed to retrieve submissions: {e}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve submissions.".to_string(),
            ))
        }
    }
}
