use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub mod question;

pub use question::Question;

/// One submitted answer. `question_name` must match a catalog question's
/// `question_text` exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_name: String,
    pub selected_answer: String,
    pub points: f64,
}

/// Persisted quiz submission. `document_url` is absent until the rendered
/// results document has been uploaded, then set exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub user_surname: String,
    pub user_email: String,
    pub answers: Vec<Answer>,
    pub total_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitUserDataRequest {
    #[validate(length(min = 1, message = "userName must not be empty"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "userSurname must not be empty"))]
    pub user_surname: String,
    #[validate(email(message = "userEmail must be a valid email address"))]
    pub user_email: String,
    pub answers: Vec<Answer>,
    // Accepted as sent by the client; never recomputed from answers[].points.
    pub total_points: f64,
}

#[derive(Debug, Serialize)]
pub struct SubmitUserDataResponse {
    pub message: String,
    pub data: Submission,
}

impl Submission {
    pub fn from_request(request: SubmitUserDataRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_name: request.user_name,
            user_surname: request.user_surname,
            user_email: request.user_email,
            answers: request.answers,
            total_points: request.total_points,
            document_url: None,
        }
    }
}
