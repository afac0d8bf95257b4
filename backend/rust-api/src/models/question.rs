use serde::{Deserialize, Serialize};

/// One entry of the static question catalog. `question_text` doubles as the
/// question's identifier: submitted answers reference it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,
    pub chapter_name: String,
    #[serde(default)]
    pub follow_up: bool,
}
