use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Question;

/// Read-only question catalog, loaded once at process start and shared
/// behind an `Arc` for the process lifetime. Concurrent reads need no
/// synchronization since the data never mutates.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read question catalog {}", path.display()))?;
        let questions: Vec<Question> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse question catalog {}", path.display()))?;

        tracing::info!(count = questions.len(), "Question catalog loaded");
        Ok(Self::from_questions(questions))
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Exact, case-sensitive lookup. Duplicate `question_text` entries are
    /// not deduplicated; the first occurrence wins.
    pub fn find_by_text(&self, text: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.question_text == text)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, chapter: &str, follow_up: bool) -> Question {
        Question {
            question_text: text.to_string(),
            chapter_name: chapter.to_string(),
            follow_up,
        }
    }

    #[test]
    fn find_by_text_is_exact_and_case_sensitive() {
        let catalog = QuestionCatalog::from_questions(vec![question("Q1", "Intro", false)]);

        assert!(catalog.find_by_text("Q1").is_some());
        assert!(catalog.find_by_text("q1").is_none());
        assert!(catalog.find_by_text("Q1 ").is_none());
        assert!(catalog.find_by_text("Q2").is_none());
    }

    #[test]
    fn duplicate_question_text_keeps_first_occurrence() {
        let catalog = QuestionCatalog::from_questions(vec![
            question("Q1", "Intro", false),
            question("Q1", "Advanced", true),
        ]);

        let resolved = catalog.find_by_text("Q1").unwrap();
        assert_eq!(resolved.chapter_name, "Intro");
        assert!(!resolved.follow_up);
    }

    #[test]
    fn parses_catalog_json_with_optional_follow_up() {
        let raw = r#"[
            {"questionText": "Q1", "chapterName": "Intro"},
            {"questionText": "Q2", "chapterName": "Intro", "followUp": true}
        ]"#;
        let questions: Vec<Question> = serde_json::from_str(raw).unwrap();
        let catalog = QuestionCatalog::from_questions(questions);

        assert_eq!(catalog.len(), 2);
        assert!(!catalog.find_by_text("Q1").unwrap().follow_up);
        assert!(catalog.find_by_text("Q2").unwrap().follow_up);
    }
}
