use crate::catalog::QuestionCatalog;
use crate::error::SubmitError;
use crate::models::Answer;

/// Answers of one chapter, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterAnswers {
    pub chapter: String,
    pub answers: Vec<Answer>,
}

/// Answers partitioned by chapter. Chapter order equals the first
/// occurrence of each chapter in the submitted answer sequence, which in
/// turn fixes the section order of the rendered document. Derived per
/// request, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedAnswers {
    chapters: Vec<ChapterAnswers>,
}

impl GroupedAnswers {
    pub fn push(&mut self, chapter: &str, answer: Answer) {
        match self.chapters.iter_mut().find(|c| c.chapter == chapter) {
            Some(group) => group.answers.push(answer),
            None => self.chapters.push(ChapterAnswers {
                chapter: chapter.to_string(),
                answers: vec![answer],
            }),
        }
    }

    pub fn chapters(&self) -> &[ChapterAnswers] {
        &self.chapters
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Partitions answers by the chapter of their catalog question, preserving
/// submission order within each chapter. An answer naming a question absent
/// from the catalog aborts the whole operation.
pub fn group_answers(
    catalog: &QuestionCatalog,
    answers: &[Answer],
) -> Result<GroupedAnswers, SubmitError> {
    let mut grouped = GroupedAnswers::default();

    for answer in answers {
        let question = catalog
            .find_by_text(&answer.question_name)
            .ok_or_else(|| SubmitError::UnknownQuestion(answer.question_name.clone()))?;
        grouped.push(&question.chapter_name, answer.clone());
    }

    Ok(grouped)
}
