use anyhow::anyhow;
use printpdf::{
    BuiltinFont, Color, Greyscale, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, Rgb,
    TextItem,
};

use crate::catalog::QuestionCatalog;
use crate::error::SubmitError;
use crate::models::Submission;
use crate::services::answer_grouper::GroupedAnswers;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MARGIN_MM: f32 = 20.0;
const TOP_Y_MM: f32 = 275.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
// Horizontal offset of the answer text when a follow-up label precedes it.
const FOLLOW_UP_TEXT_OFFSET_MM: f32 = 24.0;

pub const FOLLOW_UP_MARKER: &str = "Follow-up:";
pub const CLOSING_LINE: &str = "Thank you for participating in the quiz!";

/// Logical line of the results document, in final order. The PDF builder
/// consumes these; tests assert on them directly, so rendering stays
/// observable without parsing PDF bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum DocLine {
    Title(String),
    HeaderField { label: &'static str, value: String },
    ChapterHeading(String),
    AnswerLine { text: String, follow_up: bool },
    Footer(String),
}

impl DocLine {
    pub fn text(&self) -> String {
        match self {
            DocLine::Title(text) | DocLine::ChapterHeading(text) | DocLine::Footer(text) => {
                text.clone()
            }
            DocLine::HeaderField { label, value } => format!("{label}: {value}"),
            DocLine::AnswerLine { text, .. } => text.clone(),
        }
    }
}

/// Lays out the document: header block, one section per chapter in grouped
/// order, closing line. Pure and deterministic; identical inputs produce
/// identical lines.
pub fn layout_results(
    submission: &Submission,
    grouped: &GroupedAnswers,
    catalog: &QuestionCatalog,
) -> Result<Vec<DocLine>, SubmitError> {
    let mut lines = vec![
        DocLine::Title("Quiz Results".to_string()),
        DocLine::HeaderField {
            label: "Name",
            value: submission.user_name.clone(),
        },
        DocLine::HeaderField {
            label: "Sur Name",
            value: submission.user_surname.clone(),
        },
        DocLine::HeaderField {
            label: "Email",
            value: submission.user_email.clone(),
        },
        DocLine::HeaderField {
            label: "Total Points",
            value: submission.total_points.to_string(),
        },
    ];

    for chapter in grouped.chapters() {
        lines.push(DocLine::ChapterHeading(chapter.chapter.clone()));
        for answer in &chapter.answers {
            let question = catalog.find_by_text(&answer.question_name).ok_or_else(|| {
                SubmitError::Render(anyhow!(
                    "answer references question \"{}\" absent from the catalog",
                    answer.question_name
                ))
            })?;
            lines.push(DocLine::AnswerLine {
                text: format!(
                    "{}: {} ({} points)",
                    answer.question_name, answer.selected_answer, answer.points
                ),
                follow_up: question.follow_up,
            });
        }
    }

    lines.push(DocLine::Footer(CLOSING_LINE.to_string()));
    Ok(lines)
}

/// Renders the results document as PDF bytes. No network or I/O; the only
/// inputs are the submission, its grouped answers and the catalog.
pub fn render_results_pdf(
    submission: &Submission,
    grouped: &GroupedAnswers,
    catalog: &QuestionCatalog,
) -> Result<Vec<u8>, SubmitError> {
    let lines = layout_results(submission, grouped, catalog)?;
    let pages = build_pages(&lines);

    let mut warnings = Vec::new();
    let bytes = PdfDocument::new("Quiz Results")
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    Ok(bytes)
}

fn build_pages(lines: &[DocLine]) -> Vec<PdfPage> {
    let title_color = Color::Rgb(Rgb {
        r: 0.3,
        g: 0.69,
        b: 0.31,
        icc_profile: None,
    });
    let follow_up_color = Color::Rgb(Rgb {
        r: 0.8,
        g: 0.1,
        b: 0.1,
        icc_profile: None,
    });
    let text_color = Color::Greyscale(Greyscale::new(0.08, None));
    let footer_color = Color::Greyscale(Greyscale::new(0.47, None));

    let mut pages = Vec::new();
    let mut ops: Vec<Op> = Vec::new();
    let mut y = TOP_Y_MM;

    for line in lines {
        let advance = match line {
            DocLine::Title(_) => 14.0,
            DocLine::HeaderField { .. } => 8.0,
            DocLine::ChapterHeading(_) => 12.0,
            DocLine::AnswerLine { .. } => 7.0,
            DocLine::Footer(_) => 16.0,
        };

        if y - advance < BOTTOM_MARGIN_MM {
            pages.push(new_page(std::mem::take(&mut ops)));
            y = TOP_Y_MM;
        }

        match line {
            DocLine::Title(text) => {
                push_pdf_text(
                    &mut ops,
                    Point::new(Mm(LEFT_MARGIN_MM), Mm(y)),
                    BuiltinFont::HelveticaBold,
                    18.0,
                    22.0,
                    text.clone(),
                    &title_color,
                );
            }
            DocLine::HeaderField { .. } => {
                push_pdf_text(
                    &mut ops,
                    Point::new(Mm(LEFT_MARGIN_MM), Mm(y)),
                    BuiltinFont::Helvetica,
                    11.0,
                    14.0,
                    line.text(),
                    &text_color,
                );
            }
            DocLine::ChapterHeading(text) => {
                push_pdf_text(
                    &mut ops,
                    Point::new(Mm(LEFT_MARGIN_MM), Mm(y)),
                    BuiltinFont::HelveticaBold,
                    13.0,
                    16.0,
                    text.clone(),
                    &title_color,
                );
            }
            DocLine::AnswerLine { text, follow_up } => {
                let mut x = LEFT_MARGIN_MM + 4.0;
                if *follow_up {
                    push_pdf_text(
                        &mut ops,
                        Point::new(Mm(x), Mm(y)),
                        BuiltinFont::HelveticaBold,
                        10.0,
                        12.0,
                        FOLLOW_UP_MARKER.to_string(),
                        &follow_up_color,
                    );
                    x += FOLLOW_UP_TEXT_OFFSET_MM;
                }
                push_pdf_text(
                    &mut ops,
                    Point::new(Mm(x), Mm(y)),
                    BuiltinFont::Helvetica,
                    10.0,
                    12.0,
                    text.clone(),
                    &text_color,
                );
            }
            DocLine::Footer(text) => {
                push_pdf_text(
                    &mut ops,
                    Point::new(Mm(LEFT_MARGIN_MM + 35.0), Mm(y - 6.0)),
                    BuiltinFont::Helvetica,
                    11.0,
                    14.0,
                    text.clone(),
                    &footer_color,
                );
            }
        }

        y -= advance;
    }

    pages.push(new_page(ops));
    pages
}

fn new_page(ops: Vec<Op>) -> PdfPage {
    PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops)
}

fn push_pdf_text(
    ops: &mut Vec<Op>,
    pos: Point,
    font: BuiltinFont,
    font_size: f32,
    line_height: f32,
    text: String,
    color: &Color,
) {
    ops.extend([
        Op::StartTextSection,
        Op::SetTextCursor { pos },
        Op::SetFontSizeBuiltinFont {
            size: Pt(font_size),
            font,
        },
        Op::SetLineHeight {
            lh: Pt(line_height),
        },
        Op::SetFillColor { col: color.clone() },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(text)],
            font,
        },
        Op::EndTextSection,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answer, Question};
    use crate::services::answer_grouper::group_answers;

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::from_questions(vec![
            Question {
                question_text: "Q1".into(),
                chapter_name: "Intro".into(),
                follow_up: false,
            },
            Question {
                question_text: "Q2".into(),
                chapter_name: "Intro".into(),
                follow_up: true,
            },
        ])
    }

    fn submission(answers: Vec<Answer>, total_points: f64) -> Submission {
        Submission {
            id: "test".into(),
            user_name: "Ada".into(),
            user_surname: "Lovelace".into(),
            user_email: "ada@x.com".into(),
            answers,
            total_points,
            document_url: None,
        }
    }

    fn answer(name: &str, selected: &str, points: f64) -> Answer {
        Answer {
            question_name: name.into(),
            selected_answer: selected.into(),
            points,
        }
    }

    #[test]
    fn layout_matches_expected_lines_for_single_answer() {
        let catalog = catalog();
        let submission = submission(vec![answer("Q1", "Yes", 5.0)], 5.0);
        let grouped = group_answers(&catalog, &submission.answers).unwrap();

        let lines = layout_results(&submission, &grouped, &catalog).unwrap();
        let texts: Vec<String> = lines.iter().map(DocLine::text).collect();

        assert_eq!(
            texts,
            vec![
                "Quiz Results",
                "Name: Ada",
                "Sur Name: Lovelace",
                "Email: ada@x.com",
                "Total Points: 5",
                "Intro",
                "Q1: Yes (5 points)",
                CLOSING_LINE,
            ]
        );
    }

    #[test]
    fn follow_up_answers_carry_the_marker_flag() {
        let catalog = catalog();
        let submission = submission(
            vec![answer("Q1", "Yes", 5.0), answer("Q2", "No", 0.0)],
            5.0,
        );
        let grouped = group_answers(&catalog, &submission.answers).unwrap();

        let lines = layout_results(&submission, &grouped, &catalog).unwrap();
        let flags: Vec<bool> = lines
            .iter()
            .filter_map(|line| match line {
                DocLine::AnswerLine { follow_up, .. } => Some(*follow_up),
                _ => None,
            })
            .collect();

        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn layout_is_deterministic() {
        let catalog = catalog();
        let submission = submission(
            vec![answer("Q2", "Yes", 2.5), answer("Q1", "No", 1.0)],
            3.5,
        );
        let grouped = group_answers(&catalog, &submission.answers).unwrap();

        let first = layout_results(&submission, &grouped, &catalog).unwrap();
        let second = layout_results(&submission, &grouped, &catalog).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fractional_points_are_rendered_as_written() {
        let catalog = catalog();
        let submission = submission(vec![answer("Q1", "Partly", 2.5)], 2.5);
        let grouped = group_answers(&catalog, &submission.answers).unwrap();

        let lines = layout_results(&submission, &grouped, &catalog).unwrap();
        assert!(lines
            .iter()
            .any(|line| line.text() == "Q1: Partly (2.5 points)"));
    }

    #[test]
    fn render_fails_when_catalog_lost_a_question() {
        // Grouping was done against a catalog that knew Q1; rendering against
        // one that does not must fail rather than drop the answer.
        let full = catalog();
        let empty = QuestionCatalog::from_questions(vec![]);
        let submission = submission(vec![answer("Q1", "Yes", 5.0)], 5.0);
        let grouped = group_answers(&full, &submission.answers).unwrap();

        let err = layout_results(&submission, &grouped, &empty).unwrap_err();
        assert!(matches!(err, SubmitError::Render(_)));
    }

    #[test]
    fn pdf_output_is_a_pdf() {
        let catalog = catalog();
        let submission = submission(vec![answer("Q1", "Yes", 5.0)], 5.0);
        let grouped = group_answers(&catalog, &submission.answers).unwrap();

        let bytes = render_results_pdf(&submission, &grouped, &catalog).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_submissions_paginate() {
        let questions: Vec<Question> = (0..80)
            .map(|i| Question {
                question_text: format!("Q{i}"),
                chapter_name: format!("Chapter {}", i / 10),
                follow_up: false,
            })
            .collect();
        let catalog = QuestionCatalog::from_questions(questions);
        let answers: Vec<Answer> = (0..80).map(|i| answer(&format!("Q{i}"), "Yes", 1.0)).collect();
        let submission = submission(answers, 80.0);
        let grouped = group_answers(&catalog, &submission.answers).unwrap();

        let lines = layout_results(&submission, &grouped, &catalog).unwrap();
        let pages = build_pages(&lines);
        assert!(pages.len() > 1);
    }
}
