mod categories;
mod questions;
mod quizzes;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::{pick_question, quizzes_router};

use serde::Serialize;

use crate::db::Question;

#[derive(Serialize)]
pub(crate) struct Success {
    success: bool,
}

impl Success {
    pub(crate) fn ok() -> Self {
        Success { success: true }
    }
}

/// A page of questions together with the size of the whole result set.
#[derive(Serialize)]
pub(crate) struct QuestionList {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

impl QuestionList {
    pub(crate) fn new(page: &[Question], total_questions: usize, current_category: String) -> Self {
        QuestionList {
            success: true,
            questions: page.to_vec(),
            total_questions,
            current_category,
        }
    }
}
