use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::questions::{get_all_questions, get_questions_for_category},
        Question,
    },
    server::{
        app::AppState,
        deserializers::Id,
        error::{ApiResponse, OrUnprocessable},
    },
    telemetry::{QUIZ_GAMES_FINISHED, QUIZ_QUESTIONS_SERVED},
};

/// Category id meaning "questions from every category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizRequest {
    previous_questions: Vec<Id>,
    quiz_category: QuizCategory,
}

#[derive(Deserialize)]
struct QuizCategory {
    id: Id,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
}

/// Picks a question uniformly at random among `candidates` whose id is not in
/// `previous`. Returns `None` once every candidate has been asked.
pub fn pick_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    if previous.len() == candidates.len() {
        return None;
    }
    let remaining: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .collect();
    remaining.choose(rng).cloned()
}

async fn play(
    State(pool): State<SqlitePool>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<QuizResponse> {
    let Json(request) = payload?;
    let Id(category) = request.quiz_category.id;
    let candidates = if category == ALL_CATEGORIES {
        get_all_questions(&pool).await
    } else {
        get_questions_for_category(&pool, category).await
    }
    .or_unprocessable()?;

    let previous: Vec<i64> = request.previous_questions.iter().map(|id| id.0).collect();
    let question = pick_question(candidates, &previous, &mut rand::thread_rng());

    let label = if category == ALL_CATEGORIES {
        "all".to_owned()
    } else {
        category.to_string()
    };
    match &question {
        Some(q) => {
            tracing::debug!(question = q.id, category, "Serving quiz question");
            QUIZ_QUESTIONS_SERVED
                .with_label_values(&[label.as_str()])
                .inc();
        }
        None => {
            tracing::debug!(category, asked = previous.len(), "Quiz exhausted");
            QUIZ_GAMES_FINISHED.with_label_values(&[label.as_str()]).inc();
        }
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn questions(ids: &[i64]) -> Vec<Question> {
        ids.iter()
            .map(|&id| Question {
                id,
                question: format!("Question {id}?"),
                answer: format!("Answer {id}"),
                category: 5,
                difficulty: 1,
            })
            .collect()
    }

    #[test]
    fn never_repeats_a_previous_question() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = pick_question(questions(&[2, 4, 6]), &[2, 6], &mut rng).unwrap();
            assert_eq!(picked.id, 4);
        }
    }

    #[test]
    fn every_remaining_question_can_be_drawn() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(pick_question(questions(&[1, 2, 3, 4]), &[3], &mut rng).unwrap().id);
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), [1, 2, 4]);
    }

    #[test]
    fn game_over_when_everything_was_asked() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_question(questions(&[2, 4, 6]), &[2, 4, 6], &mut rng).is_none());
        assert!(pick_question(questions(&[]), &[], &mut rng).is_none());
    }

    #[test]
    fn duplicate_previous_ids_do_not_loop_forever() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(pick_question(questions(&[2, 4, 6]), &[2, 2, 4, 4, 6, 6], &mut rng).is_none());
    }

    #[test]
    fn previous_ids_from_other_categories_are_ignored() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let picked = pick_question(questions(&[10, 11, 12]), &[1, 10], &mut rng).unwrap();
            assert_ne!(picked.id, 10);
        }
    }
}
