use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{find_category, get_all_categories},
            questions::{self, get_all_questions, search_questions},
        },
        Question,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResponse, OrUnprocessable},
        pagination::{paginate, Page, QUESTIONS_PER_PAGE},
    },
};

use super::{categories::category_map, QuestionList, Success};

#[derive(Deserialize)]
struct NewQuestion {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm", default)]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    current_category: String,
}

/// Type label of the category `question` belongs to, or an empty string when
/// there is no such question or category.
async fn category_label(pool: &SqlitePool, question: Option<&Question>) -> sqlx::Result<String> {
    let Some(question) = question else {
        return Ok(String::new());
    };
    Ok(find_category(pool, question.category)
        .await?
        .map(|c| c.kind)
        .unwrap_or_default())
}

// current_category follows the first question overall, not the first on the page
async fn list_questions(
    State(pool): State<SqlitePool>,
    Page(number): Page,
) -> ApiResponse<QuestionsPage> {
    let questions = get_all_questions(&pool).await?;
    let page = paginate(number, QUESTIONS_PER_PAGE, &questions);
    if page.is_empty() {
        return Err(ApiError::NotFound);
    }
    let categories = get_all_categories(&pool).await?;
    let current_category = category_label(&pool, questions.first()).await?;

    Ok(Json(QuestionsPage {
        success: true,
        questions: page.to_vec(),
        total_questions: questions.len(),
        categories: category_map(categories),
        current_category,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    payload: Result<Json<NewQuestion>, JsonRejection>,
) -> ApiResponse<Success> {
    let Json(new_question) = payload?;
    let id = questions::create_question(
        &pool,
        new_question.question.as_deref(),
        new_question.answer.as_deref(),
        new_question.category,
        new_question.difficulty,
    )
    .await
    .or_unprocessable()?;

    tracing::info!(id, "Question created");
    Ok(Json(Success::ok()))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Success> {
    let Path(id) = id?;
    if questions::find_question(&pool, id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    questions::delete_question(&pool, id)
        .await
        .or_unprocessable()?;

    tracing::info!(id, "Question deleted");
    Ok(Json(Success::ok()))
}

async fn search(
    State(pool): State<SqlitePool>,
    Page(page): Page,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<QuestionList> {
    let Json(body) = payload?;
    let term = body.search_term.unwrap_or_default();
    let matches = search_questions(&pool, &term).await.or_unprocessable()?;
    let current_category = category_label(&pool, matches.first())
        .await
        .or_unprocessable()?;

    Ok(Json(QuestionList::new(
        paginate(page, QUESTIONS_PER_PAGE, &matches),
        matches.len(),
        current_category,
    )))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/questions/search", post(search))
        .with_state(state)
}
