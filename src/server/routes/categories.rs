use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{find_category, get_all_categories},
            questions::get_questions_for_category,
        },
        Category,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResponse, OrUnprocessable},
        pagination::{paginate, Page, QUESTIONS_PER_PAGE},
    },
};

use super::QuestionList;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

pub(crate) fn category_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesResponse> {
    let categories = get_all_categories(&pool).await?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}

// An unknown category is reported as 422, not 404.
async fn questions_for_category(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    Page(page): Page,
) -> ApiResponse<QuestionList> {
    let Path(id) = id?;
    let questions = get_questions_for_category(&pool, id)
        .await
        .or_unprocessable()?;
    let Some(category) = find_category(&pool, id).await.or_unprocessable()? else {
        tracing::info!(category = id, "Unknown category");
        return Err(ApiError::Unprocessable);
    };

    Ok(Json(QuestionList::new(
        paginate(page, QUESTIONS_PER_PAGE, &questions),
        questions.len(),
        category.kind,
    )))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
