use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::{count_questions, get_questions_page},
        },
        Category, Question,
    },
    server::{
        app::AppState,
        extract::{AppPath, AppQuery},
    },
};

use super::{success, ApiResponse, PageSize, Pagination};

#[derive(Serialize)]
struct CategoriesBody {
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryBody {
    category: Category,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    questions: Vec<Question>,
    current_category: Category,
    questions_number: i64,
}

/// `{id: type}` lookup table, which is what the listing endpoints hand out.
pub(super) async fn categories_map(pool: &SqlitePool) -> sqlx::Result<BTreeMap<i64, String>> {
    Ok(get_all_categories(pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c.kind))
        .collect())
}

async fn categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesBody> {
    success(CategoriesBody {
        categories: categories_map(&pool).await?,
    })
}

async fn category(
    State(pool): State<SqlitePool>,
    AppPath(id): AppPath<i64>,
) -> ApiResponse<CategoryBody> {
    success(CategoryBody {
        category: get_category(&pool, id).await?,
    })
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    State(page_size): State<PageSize>,
    AppPath(id): AppPath<i64>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> ApiResponse<CategoryQuestionsBody> {
    let (limit, offset) = pagination.bounds(page_size)?;
    let current_category = get_category(&pool, id).await?;
    let questions = get_questions_page(&pool, Some(id), limit, offset).await?;
    success(CategoryQuestionsBody {
        questions,
        current_category,
        questions_number: count_questions(&pool, Some(id)).await?,
    })
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(categories))
        .route("/categories/{id}", get(category))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
