use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_category,
            questions::{self, count_questions, get_questions_page, search_questions},
        },
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        extract::{AppJson, AppPath, AppQuery},
    },
};

use super::{
    categories::categories_map, first_page, success, ApiResponse, PageSize, Pagination,
};

#[derive(Deserialize)]
struct QuestionsQuery {
    #[serde(default = "first_page")]
    page: u32,
    category: Option<i64>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

#[derive(Serialize)]
struct QuestionsBody {
    questions: Vec<Question>,
    total_questions: i64,
    current_category: Option<i64>,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CreatedBody {
    added_question_id: i64,
}

#[derive(Serialize)]
struct DeletedBody {
    deleted_question_id: i64,
}

#[derive(Serialize)]
struct SearchBody {
    questions: Vec<Question>,
    search_term: String,
    results_number: usize,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    State(page_size): State<PageSize>,
    AppQuery(query): AppQuery<QuestionsQuery>,
) -> ApiResponse<QuestionsBody> {
    let (limit, offset) = Pagination { page: query.page }.bounds(page_size)?;
    let questions = get_questions_page(&pool, None, limit, offset).await?;
    success(QuestionsBody {
        questions,
        total_questions: count_questions(&pool, None).await?,
        current_category: query.category,
        categories: categories_map(&pool).await?,
    })
}

async fn validate(pool: &SqlitePool, question: &NewQuestion) -> Result<(), ApiError> {
    if question.question.trim().is_empty() {
        return Err(ApiError::Unprocessable("question text is blank".to_owned()));
    }
    if question.answer.trim().is_empty() {
        return Err(ApiError::Unprocessable("answer text is blank".to_owned()));
    }
    if question.difficulty < 1 {
        return Err(ApiError::Unprocessable(format!(
            "difficulty {} is not positive",
            question.difficulty
        )));
    }
    match get_category(pool, question.category).await {
        Ok(_) => Ok(()),
        Err(sqlx::Error::RowNotFound) => Err(ApiError::Unprocessable(format!(
            "category {} does not exist",
            question.category
        ))),
        Err(e) => Err(e.into()),
    }
}

async fn create_question(
    State(pool): State<SqlitePool>,
    AppJson(new_question): AppJson<NewQuestion>,
) -> ApiResponse<CreatedBody> {
    validate(&pool, &new_question).await?;
    let id = questions::create_question(&pool, &new_question).await?;
    tracing::info!(id, category = new_question.category, "Question created");
    success(CreatedBody {
        added_question_id: id,
    })
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    AppPath(id): AppPath<i64>,
) -> ApiResponse<DeletedBody> {
    questions::delete_question(&pool, id).await?;
    tracing::info!(id, "Question deleted");
    success(DeletedBody {
        deleted_question_id: id,
    })
}

async fn search(
    State(pool): State<SqlitePool>,
    AppQuery(SearchQuery { q }): AppQuery<SearchQuery>,
) -> ApiResponse<SearchBody> {
    let term = q.trim();
    if term.is_empty() {
        return Err(ApiError::Unprocessable("search term is blank".to_owned()));
    }
    let questions = search_questions(&pool, term).await?;
    success(SearchBody {
        results_number: questions.len(),
        questions,
        search_term: term.to_owned(),
    })
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/search", get(search))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
