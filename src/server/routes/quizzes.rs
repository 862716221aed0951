use std::collections::HashSet;

use axum::{extract::State, routing::post, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::{
    db::Question,
    quiz::{CategoryFilter, QuizSelector},
    server::{app::AppState, extract::AppJson},
};

use super::{success, ApiResponse};

/// Category of a round as the client sent it; unknown keys are echoed back untouched.
/// Older clients send the id as a string.
#[derive(Deserialize, Serialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct QuizRequest {
    quiz_category: QuizCategory,
    previous_questions: Vec<i64>,
}

#[derive(Serialize)]
struct QuizBody {
    quiz_category: QuizCategory,
    question: Option<Question>,
    previous_questions: Vec<i64>,
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    AppJson(request): AppJson<QuizRequest>,
) -> ApiResponse<QuizBody> {
    let asked: HashSet<i64> = request.previous_questions.iter().copied().collect();
    let filter = CategoryFilter::from(request.quiz_category.id);
    let mut rng = StdRng::from_os_rng();
    let selection = QuizSelector::new(pool)
        .next_question(filter, &asked, &mut rng)
        .await?;
    success(QuizBody {
        quiz_category: request.quiz_category,
        question: selection.into_question(),
        previous_questions: request.previous_questions,
    })
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz))
        .with_state(state)
}
