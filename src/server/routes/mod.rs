mod categories;
mod questions;
mod quizzes;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Successful bodies always carry `"success": true` next to their own fields.
#[derive(Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub type ApiResponse<T> = Result<Json<Success<T>>, ApiError>;

fn success<T: Serialize>(body: T) -> ApiResponse<T> {
    Ok(Json(Success {
        success: true,
        body,
    }))
}

/// Number of questions per listing page.
#[derive(Clone, Copy, Debug)]
pub struct PageSize(pub u32);

#[derive(Deserialize)]
struct Pagination {
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    /// `(limit, offset)` for this page, pages start at 1.
    fn bounds(&self, size: PageSize) -> Result<(i64, i64), ApiError> {
        if self.page < 1 {
            return Err(ApiError::BadRequest("page numbers start at 1".to_owned()));
        }
        let limit = i64::from(size.0);
        Ok((limit, i64::from(self.page - 1) * limit))
    }
}
