use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

// axum's own extractors answer with plain-text rejections, these wrap them so
// every failure goes out as the uniform JSON error body

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);
