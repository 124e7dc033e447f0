//! Request extractors whose rejections render as [`AppError`].
//!
//! Thin wrappers over axum's `Json`, `Query` and `Path`, so malformed bodies,
//! query strings and path segments get the same JSON error body as every
//! other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

// ---

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);
