use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::views;

#[derive(Debug)]
pub enum AppError {
    Internal(&'static str),
    Input(&'static str),
    Unauthorized,
    Forbidden,
    NotFound,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
            AppError::Input(msg) => *msg,
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(context) => tracing::error!("internal error: {context}"),
            AppError::Input(msg) => tracing::warn!("rejected input: {msg}"),
            _ => {}
        }

        let status = self.status();
        let body = views::error_page(html! {
            h1 { (status.as_u16()) }
            p { (self.message()) }
        });

        (status, body).into_response()
    }
}

pub trait ResultExt<T> {
    /// Log the underlying error and turn it into a 500.
    fn reject(self, context: &'static str) -> Result<T, AppError>;

    /// Log the underlying error and turn it into a 400.
    fn reject_input(self, context: &'static str) -> Result<T, AppError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn reject(self, context: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{context}: {e}");
            AppError::Internal(context)
        })
    }

    fn reject_input(self, context: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::warn!("{context}: {e}");
            AppError::Input(context)
        })
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
