pub mod account;
pub mod admin;
pub mod homepage;
pub mod posts;
pub mod submission;

use axum::{
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::rejections::{AppError, ResultExt};

/// Tell htmx to navigate to `to`, optionally setting cookies on the way.
pub(crate) fn hx_redirect(to: &str, cookies: Vec<HeaderValue>) -> Result<Response, AppError> {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }
    headers.insert(
        "HX-Redirect",
        HeaderValue::from_str(to).reject("could not build redirect header")?,
    );
    Ok((headers, "").into_response())
}
