// HTTP response helpers
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use handlebars::RenderError;
use serde_json::json;

/// Turn a rendered page into a response, logging render failures.
pub fn html_response(rendered: Result<String, RenderError>) -> Response {
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template render error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}
