// HTTP request handlers
use crate::application::dashboard_service::DashboardError;
use crate::application::upload_service::UploadError;
use crate::infrastructure::http_response::{html_response, json_error};
use crate::presentation::app_state::AppState;
use crate::presentation::session::{current_upload, set_current_upload, set_flash, take_flash};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn index() -> Redirect {
    Redirect::to("/upload")
}

/// Upload form, showing any pending flash message
pub async fn upload_form(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let has_current = current_upload(&jar).is_some();
    let (jar, flash) = take_flash(jar);
    let page = state.views.upload_page(flash.as_deref(), has_current);
    (jar, html_response(page)).into_response()
}

/// Accept a multipart upload in the `file` field
pub async fn upload_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    multipart: Multipart,
) -> (CookieJar, Redirect) {
    let (filename, data) = match read_file_field(multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => return flash_redirect(jar, &UploadError::MissingFilePart.to_string(), "/upload"),
        Err(message) => return flash_redirect(jar, &message, "/upload"),
    };

    match state.upload_service.upload(&filename, data).await {
        Ok(stored) => {
            tracing::info!("Accepted upload {} as {}", filename, stored);
            let jar = set_current_upload(jar, &stored);
            flash_redirect(jar, "File uploaded successfully.", "/dashboard")
        }
        Err(UploadError::Storage(e)) => {
            tracing::error!("Failed to store upload {}: {}", filename, e);
            flash_redirect(jar, &UploadError::Storage(e).to_string(), "/upload")
        }
        Err(e) => {
            tracing::warn!("Rejected upload {:?}: {}", filename, e);
            flash_redirect(jar, &e.to_string(), "/upload")
        }
    }
}

/// Dashboard for the caller's current upload
pub async fn dashboard(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let current = current_upload(&jar);
    match state.dashboard_service.get_dashboard(current.as_deref()).await {
        Ok(dashboard) => {
            let (jar, flash) = take_flash(jar);
            let page = state.views.dashboard_page(&dashboard, flash.as_deref());
            (jar, html_response(page)).into_response()
        }
        Err(e) => {
            if let DashboardError::Unreadable(reason) = &e {
                tracing::warn!("Unreadable workbook {:?}: {}", current, reason);
            }
            flash_redirect(jar, &e.to_string(), "/upload").into_response()
        }
    }
}

/// Same dashboard as JSON
pub async fn dashboard_json(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let current = current_upload(&jar);
    match state.dashboard_service.get_dashboard(current.as_deref()).await {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(e @ DashboardError::NoUpload) => json_error(StatusCode::NOT_FOUND, e.to_string()),
        Err(e @ DashboardError::Unreadable(_)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

fn flash_redirect(jar: CookieJar, message: &str, to: &str) -> (CookieJar, Redirect) {
    (set_flash(jar, message), Redirect::to(to))
}

/// Pull the `file` field out of the form. `Ok(None)` when the field is absent.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<(String, Bytes)>, String> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(format!("Failed to receive upload: {}", e)),
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to receive upload: {}", e))?;
        return Ok(Some((filename, data)));
    }
}
