// Route table and middleware
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard, dashboard_json, health_check, index, upload_form, upload_submit,
};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .route("/upload", get(upload_form).post(upload_submit))
        .route("/dashboard", get(dashboard))
        .route("/api/dashboard", get(dashboard_json))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::AppConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use rust_xlsxwriter::Workbook;
    use tower::ServiceExt;

    const BOUNDARY: &str = "sheetdashboundary";

    async fn app(dir: &std::path::Path, snapshot_cache: bool) -> Router {
        let mut config = AppConfig::default();
        config.storage.upload_dir = dir.to_path_buf();
        config.storage.snapshot_cache = snapshot_cache;
        let state = AppState::from_config(&config).await.unwrap();
        build_router(Arc::new(state), config.server.max_upload_bytes)
    }

    fn sales_xlsx() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["Date", "Sales", "Channel"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        let rows = [
            ("01/02/2024", 10.0, "Web"),
            ("01/02/2024", 5.0, "Store"),
            ("02/02/2024", 8.0, "Web"),
            ("02/02/2024", 8.0, "Web"),
        ];
        for (i, (date, sales, channel)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, *date).unwrap();
            sheet.write_number(row, 1, *sales).unwrap();
            sheet.write_string(row, 2, *channel).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    fn multipart_request(field: &str, filename: &str, data: &[u8], cookie: Option<&str>) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn location(response: &Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// `name=value` pairs from Set-Cookie headers, joined for a Cookie header.
    fn cookies(response: &Response<Body>) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter(|pair| !pair.ends_with('='))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn flash(response: &Response<Body>) -> Option<String> {
        cookies(response)
            .split("; ")
            .find_map(|pair| pair.strip_prefix("flash="))
            .map(decode_cookie_value)
    }

    // The jar may percent-encode on top of the flash encoding.
    fn decode_cookie_value(raw: &str) -> String {
        let mut value = raw.to_string();
        while value.contains('%') {
            match urlencoding::decode(&value) {
                Ok(decoded) if decoded != value => value = decoded.into_owned(),
                _ => break,
            }
        }
        value
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_redirects_to_upload() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false).await.oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/upload");
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false)
            .await
            .oneshot(get("/healthz", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_csv_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false)
            .await
            .oneshot(multipart_request("file", "data.csv", b"a,b\n1,2\n", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/upload");
        assert_eq!(
            flash(&response).as_deref(),
            Some("Only Excel files are allowed (.xlsx / .xls).")
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false)
            .await
            .oneshot(multipart_request("other", "data.xlsx", b"x", None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/upload");
        assert_eq!(flash(&response).as_deref(), Some("No file part in request."));
    }

    #[tokio::test]
    async fn test_empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false)
            .await
            .oneshot(multipart_request("file", "", b"", None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/upload");
        assert_eq!(flash(&response).as_deref(), Some("No file selected."));
    }

    #[tokio::test]
    async fn test_dashboard_without_upload_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false)
            .await
            .oneshot(get("/dashboard", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/upload");
        assert_eq!(
            flash(&response).as_deref(),
            Some("No uploaded file found. Please upload an Excel file first.")
        );
    }

    #[tokio::test]
    async fn test_upload_form_shows_and_clears_flash() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false)
            .await
            .oneshot(get("/upload", Some("flash=No%20file%20selected.")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .any(|v| v.to_str().unwrap_or_default().starts_with("flash=;"));
        assert!(cleared);
        assert!(body_text(response).await.contains("No file selected."));
    }

    #[tokio::test]
    async fn test_upload_then_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), false).await;

        let response = app
            .clone()
            .oneshot(multipart_request("file", "sales report.xlsx", &sales_xlsx(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
        assert_eq!(flash(&response).as_deref(), Some("File uploaded successfully."));
        let cookie = cookies(&response);
        assert!(cookie.contains("current_upload="));

        let response = app
            .clone()
            .oneshot(get("/dashboard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("File uploaded successfully."));
        assert!(html.contains("Trend: Sales by Date"));
        assert!(html.contains("Top values (Channel)"));
        assert!(html.contains("_sales_report.xlsx"));

        let response = app
            .oneshot(get("/api/dashboard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["kpis"][0]["value"], 4);
        assert_eq!(json["kpis"][3]["name"], "Duplicate rows");
        assert_eq!(json["kpis"][3]["value"], 1);
        assert_eq!(json["line"]["points"][0]["label"], "2024-02-01");
        assert_eq!(json["line"]["points"][0]["value"], 15.0);
        assert_eq!(json["line"]["points"][1]["value"], 16.0);
        assert_eq!(json["bar"]["points"][0]["label"], "Web");
        assert_eq!(json["roles"]["date"], "Date");
    }

    #[tokio::test]
    async fn test_each_session_sees_its_own_upload() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), false).await;

        let first = app
            .clone()
            .oneshot(multipart_request("file", "first.xlsx", &sales_xlsx(), None))
            .await
            .unwrap();
        let first_cookie = cookies(&first);
        let second = app
            .clone()
            .oneshot(multipart_request("file", "second.xlsx", &sales_xlsx(), None))
            .await
            .unwrap();
        assert!(cookies(&second).contains("second.xlsx"));

        let response = app
            .oneshot(get("/api/dashboard", Some(&first_cookie)))
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["file_name"].as_str().unwrap().ends_with("_first.xlsx"));
    }

    #[tokio::test]
    async fn test_unreadable_workbook_redirects_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), false).await;

        let response = app
            .clone()
            .oneshot(multipart_request("file", "broken.xlsx", b"not excel", None))
            .await
            .unwrap();
        let cookie = cookies(&response);

        let response = app
            .clone()
            .oneshot(get("/dashboard", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(location(&response), "/upload");
        assert!(flash(&response).unwrap().starts_with("Failed to read Excel: "));

        let response = app.oneshot(get("/api/dashboard", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_snapshot_cache_rejects_unreadable_upload_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), true)
            .await
            .oneshot(multipart_request("file", "broken.xlsx", b"not excel", None))
            .await
            .unwrap();
        assert_eq!(location(&response), "/upload");
        assert!(flash(&response).unwrap().starts_with("Failed to read Excel: "));
        assert!(!cookies(&response).contains("current_upload="));
    }

    #[tokio::test]
    async fn test_api_dashboard_without_upload() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path(), false)
            .await
            .oneshot(get("/api/dashboard", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
