// HTML views rendered with handlebars
use crate::domain::dashboard::Dashboard;
use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::json;

const UPLOAD_TEMPLATE: &str = include_str!("../../templates/upload.hbs");
const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/dashboard.hbs");

pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string("upload", UPLOAD_TEMPLATE)?;
        registry.register_template_string("dashboard", DASHBOARD_TEMPLATE)?;
        Ok(Self { registry })
    }

    pub fn upload_page(&self, flash: Option<&str>, has_current: bool) -> Result<String, RenderError> {
        self.registry.render(
            "upload",
            &json!({ "flash": flash, "has_current": has_current }),
        )
    }

    pub fn dashboard_page(&self, dashboard: &Dashboard, flash: Option<&str>) -> Result<String, RenderError> {
        let charts = json!({ "bar": dashboard.bar, "line": dashboard.line });
        self.registry.render(
            "dashboard",
            &json!({
                "flash": flash,
                "file_name": dashboard.file_name,
                "columns": dashboard.columns,
                "kpis": dashboard.kpis,
                "preview": dashboard.preview,
                "bar": dashboard.bar,
                "line": dashboard.line,
                "charts_json": script_safe_json(&charts),
            }),
        )
    }
}

/// JSON that can be embedded inside a `<script>` element.
fn script_safe_json(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
