use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub dashboard: DashboardSettings,
    pub heuristics: HeuristicsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageSettings {
    pub upload_dir: PathBuf,
    /// Parse at upload time and keep a CSV snapshot beside the workbook.
    pub snapshot_cache: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            snapshot_cache: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub preview_rows: usize,
    pub top_categories: usize,
    pub trend_points: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            preview_rows: 20,
            top_categories: 5,
            trend_points: 30,
        }
    }
}

/// Ordered column-name candidates for each role. Earlier entries win.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub date_candidates: Vec<String>,
    pub numeric_candidates: Vec<String>,
    pub category_candidates: Vec<String>,
    /// Share of non-null values that must parse for a text column to be
    /// picked as the date column.
    pub date_parse_threshold: f64,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            date_candidates: names(&[
                "date", "Date", "DATE", "full_date", "FULL_DATE", "day", "Day", "timestamp",
                "Timestamp",
            ]),
            numeric_candidates: names(&[
                "sales",
                "Sales",
                "SALES",
                "amount",
                "Amount",
                "AMOUNT",
                "revenue",
                "Revenue",
                "RATED_AMOUNT",
            ]),
            category_candidates: names(&[
                "Category", "CATEGORY", "Channel", "CHANNEL", "Status", "STATUS", "Type", "TYPE",
                "city", "City",
            ]),
            date_parse_threshold: 0.6,
        }
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/app")
}

/// Optional file source, then `SHEETDASH__SECTION__KEY` environment overrides.
pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("SHEETDASH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
