//! Tracing subscriber setup shared by the server and the offline importer.
//!
//! `RUST_LOG` overrides the per-binary default directives. `LOG_FORMAT=json`
//! switches to one JSON object per line.

use tracing_subscriber::{fmt, EnvFilter};

/// Default directives for the HTTP server.
pub const SERVER_DIRECTIVES: &str = "food_nutrient_api=debug,axum=info,tower_http=info";
/// Default directives for `import_data`; per-row debug output is too noisy for a batch run.
pub const IMPORTER_DIRECTIVES: &str = "food_nutrient_api=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init(default_directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());

    match format {
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).with_line_number(true).init(),
    }
}

/// Verbose logging routed through the test harness' captured output.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("food_nutrient_api=debug"))
        .with_test_writer()
        .try_init();
}
