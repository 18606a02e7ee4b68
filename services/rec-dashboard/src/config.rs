use std::path::PathBuf;
use std::time;

use url::Url;

use crate::errors::DashboardError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 10000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 2000;
pub const HEALTH_TIMEOUT: u64 = 2000;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";
pub const CHART_WIDTH: usize = 30;

fn env_to_u64(s: &str, default: u64) -> u64 {
    match std::env::var(s) {
        Ok(v) => v.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default
    }
}

fn env_to_bool(s: &str, default: bool) -> bool {
    match std::env::var(s) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on"  => true,
            "0" | "false" | "no" | "off" => false,
            _ => default
        },
        Err(_) => default
    }
}

/// Api runs locally, so plain http is allowed
fn ensure_http(url: &Url) -> Result<(), String> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("URL must be http(s), got {other}: {url}"))
    }
}

fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_string();
        path.push('/');
        url.set_path(&path);
    }
}

///
/// Configuration for the recommendation api
///
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url
}

pub fn parse_api_url(raw: &str) -> Result<ApiConfig, DashboardError> {
    let mut base_url = Url::parse(raw.trim())
        .map_err(|e| DashboardError::Config(
            format!("RECOMMENDER_API_URL invalid {e}")
        ))?;

    ensure_http(&base_url).map_err(DashboardError::Config)?;
    if base_url.host_str().is_none() {
        return Err(DashboardError::Config(format!("URL missing host: {base_url}")));
    }
    ensure_trailing_slash(&mut base_url);

    Ok( ApiConfig { base_url } )
}

fn build_api() -> Result<ApiConfig, DashboardError> {
    let raw = std::env::var("RECOMMENDER_API_URL")
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    parse_api_url(&raw)
}

///
/// Configuration for Http timeouts. No retries, a timed out call is
/// reported to the user as is.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub health_timeout: time::Duration
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            health_timeout: time::Duration::from_millis(HEALTH_TIMEOUT)
        }
    }
}

fn build_http() -> HttpConfig {
    HttpConfig {
        timeout: time::Duration::from_millis(
            env_to_u64("RECOMMENDER_TIMEOUT_MS", HTTP_TIMEOUT)
        ),
        connect_timeout: time::Duration::from_millis(
            env_to_u64("RECOMMENDER_CONNECT_TIMEOUT_MS", HTTP_CONNECT_TIMEOUT)
        ),
        health_timeout: time::Duration::from_millis(
            env_to_u64("RECOMMENDER_HEALTH_TIMEOUT_MS", HEALTH_TIMEOUT)
        )
    }
}

///
/// Initial toggles of the dashboard view
///
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub show_chart: bool,
    pub show_table: bool,
    pub chart_width: usize
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { show_chart: false, show_table: false, chart_width: CHART_WIDTH }
    }
}

fn build_view() -> ViewConfig {
    ViewConfig {
        show_chart: env_to_bool("DASHBOARD_CHART", false),
        show_table: env_to_bool("DASHBOARD_TABLE", false),
        chart_width: env_to_u64("DASHBOARD_CHART_WIDTH", CHART_WIDTH as u64)
            .clamp(5, 120) as usize
    }
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub log_dir: Option<PathBuf>,     // stderr when unset
    pub include_file_line: bool,
    pub include_target: bool
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "warn,rec_dashboard=info,reqwest=warn".to_string(),
            format: LogFormat::Json,
            log_dir: None,
            include_file_line: true,
            include_target: true
        }
    }
}

fn build_logging() -> LoggingConfig {
    let defaults = LoggingConfig::default();
    let format = match std::env::var("DASHBOARD_LOG_FORMAT").as_deref() {
        Ok("pretty") => LogFormat::Pretty,
        _ => defaults.format
    };
    let log_dir = std::env::var("DASHBOARD_LOG_DIR")
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from);

    LoggingConfig {
        filter_directives: std::env::var("DASHBOARD_LOG")
            .unwrap_or(defaults.filter_directives),
        format,
        log_dir,
        ..defaults
    }
}

///
/// AppConfig which holds everything the dashboard needs at start
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub view: ViewConfig,
    pub logging: LoggingConfig
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, DashboardError> {
    dotenvy::dotenv().ok();

    let api     = build_api()?;
    let http    = build_http();
    let view    = build_view();
    let logging = build_logging();

    Ok( AppConfig { api, http, view, logging } )
}
