use serde::Deserialize;

pub const CONFIG_FILE: &str = "config/dashboards";
pub const ENV_PREFIX: &str = "DASHFORGE";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub grafana: GrafanaSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub lifecycle: LifecycleSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrafanaSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub main_org_token: String,
    pub temp_org_token: String,
    #[serde(default = "default_main_org_id")]
    pub main_org_id: i64,
    #[serde(default = "default_temp_org_id")]
    pub temp_org_id: i64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_titles_table")]
    pub titles_table: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LifecycleSettings {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_panel_counter_path")]
    pub panel_counter_path: String,
    #[serde(default = "default_first_panel_id")]
    pub first_panel_id: i64,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
            panel_counter_path: default_panel_counter_path(),
            first_panel_id: default_first_panel_id(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_main_org_id() -> i64 {
    1
}

fn default_temp_org_id() -> i64 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    5
}

fn default_titles_table() -> String {
    "titles".to_string()
}

fn default_log_dir() -> String {
    ".".to_string()
}

fn default_retention_days() -> i64 {
    7
}

fn default_sweep_interval_secs() -> u64 {
    86_400
}

fn default_panel_counter_path() -> String {
    "panel_id_index.txt".to_string()
}

fn default_first_panel_id() -> i64 {
    1
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// `config/dashboards.*` (optional) overlaid by `DASHFORGE__SECTION__KEY`
/// environment variables, which is where the org tokens normally come from.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
