use envconfig::Envconfig;
use lazy_static::lazy_static;

#[derive(Debug, Clone, Envconfig)]
pub struct Config {
    /// Base URL of the Unity Catalog server, without the API path.
    #[envconfig(from = "UCHELPER_URL", default = "http://localhost:8080")]
    pub uc_url: String,
    #[envconfig(from = "UCHELPER_LOG_LEVEL", default = "info")]
    pub log_level: String,
    #[envconfig(from = "UCHELPER_REQUEST_TIMEOUT_SECS", default = "30")]
    pub request_timeout_secs: u64,
    /// Catalog attached to the SQL engine when a client is created.
    #[envconfig(from = "UCHELPER_DEFAULT_CATALOG", default = "unity")]
    pub default_catalog: String,
    //Memory size in MB
    #[envconfig(from = "UCHELPER_SQL_MEMORY_SIZE", default = "512")]
    pub sql_memory_size: usize,
}

impl Config {
    pub fn init() -> Config {
        Config::init_from_env().expect("Failed to load config")
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::init();
}

/// Path prefix of the Unity Catalog REST API.
pub const API_PATH: &str = "/api/2.1/unity-catalog";
