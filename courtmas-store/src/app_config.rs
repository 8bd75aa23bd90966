use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// First bookable start hour, inclusive.
    pub start_hour: u8,
    /// Last bookable start hour, inclusive.
    pub end_hour: u8,
    /// Payment window for a hold.
    pub hold_ttl_seconds: u64,
    /// Bounded wait for the commit critical section.
    pub commit_lock_timeout_ms: u64,
    /// Cadence of the expiry sweep; must stay at or below one second.
    #[serde(default = "default_expiry_tick")]
    pub expiry_tick_ms: u64,
    /// Cap for the admin booking listing.
    #[serde(default = "default_admin_limit")]
    pub admin_listing_limit: u32,
    /// Where the in-flight hold is cached for recovery.
    #[serde(default = "default_hold_cache_path")]
    pub hold_cache_path: String,
}

fn default_expiry_tick() -> u64 {
    1000
}

fn default_admin_limit() -> u32 {
    50
}

fn default_hold_cache_path() -> String {
    "courtmas-hold.json".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // Environment wins, e.g. COURTMAS__SERVER__PORT=8080.
            .add_source(config::Environment::with_prefix("COURTMAS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
