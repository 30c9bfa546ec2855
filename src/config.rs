use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use config::{Config, ConfigError, Environment, File};

use crate::route::RouteOrder;

pub const DEFAULT_MAPS_BASE_URL: &str = "https://www.google.com/maps/dir/";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub maps_base_url: String,
    pub route_order: RouteOrder,
    pub allowed_extensions: HashSet<String>,
    pub recursive: bool,
    pub parallel_import: bool,
}

impl AppConfig {
    /// Loads settings from `config_dir`, layering `default`, the `RUN_MODE`
    /// file and `local` over built-in defaults, then `PHOTO_ROUTE_*` env vars.
    pub fn new(config_dir: &Path) -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let layer = |name: &str| File::from(config_dir.join(name)).required(false);

        let s = Config::builder()
            .set_default("log_level", "info")?
            .set_default("maps_base_url", DEFAULT_MAPS_BASE_URL)?
            .set_default("route_order", "file_created")?
            .set_default("allowed_extensions", vec!["png", "jpg", "jpeg", "gif", "bmp"])?
            .set_default("recursive", false)?
            .set_default("parallel_import", false)?
            .add_source(layer("default"))
            .add_source(layer(&env))
            .add_source(layer("local"))
            .add_source(Environment::with_prefix("PHOTO_ROUTE").try_parsing(true))
            .build()?;

        s.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            maps_base_url: DEFAULT_MAPS_BASE_URL.into(),
            route_order: RouteOrder::default(),
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "bmp"]
                .into_iter()
                .map(String::from)
                .collect(),
            recursive: false,
            parallel_import: false,
        }
    }
}
