use log::Level;

use crate::packages::gate::GateConfig;
use crate::packages::models::{Catalog, CatalogError};

const PACKAGE_CATALOG: &str = include_str!("../packages.json");

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug  // Verbose gate tracing while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

pub fn package_catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_json(PACKAGE_CATALOG)
}

pub fn gate_config() -> GateConfig {
    GateConfig::default()
}
