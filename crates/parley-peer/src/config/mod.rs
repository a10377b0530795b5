//! Config loader (strict parsing).

pub mod schema;

use std::fs;

use parley_core::error::{ParleyError, Result};

pub use schema::{BrokerSection, ClientSection, ParleyConfig, TransportKind};

pub fn load_from_file(path: &str) -> Result<ParleyConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ParleyError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ParleyConfig> {
    let cfg: ParleyConfig = serde_yaml::from_str(s)
        .map_err(|e| ParleyError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
