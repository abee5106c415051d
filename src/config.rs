//! Application configuration
//!
//! Read from environment variables; a `.env` file is loaded first when
//! present.
//!
//!   FLEET_DATABASE_URL        — Postgres connection string (optional; in-memory store when unset)
//!   FLEET_DATABASE_POOL_SIZE  — max pool connections (default: 10)
//!   FLEET_BIND_ADDR           — listen address (default: 0.0.0.0:4200)
//!   FLEET_STAGE_CATALOG       — YAML stage catalog path (default: compiled-in catalog)
//!   FLEET_EXPIRY_WARNING_DAYS — expiry warning window in days, 0..=3650 (default: 30)
//!   FLEET_RUN_MIGRATIONS      — apply migrations on startup (default: false)

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::error::CatalogError;
use crate::rules::DEFAULT_WARNING_DAYS;
use crate::workflow::StageCatalog;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4200";
pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const MAX_WARNING_DAYS: i64 = 3650;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub database_pool_size: u32,
    pub bind_addr: String,
    pub stage_catalog_path: Option<PathBuf>,
    pub expiry_warning_days: i64,
    pub run_migrations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database_pool_size: DEFAULT_POOL_SIZE,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            stage_catalog_path: None,
            expiry_warning_days: DEFAULT_WARNING_DAYS,
            run_migrations: false,
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            database_url: get("FLEET_DATABASE_URL"),
            database_pool_size: parse_or(
                "FLEET_DATABASE_POOL_SIZE",
                get("FLEET_DATABASE_POOL_SIZE"),
                defaults.database_pool_size,
            )?,
            bind_addr: get("FLEET_BIND_ADDR").unwrap_or(defaults.bind_addr),
            stage_catalog_path: get("FLEET_STAGE_CATALOG").map(PathBuf::from),
            expiry_warning_days: parse_in_range(
                "FLEET_EXPIRY_WARNING_DAYS",
                get("FLEET_EXPIRY_WARNING_DAYS"),
                defaults.expiry_warning_days,
                0..=MAX_WARNING_DAYS,
            )?,
            run_migrations: match get("FLEET_RUN_MIGRATIONS") {
                None => false,
                Some(v) => parse_flag("FLEET_RUN_MIGRATIONS", &v)?,
            },
        })
    }

    /// The configured catalog file, or the compiled-in catalog
    pub fn load_catalog(&self) -> Result<Arc<StageCatalog>, CatalogError> {
        let catalog = match &self.stage_catalog_path {
            Some(path) => StageCatalog::load_from_file(path)?,
            None => StageCatalog::builtin()?,
        };
        Ok(Arc::new(catalog))
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: v }),
    }
}

fn parse_in_range<T>(
    name: &'static str,
    value: Option<String>,
    default: T,
    range: std::ops::RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd,
{
    let raw = value.clone();
    let parsed = parse_or(name, value, default)?;
    if range.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::InvalidValue {
            name,
            value: raw.unwrap_or_default(),
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.database_pool_size, 10);
        assert_eq!(cfg.bind_addr, "0.0.0.0:4200");
        assert_eq!(cfg.expiry_warning_days, 30);
        assert!(!cfg.run_migrations);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("FLEET_DATABASE_URL", "postgresql://localhost/fleet"),
            ("FLEET_DATABASE_POOL_SIZE", "4"),
            ("FLEET_EXPIRY_WARNING_DAYS", "15"),
            ("FLEET_RUN_MIGRATIONS", "yes"),
        ])
        .unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgresql://localhost/fleet"));
        assert_eq!(cfg.database_pool_size, 4);
        assert_eq!(cfg.expiry_warning_days, 15);
        assert!(cfg.run_migrations);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let cfg = config(&[("FLEET_DATABASE_URL", "  "), ("FLEET_BIND_ADDR", "")]).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = config(&[("FLEET_DATABASE_POOL_SIZE", "many")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "FLEET_DATABASE_POOL_SIZE has an invalid value 'many'"
        );
    }

    #[test]
    fn test_warning_days_out_of_range_is_reported() {
        for value in ["1000000000", "-1", "3651"] {
            let err = config(&[("FLEET_EXPIRY_WARNING_DAYS", value)]).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { name: "FLEET_EXPIRY_WARNING_DAYS", .. }
            ));
        }
        let cfg = config(&[("FLEET_EXPIRY_WARNING_DAYS", "0")]).unwrap();
        assert_eq!(cfg.expiry_warning_days, 0);
        let cfg = config(&[("FLEET_EXPIRY_WARNING_DAYS", "3650")]).unwrap();
        assert_eq!(cfg.expiry_warning_days, MAX_WARNING_DAYS);
    }

    #[test]
    fn test_builtin_catalog_by_default() {
        let catalog = config(&[]).unwrap().load_catalog().unwrap();
        assert_eq!(catalog.first_outbound_tag(), "container_pickup");
    }
}
