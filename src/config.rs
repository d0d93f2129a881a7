//! Process configuration read from the environment

use crate::error::ConfigError;
use crate::filters::models::DEFAULT_PAGE_SIZE;
use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
/// Five megabytes, the usual browser local storage allowance.
pub const DEFAULT_STORAGE_QUOTA: usize = 5 * 1024 * 1024;
pub const DEFAULT_HANDOFF_RECIPIENT: &str = "5511999999999";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub page_size: u32,
    /// When set, cart mirrors are files in this directory.
    pub cart_dir: Option<PathBuf>,
    pub storage_quota: usize,
    pub catalog_path: Option<PathBuf>,
    pub handoff_recipient: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            page_size: DEFAULT_PAGE_SIZE,
            cart_dir: None,
            storage_quota: DEFAULT_STORAGE_QUOTA,
            catalog_path: None,
            handoff_recipient: DEFAULT_HANDOFF_RECIPIENT.to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("STOREFRONT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: "STOREFRONT_BIND",
            value: bind_raw.clone(),
            reason: "expected host:port",
        })?;

        let page_size = match lookup("STOREFRONT_PAGE_SIZE") {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "STOREFRONT_PAGE_SIZE",
                        value: raw,
                        reason: "expected an integer >= 1",
                    })
                }
            },
        };

        let storage_quota = match lookup("STOREFRONT_STORAGE_QUOTA") {
            None => DEFAULT_STORAGE_QUOTA,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: "STOREFRONT_STORAGE_QUOTA",
                value: raw.clone(),
                reason: "expected a byte count",
            })?,
        };

        let log_json = match lookup("STOREFRONT_LOG_JSON") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                name: "STOREFRONT_LOG_JSON",
                value: raw,
                reason: "expected true or false",
            })?,
        };

        Ok(Self {
            bind,
            page_size,
            cart_dir: non_empty(lookup("STOREFRONT_CART_DIR")).map(PathBuf::from),
            storage_quota,
            catalog_path: non_empty(lookup("STOREFRONT_CATALOG_PATH")).map(PathBuf::from),
            handoff_recipient: non_empty(lookup("STOREFRONT_WHATSAPP_NUMBER"))
                .unwrap_or_else(|| DEFAULT_HANDOFF_RECIPIENT.to_string()),
            log_json,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
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
    fn defaults_when_unset() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("STOREFRONT_BIND", "127.0.0.1:9000"),
            ("STOREFRONT_PAGE_SIZE", "24"),
            ("STOREFRONT_CART_DIR", "/tmp/carts"),
            ("STOREFRONT_LOG_JSON", "yes"),
            ("STOREFRONT_WHATSAPP_NUMBER", "5500000000000"),
        ])
        .unwrap();
        assert_eq!(cfg.bind.port(), 9000);
        assert_eq!(cfg.page_size, 24);
        assert_eq!(cfg.cart_dir, Some(PathBuf::from("/tmp/carts")));
        assert!(cfg.log_json);
        assert_eq!(cfg.handoff_recipient, "5500000000000");
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = config(&[("STOREFRONT_PAGE_SIZE", "0")]).unwrap_err();
        assert!(err.to_string().contains("STOREFRONT_PAGE_SIZE"));
    }
}
