//! Endpoint configuration.
//!
//! The request builder concatenates path segments verbatim, so the pieces
//! have to agree on where slashes go. [`ClientConfig::normalized`] settles
//! that once: the base URL carries a scheme and no trailing slash, and each
//! resource path is exactly one leading slash followed by its name.

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.activeto.mollyzhang.dev";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub category_path: String,
    pub type_path: String,
    pub activity_path: String,
    pub facility_path: String,
    /// Passed through to the map renderer; the core never reads it.
    pub map_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            category_path: "/categories".to_string(),
            type_path: "/types".to_string(),
            activity_path: "/activities".to_string(),
            facility_path: "/facilities".to_string(),
            map_key: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
        .normalized()
    }

    /// Reads `ACTIVETO_BASE_URL`, `ACTIVETO_CATEGORY_PATH`,
    /// `ACTIVETO_TYPE_PATH`, `ACTIVETO_ACTIVITY_PATH`,
    /// `ACTIVETO_FACILITY_PATH` and `GOOGLE_MAP_KEY`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup("ACTIVETO_BASE_URL").unwrap_or(defaults.base_url),
            category_path: lookup("ACTIVETO_CATEGORY_PATH").unwrap_or(defaults.category_path),
            type_path: lookup("ACTIVETO_TYPE_PATH").unwrap_or(defaults.type_path),
            activity_path: lookup("ACTIVETO_ACTIVITY_PATH").unwrap_or(defaults.activity_path),
            facility_path: lookup("ACTIVETO_FACILITY_PATH").unwrap_or(defaults.facility_path),
            map_key: lookup("GOOGLE_MAP_KEY").filter(|k| !k.is_empty()),
        }
        .normalized()
    }

    pub fn normalized(self) -> Self {
        Self {
            base_url: normalize_base(&self.base_url),
            category_path: normalize_path(&self.category_path),
            type_path: normalize_path(&self.type_path),
            activity_path: normalize_path(&self.activity_path),
            facility_path: normalize_path(&self.facility_path),
            map_key: self.map_key,
        }
    }
}

fn normalize_base(base: &str) -> String {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_matches('/'))
}
