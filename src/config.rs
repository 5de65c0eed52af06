//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cast::grid::DEFAULT_CAST_COUNT;
use crate::error::{CastError, CastResult};

/// Settings for the cast editor.
///
/// Every field has a default, so `{}` is a valid config file.
///
/// | Env Var                        | Field                |
/// |--------------------------------|----------------------|
/// | `CASTBOARD_DEFAULT_CAST_COUNT` | `default_cast_count` |
/// | `CASTBOARD_ROUTE_BASE`         | `route_base`         |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Sub-casts for new casts and casts stored without a count.
    pub default_cast_count: u32,

    /// Path prefix of the cast editor URL (`<route_base>/<cast uuid>`).
    pub route_base: String,

    /// Name given to casts created with "add cast".
    pub new_cast_name: String,

    /// Carry dancer absences into the grid when casting for a performance.
    pub check_unavailabilities: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_cast_count: DEFAULT_CAST_COUNT,
            route_base: "cast".to_string(),
            new_cast_name: "New Cast".to_string(),
            check_unavailabilities: false,
        }
    }
}

impl EditorConfig {
    /// Parses a JSON config.
    pub fn from_json_str(json: &str) -> CastResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Reads a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> CastResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CastError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Applies `CASTBOARD_*` environment overrides.
    pub fn apply_env(self) -> CastResult<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> CastResult<Self> {
        if let Some(count) = var("CASTBOARD_DEFAULT_CAST_COUNT") {
            self.default_cast_count = count.trim().parse().map_err(|_| {
                CastError::config(format!(
                    "CASTBOARD_DEFAULT_CAST_COUNT must be a positive integer, got {count:?}"
                ))
            })?;
        }
        if let Some(base) = var("CASTBOARD_ROUTE_BASE") {
            self.route_base = base;
        }
        self.validate()
    }

    fn validate(self) -> CastResult<Self> {
        if self.default_cast_count == 0 {
            return Err(CastError::config("default_cast_count must be at least 1"));
        }
        Ok(self)
    }
}
