//! Host sizing hints
//!
//! `hostRequirements` tells a launcher how big a machine the dev container
//! expects. Memory and storage are strings with an optional unit suffix
//! (`"4gb"`, `"512mb"`, `"1073741824"`). They are stored as written; the
//! helpers below turn them into byte counts on demand.

use crate::errors::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*([a-zA-Z]*)$").expect("size pattern is a valid regex")
});

/// Host hardware requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostRequirements {
    /// Number of required CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<u64>,

    /// Amount of required RAM. Supports units tb, gb, mb and kb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    /// Amount of required disk space. Supports units tb, gb, mb and kb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl HostRequirements {
    /// True when no requirement is set.
    pub fn is_empty(&self) -> bool {
        self.cpus.is_none() && self.memory.is_none() && self.storage.is_none()
    }

    pub fn memory_bytes(&self) -> Result<Option<u64>, ConfigError> {
        self.memory.as_deref().map(parse_size).transpose()
    }

    pub fn storage_bytes(&self) -> Result<Option<u64>, ConfigError> {
        self.storage.as_deref().map(parse_size).transpose()
    }
}

/// Parse a size string into bytes.
///
/// Units are case-insensitive and 1024-based; a missing unit (or `b`) means
/// bytes. Fractional amounts are allowed and truncated after scaling.
///
/// ```
/// use devmanifest_core::host_requirements::parse_size;
///
/// assert_eq!(parse_size("4gb").unwrap(), 4 * 1024 * 1024 * 1024);
/// assert_eq!(parse_size("1.5 KB").unwrap(), 1536);
/// assert!(parse_size("lots").is_err());
/// ```
pub fn parse_size(input: &str) -> Result<u64, ConfigError> {
    let trimmed = input.trim();
    let captures = SIZE_PATTERN
        .captures(trimmed)
        .ok_or_else(|| ConfigError::Validation {
            message: format!("Invalid size specification '{}'", input),
        })?;

    let number: f64 = captures[1].parse().map_err(|e| ConfigError::Validation {
        message: format!("Invalid number in size specification '{}': {}", input, e),
    })?;

    let multiplier: u64 = match captures[2].to_lowercase().as_str() {
        "" | "b" => 1,
        "kb" => 1 << 10,
        "mb" => 1 << 20,
        "gb" => 1 << 30,
        "tb" => 1 << 40,
        unit => {
            return Err(ConfigError::Validation {
                message: format!("Unknown unit '{}' in size specification '{}'", unit, input),
            })
        }
    };

    let bytes = number * multiplier as f64;
    if bytes > u64::MAX as f64 {
        return Err(ConfigError::Validation {
            message: format!("Size specification '{}' is too large", input),
        });
    }
    Ok(bytes as u64)
}
