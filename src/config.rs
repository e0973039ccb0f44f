//! Allocator configuration
//!
//! The size classes are fixed once an allocator is built, so all checks
//! happen here, before any class state exists.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Size classes used when nothing else is configured
pub const DEFAULT_SIZES: [usize; 4] = [16, 32, 64, 128];

/// Allocator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Block sizes, one class each, in report order
    pub sizes: Vec<usize>,
    /// Upper bound on blocks minted per class (unbounded when `None`)
    pub max_blocks_per_class: Option<u64>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            max_blocks_per_class: None,
        }
    }
}

impl AllocatorConfig {
    /// Configuration for the given sizes with no capacity limit
    pub fn with_sizes(sizes: &[usize]) -> Self {
        Self {
            sizes: sizes.to_vec(),
            max_blocks_per_class: None,
        }
    }

    /// Set the per-class capacity
    pub fn max_blocks_per_class(mut self, limit: u64) -> Self {
        self.max_blocks_per_class = Some(limit);
        self
    }

    /// Default configuration overlaid with `QUICKFIT_SIZES` and
    /// `QUICKFIT_MAX_BLOCKS`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(sizes) = std::env::var("QUICKFIT_SIZES") {
            config.sizes = parse_sizes(&sizes)?;
        }

        if let Ok(limit) = std::env::var("QUICKFIT_MAX_BLOCKS") {
            let limit = limit.trim().parse().map_err(|e| {
                Error::InvalidConfig(format!("QUICKFIT_MAX_BLOCKS={:?}: {}", limit, e))
            })?;
            config.max_blocks_per_class = Some(limit);
        }

        Ok(config)
    }

    /// Reject empty, zero or duplicate sizes and a zero capacity
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one size class is required".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for &size in &self.sizes {
            if size == 0 {
                return Err(Error::InvalidConfig(
                    "size classes must be positive".to_string(),
                ));
            }
            if !seen.insert(size) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate size class {}",
                    size
                )));
            }
        }

        if self.max_blocks_per_class == Some(0) {
            return Err(Error::InvalidConfig(
                "max_blocks_per_class must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a comma separated size list such as `"16,32,64"`
pub fn parse_sizes(input: &str) -> Result<Vec<usize>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|e| Error::InvalidConfig(format!("invalid size {:?}: {}", s, e)))
        })
        .collect()
}
