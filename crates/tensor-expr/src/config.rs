// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Evaluation configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! num_threads = 4
//! parallel_threshold = 65536
//! ```

use crate::ExprError;
use std::path::Path;

/// Default minimum destination size (in elements) for row-parallel evaluation.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 16;

/// Configuration for the element-wise evaluator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EvalConfig {
    /// Number of worker threads (defaults to number of online CPU cores).
    /// `Some(1)` forces sequential evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,
    /// Destinations smaller than this are always evaluated on the calling thread.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl EvalConfig {
    /// A configuration that never leaves the calling thread.
    pub fn sequential() -> Self {
        Self {
            num_threads: Some(1),
            ..Default::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ExprError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExprError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            threads = ?config.num_threads,
            threshold = config.parallel_threshold,
            "loaded eval config"
        );
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ExprError> {
        toml::from_str(toml_str)
            .map_err(|e| ExprError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ExprError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExprError::Config(format!("TOML serialise error: {e}")))
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
            .max(1)
    }

    /// Whether a destination of `elements` cells should be split across threads.
    pub fn should_parallelize(&self, elements: usize) -> bool {
        self.resolve_threads() > 1 && elements >= self.parallel_threshold
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}
