// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evaluation configuration

use crate::eval::StatTrigger;
use crate::geometry::{SubdivBox, GLOBAL_BOX_SIZE};
use anyhow::{bail, Context, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "csg-cells.toml";

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Volume below which ambiguous boxes are no longer split
    pub min_volume: f64,
    /// Absolute tolerance of bounding box searches
    pub tolerance: f64,
    /// When composite nodes record statistics
    pub stat_trigger: StatTrigger,
    /// Edge length of the default search box
    pub global_box_size: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            min_volume: 1e-3,
            tolerance: 1e-2,
            stat_trigger: StatTrigger::Resolved,
            global_box_size: GLOBAL_BOX_SIZE,
        }
    }
}

impl EvalConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: EvalConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CSG_MIN_VOLUME`, `CSG_TOLERANCE` and `CSG_STAT_TRIGGER`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(min_volume) = lookup("CSG_MIN_VOLUME") {
            self.min_volume = min_volume
                .parse()
                .with_context(|| format!("Invalid CSG_MIN_VOLUME: {min_volume}"))?;
        }

        if let Some(tolerance) = lookup("CSG_TOLERANCE") {
            self.tolerance = tolerance
                .parse()
                .with_context(|| format!("Invalid CSG_TOLERANCE: {tolerance}"))?;
        }

        if let Some(trigger) = lookup("CSG_STAT_TRIGGER") {
            self.stat_trigger = trigger.parse().map_err(anyhow::Error::msg)?;
        }

        self.validate()
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_volume", self.min_volume),
            ("tolerance", self.tolerance),
            ("global_box_size", self.global_box_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{name} must be positive, got {value}");
            }
        }
        Ok(())
    }

    /// Axis-aligned cube of `global_box_size` centered at the origin
    pub fn global_box(&self) -> Result<SubdivBox> {
        let size = self.global_box_size;
        Ok(SubdivBox::axis_aligned(
            Point3::origin(),
            Vector3::new(size, size, size),
        )?)
    }
}
