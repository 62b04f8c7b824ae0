// src/config.rs

//! Defines the configuration structures for the recomputation engine.
//!
//! This module provides a set of structs that can be deserialized from a
//! configuration file (e.g., JSON, TOML) to customize the sampling grids and
//! the surface axis selection. Default values match the sizes the bundled
//! demo sessions were produced with.

// Serde is used for deserializing the configuration from a file.
// `Serialize` is also derived for convenience, allowing the effective
// configuration to be exported if needed.
use serde::{Deserialize, Serialize};

use anyhow::{ensure, Result};

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration for one engine session.
///
/// This struct is the root of the configuration and is intended to be
/// deserialized from a configuration file. It groups settings into the two
/// sampling concerns: the per-feature curve grid and the surface mesh.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)] // Apply default values for the entire struct if a field is missing.
pub struct EngineConfig {
    /// Curve sampling settings.
    pub curve: CurveGridConfig,
    /// Surface sampling and axis settings.
    pub surface: SurfaceGridConfig,
}

impl EngineConfig {
    /// Checks the grid sizes before a session is assembled around them.
    ///
    /// Each grid is generated as evenly spaced samples over `[0, 1]`
    /// including both endpoints, which needs at least two samples per axis.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.curve.samples >= 2,
            "curve grid needs at least 2 samples, got {}",
            self.curve.samples
        );
        ensure!(
            self.surface.columns >= 2 && self.surface.rows >= 2,
            "surface mesh needs at least 2x2 samples, got {}x{}",
            self.surface.columns,
            self.surface.rows
        );
        Ok(())
    }
}

// --- Curve Grid Configuration ---

/// Defines the shared x-sample grid every profile curve is evaluated on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveGridConfig {
    /// Number of evenly spaced samples over the normalized `[0, 1]` range.
    pub samples: usize,
}

impl Default for CurveGridConfig {
    fn default() -> Self {
        CurveGridConfig { samples: 64 }
    }
}

// --- Surface Grid Configuration ---

/// Defines the surface mesh and which two features span it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceGridConfig {
    /// Mesh columns (samples along the x axis).
    pub columns: usize,
    /// Mesh rows (samples along the y axis).
    pub rows: usize,
    /// Feature spanning the surface x axis, by name.
    /// If `None`, the session's first feature is used.
    pub axis_x: Option<String>,
    /// Feature spanning the surface y axis, by name.
    /// If `None`, the session's second feature is used.
    pub axis_y: Option<String>,
}

impl Default for SurfaceGridConfig {
    fn default() -> Self {
        SurfaceGridConfig {
            columns: 25,
            rows: 25,
            axis_x: None,
            axis_y: None,
        }
    }
}
