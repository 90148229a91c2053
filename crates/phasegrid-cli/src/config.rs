use crate::error::{CliError, Result};
use phasegrid::core::grid::FieldMode;
use phasegrid::core::models::cell::Axis;
use phasegrid::engine::config::{AccumulatorConfig, MemoryPolicy};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub grid: FileGridConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGridConfig {
    /// Ordered axis selection, e.g. "x", "xz", or "xyz".
    pub axes: String,

    #[serde(default)]
    pub nbins: Option<Vec<usize>>,

    #[serde(default)]
    pub spacing: Option<Vec<f64>>,

    /// Kernel bandwidth per selected axis.
    pub bandwidth: Vec<f64>,

    #[serde(default = "default_kernel")]
    pub kernel: String,

    #[serde(default)]
    pub fractional: bool,

    #[serde(default)]
    pub unnormalized: bool,

    #[serde(default)]
    pub memory: MemoryPolicy,

    #[serde(default)]
    pub mode: FieldMode,

    #[serde(default = "default_stride")]
    pub stride: u64,

    /// Index (0-based) of the atom whose position is the grid origin.
    #[serde(default)]
    pub origin_atom: usize,

    #[serde(default)]
    pub confine: Vec<FileConfinement>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfinement {
    pub axis: Axis,
    pub lower: f64,
    pub upper: f64,
}

fn default_kernel() -> String {
    "gaussian".to_string()
}

fn default_stride() -> u64 {
    1
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let config: FileConfig = toml::from_str(&text).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        debug!("Loaded grid configuration: {:?}", config);
        Ok(config)
    }

    pub fn to_engine_config(&self) -> Result<AccumulatorConfig> {
        let grid = &self.grid;
        let mut builder = AccumulatorConfig::builder()
            .axis_selection(&grid.axes)?
            .bandwidth(grid.bandwidth.clone())
            .kernel(grid.kernel.clone())
            .fractional(grid.fractional)
            .unnormalized(grid.unnormalized)
            .memory(grid.memory)
            .mode(grid.mode)
            .stride(grid.stride);
        if let Some(nbins) = &grid.nbins {
            builder = builder.nbins(nbins.clone());
        }
        if let Some(spacing) = &grid.spacing {
            builder = builder.spacing(spacing.clone());
        }
        for confinement in &grid.confine {
            builder = builder.confine(confinement.axis, confinement.lower, confinement.upper);
        }
        Ok(builder.build()?)
    }
}
