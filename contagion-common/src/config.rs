use crate::sim_params::{Bounds, SimParams};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Configuration for the arena, centred on the origin
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig { width: 600.0, height: 600.0 }
    }
}

// Parameters for cell behavior and properties, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CellConfig {
    pub radius: f32,
    pub speed: f32,
    pub recovery_period: u32,
    // Defaults to 1% of the radius when absent
    pub bounce_cushion: Option<f32>,
}

impl Default for CellConfig {
    fn default() -> Self {
        CellConfig {
            radius: 10.0,
            speed: 3.0,
            recovery_period: 90,
            bounce_cushion: None,
        }
    }
}

// Initial population split, usually overridden from the command line
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InitialConditions {
    pub cell_count: i64,
    pub first_infected: i64,
    pub first_immune: i64,
    pub placement_seed: Option<u64>,
}

impl Default for InitialConditions {
    fn default() -> Self {
        InitialConditions {
            cell_count: 150,
            first_infected: 1,
            first_immune: 0,
            placement_seed: None,
        }
    }
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    // Safety cap on the number of ticks; None runs until no cell is infected
    pub max_ticks: Option<u32>,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_stats: bool,
    pub save_positions: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: String::from("contagion"),
            save_stats: true,
            save_positions: false,
            format: None,
        }
    }
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub arena: ArenaConfig,
    pub cells: CellConfig,
    pub initial_conditions: InitialConditions,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;

        Ok(config)
    }

    /// Parses and validates a configuration held in memory.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the physical parameters. The population split is checked when the model is built.
    pub fn validate(&self) -> Result<()> {
        if !(self.arena.width > 0.0 && self.arena.width.is_finite())
            || !(self.arena.height > 0.0 && self.arena.height.is_finite())
        {
            anyhow::bail!("arena width and height must be positive.");
        }
        if !(self.cells.radius > 0.0 && self.cells.radius.is_finite()) {
            anyhow::bail!("cell radius must be positive.");
        }
        if !(self.cells.speed >= 0.0 && self.cells.speed.is_finite()) {
            anyhow::bail!("cell speed must be 0 or higher.");
        }
        if let Some(cushion) = self.cells.bounce_cushion {
            if !(cushion >= 0.0 && cushion.is_finite()) {
                anyhow::bail!("bounce_cushion must be 0 or higher.");
            }
        }
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let radius = self.cells.radius;
        SimParams {
            bounds: Bounds::centered(self.arena.width, self.arena.height),
            cell_radius: radius,
            speed: self.cells.speed,
            recovery_period: self.cells.recovery_period,
            bounce_cushion: self.cells.bounce_cushion.unwrap_or(radius * 0.01),
        }
    }
}
