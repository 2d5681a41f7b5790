pub mod config;
pub mod error;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{ArenaConfig, CellConfig, InitialConditions, OutputConfig, SimulationConfig, TimingConfig};
pub use error::{ConfigError, MAX_POPULATION};
pub use sim_params::{Bounds, SimParams};
pub use snapshot::{series, Tally};
pub use vecmath::{angle_to_vec, Point};
