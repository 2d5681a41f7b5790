use crate::vecmath::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned arena extent, centred on the origin.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounds of a `width` x `height` arena centred on the origin.
    pub fn centered(width: f32, height: f32) -> Self {
        let max_x = width / 2.0;
        let max_y = height / 2.0;
        Bounds { min_x: -max_x, max_x, min_y: -max_y, max_y }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Simulation parameters derived from the configuration, used frequently during simulation steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // Arena
    pub bounds: Bounds,

    // Cell Properties
    pub cell_radius: f32, // Contact radius
    pub speed: f32,       // Distance travelled per tick
    pub recovery_period: u32, // Ticks spent infected before turning immune
    pub bounce_cushion: f32,  // Extra separation added on bounce
}

impl Default for SimParams {
    fn default() -> Self {
        crate::config::SimulationConfig::default().get_sim_params()
    }
}
