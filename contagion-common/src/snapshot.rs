use serde::{Deserialize, Serialize};

/// Population counts recorded after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// The tick after which the counts were taken.
    pub tick: u32,
    /// Cells currently infected.
    pub infected: u32,
    /// Cells that have recovered.
    pub immune: u32,
    /// Cells that have never been infected.
    pub vulnerable: u32,
}

impl Tally {
    pub fn total(&self) -> u32 {
        self.infected + self.immune + self.vulnerable
    }
}

/// Splits a run into the three parallel series (tick, infected, immune) handed to the chart.
pub fn series(tallies: &[Tally]) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
    let ticks = tallies.iter().map(|t| t.tick).collect();
    let infected = tallies.iter().map(|t| t.infected).collect();
    let immune = tallies.iter().map(|t| t.immune).collect();
    (ticks, infected, immune)
}
