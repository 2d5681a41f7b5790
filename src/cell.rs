use contagion_common::{Bounds, Point, SimParams};
use serde::{Deserialize, Serialize};

/// Infection state of a single cell.
///
/// `Infected` carries the running exposure counter, starting at 1 on contraction
/// and growing by one per tick until recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sickness {
    #[default]
    Vulnerable,
    Infected(u32),
    Immune,
}

impl Sickness {
    /// Integer encoding used in exported data: 0 vulnerable, >= 1 infected, -1 immune.
    pub fn code(self) -> i64 {
        match self {
            Sickness::Vulnerable => 0,
            Sickness::Infected(ticks) => ticks as i64,
            Sickness::Immune => -1,
        }
    }
}

/// An individual subject in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    location: Point,
    direction: Point,
    sickness: Sickness,
}

impl Cell {
    /// A vulnerable cell at `location`, moving by `direction` each tick.
    pub fn new(location: Point, direction: Point) -> Self {
        Cell { location, direction, sickness: Sickness::Vulnerable }
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn direction(&self) -> Point {
        self.direction
    }

    pub fn sickness(&self) -> Sickness {
        self.sickness
    }

    /// Moves the cell one step and advances its illness.
    /// Recovery happens on the tick the counter passes the recovery period.
    pub fn tick(&mut self, params: &SimParams) {
        self.location = self.location.add(self.direction);
        if let Sickness::Infected(ticks) = self.sickness {
            let ticks = ticks.saturating_add(1);
            self.sickness = if ticks > params.recovery_period {
                Sickness::Immune
            } else {
                Sickness::Infected(ticks)
            };
        }
    }

    /// Display colour of the cell's state.
    pub fn color(&self) -> &'static str {
        match self.sickness {
            Sickness::Infected(_) => "red",
            Sickness::Immune => "blue",
            Sickness::Vulnerable => "gray",
        }
    }

    pub fn contract_disease(&mut self) {
        self.sickness = Sickness::Infected(1);
    }

    pub fn immunize(&mut self) {
        self.sickness = Sickness::Immune;
    }

    pub fn is_vulnerable(&self) -> bool {
        self.sickness == Sickness::Vulnerable
    }

    pub fn is_infected(&self) -> bool {
        matches!(self.sickness, Sickness::Infected(_))
    }

    pub fn is_immune(&self) -> bool {
        self.sickness == Sickness::Immune
    }

    /// Transfers infection in either direction between two touching cells.
    /// Both rules read the states as they were before the call.
    pub fn contact_with(&mut self, other: &mut Cell) {
        let self_infected = self.is_infected();
        let other_infected = other.is_infected();
        if other_infected && self.is_vulnerable() {
            self.contract_disease();
        }
        if self_infected && other.is_vulnerable() {
            other.contract_disease();
        }
    }

    /// Pushes the cell back the way it came after touching another cell `distance` away.
    ///
    /// Only acts when `0 < distance < cell_radius`: coincident cells are left where they are.
    pub fn bounce(&mut self, distance: f32, params: &SimParams) {
        if distance > 0.0 && distance < params.cell_radius {
            let displacement = params.cell_radius - distance;
            let reversed = -self.direction;
            let cushion = Point::new(params.bounce_cushion, params.bounce_cushion);
            self.location = self.location + reversed * displacement + cushion;
            self.direction = reversed;
        }
    }

    pub fn reflect_x(&mut self) {
        self.direction.x = -self.direction.x;
    }

    pub fn reflect_y(&mut self) {
        self.direction.y = -self.direction.y;
    }

    /// Pulls the cell back inside `bounds`, reflecting the velocity on each axis it crossed.
    pub fn clamp_to(&mut self, bounds: &Bounds) {
        if self.location.x > bounds.max_x {
            self.location.x = bounds.max_x;
            self.reflect_x();
        }
        if self.location.y > bounds.max_y {
            self.location.y = bounds.max_y;
            self.reflect_y();
        }
        if self.location.x < bounds.min_x {
            self.location.x = bounds.min_x;
            self.reflect_x();
        }
        if self.location.y < bounds.min_y {
            self.location.y = bounds.min_y;
            self.reflect_y();
        }
    }
}
