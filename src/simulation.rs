use crate::cell::Cell;
use anyhow::Result;
use contagion_common::{angle_to_vec, ConfigError, Point, SimParams, SimulationConfig, Tally};
use log::{debug, info, trace};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of a run, computed from the recorded tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u32,
    pub completed: bool,
    pub peak_infected: u32,
    pub peak_tick: u32,
    pub final_immune: u32,
    pub final_vulnerable: u32,
}

/// The state of the simulation: a fixed population and a tick counter.
pub struct Model {
    /// The cells, vulnerable first, then the initially infected, then the initially immune.
    pub population: Vec<Cell>,
    /// Number of ticks run so far.
    pub time: u32,
    params: SimParams,
    /// Counts recorded by `record_tally`, one per call.
    recorded_tallies: Vec<Tally>,
}

impl Model {
    /// Builds a population of `cells` cells with random placement and headings.
    ///
    /// Fails before creating any cell if the split is invalid: at least one infected cell,
    /// no negative immune count, and at least one cell left vulnerable.
    pub fn new<R: Rng>(
        params: SimParams,
        cells: i64,
        first_infected: i64,
        first_immune: i64,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        ConfigError::check_population(cells, first_infected, first_immune)?;

        let mut population = Vec::new();
        for _ in 0..(cells - first_infected - first_immune) {
            population.push(random_cell(&params, rng));
        }
        for _ in 0..first_infected {
            let mut cell = random_cell(&params, rng);
            cell.contract_disease();
            population.push(cell);
        }
        for _ in 0..first_immune {
            let mut cell = random_cell(&params, rng);
            cell.immunize();
            population.push(cell);
        }

        Ok(Self::from_cells(params, population))
    }

    /// Builds the model from the configuration, seeding placement from
    /// `placement_seed` (or a fresh random seed, which is logged).
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let ic = &config.initial_conditions;
        let seed = ic.placement_seed.unwrap_or_else(rand::random);
        info!("Placement seed: {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let model = Self::new(
            config.get_sim_params(),
            ic.cell_count,
            ic.first_infected,
            ic.first_immune,
            &mut rng,
        )?;
        Ok(model)
    }

    /// Wraps an already placed population, e.g. a hand-built scenario.
    pub fn from_cells(params: SimParams, population: Vec<Cell>) -> Self {
        Self {
            population,
            time: 0,
            params,
            recorded_tallies: Vec::new(),
        }
    }

    /// Advances the simulation by one tick: move, keep in bounds, spread infection, separate.
    pub fn tick(&mut self) {
        self.time += 1;
        for cell in self.population.iter_mut() {
            cell.tick(&self.params);
            cell.clamp_to(&self.params.bounds);
        }
        self.check_contacts();
        self.bounce();
        trace!("Tick {} done", self.time);
    }

    /// Transfers infection across every ordered pair of touching cells.
    pub fn check_contacts(&mut self) {
        let n = self.population.len();
        let radius = self.params.cell_radius;
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let distance = self.population[j].location().distance(self.population[i].location());
                if distance < radius {
                    let (receiver, other) = pair_mut(&mut self.population, j, i);
                    receiver.contact_with(other);
                }
            }
        }
    }

    /// Bounces the second cell of every ordered pair of touching cells.
    ///
    /// Distances are measured when the pair is visited, so an earlier bounce in the
    /// same pass can move a pair out of range.
    pub fn bounce(&mut self) {
        let n = self.population.len();
        let radius = self.params.cell_radius;
        for i in 0..n {
            let anchor = self.population[i].location();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let distance = self.population[j].location().distance(anchor);
                if distance < radius {
                    self.population[j].bounce(distance, &self.params);
                }
            }
        }
    }

    /// True once no cell is infected. Stays true from then on.
    pub fn is_complete(&self) -> bool {
        self.population.iter().all(|c| c.is_vulnerable() || c.is_immune())
    }

    /// Counts the population's states at the current tick.
    pub fn tally(&self) -> Tally {
        let mut tally = Tally { tick: self.time, infected: 0, immune: 0, vulnerable: 0 };
        for cell in &self.population {
            if cell.is_infected() {
                tally.infected += 1;
            } else if cell.is_immune() {
                tally.immune += 1;
            } else {
                tally.vulnerable += 1;
            }
        }
        tally
    }

    /// Records the current counts.
    pub fn record_tally(&mut self) -> Tally {
        let tally = self.tally();
        debug!(
            "Tick {}: infected={} immune={} vulnerable={}",
            tally.tick, tally.infected, tally.immune, tally.vulnerable
        );
        self.recorded_tallies.push(tally);
        tally
    }

    /// Summarises the recorded run.
    pub fn summary(&self) -> RunSummary {
        let current = self.tally();
        let (peak_tick, peak_infected) = self
            .recorded_tallies
            .iter()
            .fold((0, 0), |best, t| if t.infected > best.1 { (t.tick, t.infected) } else { best });
        RunSummary {
            ticks: self.time,
            completed: self.is_complete(),
            peak_infected,
            peak_tick,
            final_immune: current.immune,
            final_vulnerable: current.vulnerable,
        }
    }

    /// Provides access to the recorded tallies.
    pub fn get_recorded_tallies(&self) -> &[Tally] {
        &self.recorded_tallies
    }

    /// Provides access to the simulation parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Final positions, display colours and sickness codes, for export.
    pub fn get_results(&self) -> Vec<(f32, f32, &'static str, i64)> {
        self.population
            .iter()
            .map(|c| (c.location().x, c.location().y, c.color(), c.sickness().code()))
            .collect()
    }
}

/// A vulnerable cell at a uniformly random spot in the arena, heading in a uniformly random direction.
fn random_cell<R: Rng>(params: &SimParams, rng: &mut R) -> Cell {
    let b = &params.bounds;
    let location = Point::new(
        rng.random::<f32>() * b.width() + b.min_x,
        rng.random::<f32>() * b.height() + b.min_y,
    );
    let angle = rng.random::<f32>() * 2.0 * std::f32::consts::PI;
    Cell::new(location, angle_to_vec(angle).scale(params.speed))
}

/// Mutable references to two distinct elements.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert!(a != b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Sickness;
    use contagion_common::Bounds;
    use proptest::prelude::*;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn still(x: f32, y: f32) -> Cell {
        Cell::new(Point::new(x, y), Point::zero())
    }

    /// Ticks until no cell is infected or `cap` ticks have run, recording every tick.
    fn run_to_completion(model: &mut Model, cap: Option<u32>) -> bool {
        while !model.is_complete() {
            if cap.is_some_and(|c| model.time >= c) {
                return false;
            }
            model.tick();
            model.record_tally();
        }
        true
    }

    fn infected(x: f32, y: f32) -> Cell {
        let mut c = still(x, y);
        c.contract_disease();
        c
    }

    #[test]
    fn test_construction_counts() {
        let model = Model::new(SimParams::default(), 20, 3, 5, &mut seeded(1)).unwrap();
        assert_eq!(model.population.len(), 20);
        assert_eq!(model.time, 0);
        let t = model.tally();
        assert_eq!((t.infected, t.immune, t.vulnerable), (3, 5, 12));
        // Vulnerable first, then infected, then immune.
        assert!(model.population[..12].iter().all(Cell::is_vulnerable));
        assert!(model.population[12..15].iter().all(Cell::is_infected));
        assert!(model.population[15..].iter().all(Cell::is_immune));
    }

    #[test]
    fn test_construction_places_cells_inside_arena_at_speed() {
        let params = SimParams::default();
        let model = Model::new(params.clone(), 200, 1, 0, &mut seeded(7)).unwrap();
        for cell in &model.population {
            assert!(params.bounds.contains(cell.location()));
            assert!((cell.direction().length() - params.speed).abs() < 1e-4);
        }
    }

    #[test]
    fn test_infected_equal_to_total_fails() {
        let params = SimParams { speed: 1.0, ..SimParams::default() };
        let err = Model::new(params, 5, 5, 0, &mut seeded(0)).err();
        assert_eq!(err, Some(ConfigError::InfectedExceedsPopulation { cells: 5, infected: 5 }));
    }

    #[test]
    fn test_huge_population_fails_before_allocating() {
        let err = Model::new(SimParams::default(), i64::MAX, 1, 0, &mut seeded(0)).err();
        assert!(matches!(err, Some(ConfigError::PopulationTooLarge { .. })));
    }

    #[test]
    fn test_stationary_overlap_spreads_on_first_tick() {
        let params = SimParams { speed: 0.0, ..SimParams::default() };
        let cells = vec![still(0.0, 0.0), still(-200.0, -200.0), still(200.0, 200.0), infected(5.0, 0.0)];
        let mut model = Model::from_cells(params, cells);
        model.tick();
        let t = model.tally();
        assert_eq!(t.tick, 1);
        assert_eq!((t.infected, t.immune), (2, 0));
        assert!(model.population[0].is_infected());
        assert!(model.population[1].is_vulnerable());
    }

    #[test]
    fn test_cell_past_max_x_is_clamped_and_reflected() {
        let params = SimParams::default();
        let max_x = params.bounds.max_x;
        let mut model = Model::from_cells(params, vec![still(max_x + 1.0, 0.0)]);
        model.tick();
        let cell = &model.population[0];
        assert_eq!(cell.location().x, max_x);
        assert!(cell.direction().x.is_sign_negative());
        assert_eq!(cell.location().y, 0.0);
    }

    #[test]
    fn test_moving_cell_bounces_off_min_y() {
        let params = SimParams::default();
        let min_y = params.bounds.min_y;
        let mut model = Model::from_cells(params, vec![Cell::new(Point::new(0.0, min_y + 1.0), Point::new(1.0, -3.0))]);
        model.tick();
        let cell = &model.population[0];
        assert_eq!(cell.location().y, min_y);
        assert_eq!(cell.direction(), Point::new(1.0, 3.0));
    }

    #[test]
    fn test_coincident_cells_never_separate() {
        let params = SimParams { speed: 0.0, ..SimParams::default() };
        let mut model = Model::from_cells(params, vec![infected(0.0, 0.0), still(0.0, 0.0)]);
        for _ in 0..10 {
            model.tick();
            let d = model.population[0].location().distance(model.population[1].location());
            assert_eq!(d, 0.0);
        }
        assert!(model.population[1].is_infected());
    }

    #[test]
    fn test_close_pair_is_pushed_apart() {
        let params = SimParams::default();
        let cells = vec![
            Cell::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0)),
            Cell::new(Point::new(8.0, 0.0), Point::new(-1.0, 0.0)),
        ];
        let mut model = Model::from_cells(params, cells);
        model.tick();
        let a = &model.population[0];
        let b = &model.population[1];
        // The first visit pushes b clear of a, so the reverse visit finds them apart.
        assert_eq!(b.direction(), Point::new(1.0, -0.0));
        assert_eq!(a.direction(), Point::new(1.0, 0.0));
        assert!(a.location().distance(b.location()) >= SimParams::default().cell_radius);
    }

    #[test]
    fn test_complete_when_nobody_infected() {
        let params = SimParams::default();
        let mut immune = still(0.0, 0.0);
        immune.immunize();
        let model = Model::from_cells(params.clone(), vec![still(50.0, 50.0), immune]);
        assert!(model.is_complete());

        let model = Model::from_cells(params, vec![still(50.0, 50.0), infected(-50.0, -50.0)]);
        assert!(!model.is_complete());
    }

    #[test]
    fn test_isolated_infection_recovers_after_recovery_period() {
        let params = SimParams { speed: 0.0, recovery_period: 5, ..SimParams::default() };
        let mut model = Model::from_cells(params, vec![infected(0.0, 0.0), still(200.0, 200.0)]);
        assert!(run_to_completion(&mut model, None));
        assert_eq!(model.time, 5);
        assert_eq!(model.get_recorded_tallies().len(), 5);
        let summary = model.summary();
        assert!(summary.completed);
        assert_eq!(summary.final_immune, 1);
        assert_eq!(summary.final_vulnerable, 1);
        assert_eq!(summary.peak_infected, 1);
        assert_eq!(summary.peak_tick, 1);
    }

    #[test]
    fn test_run_respects_tick_cap() {
        let params = SimParams { speed: 0.0, ..SimParams::default() };
        let mut model = Model::from_cells(params, vec![infected(0.0, 0.0), still(200.0, 200.0)]);
        assert!(!run_to_completion(&mut model, Some(10)));
        assert_eq!(model.time, 10);
        assert!(!model.summary().completed);
    }

    #[test]
    fn test_default_run_terminates() {
        let config = SimulationConfig {
            initial_conditions: contagion_common::InitialConditions {
                cell_count: 60,
                first_infected: 3,
                first_immune: 2,
                placement_seed: Some(42),
            },
            ..SimulationConfig::default()
        };
        let mut model = Model::from_config(&config).unwrap();
        assert!(run_to_completion(&mut model, Some(100_000)));
        let last = *model.get_recorded_tallies().last().unwrap();
        assert_eq!(last.infected, 0);
        assert_eq!(last.total(), 60);
        assert!(last.immune >= 5);
    }

    #[test]
    fn test_from_config_is_reproducible() {
        let mut config = SimulationConfig::default();
        config.initial_conditions.placement_seed = Some(9);
        let a = Model::from_config(&config).unwrap();
        let b = Model::from_config(&config).unwrap();
        assert_eq!(a.population, b.population);
    }

    #[test]
    fn test_pair_mut_returns_requested_order() {
        let mut v = vec![1, 2, 3, 4];
        let (a, b) = pair_mut(&mut v, 3, 1);
        assert_eq!((*a, *b), (4, 2));
        let (a, b) = pair_mut(&mut v, 0, 2);
        assert_eq!((*a, *b), (1, 3));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_invalid_splits_are_rejected(cells in -3i64..40, infected in -3i64..40, immune in -3i64..40) {
            let result = Model::new(SimParams::default(), cells, infected, immune, &mut seeded(3));
            let valid = infected > 0 && immune >= 0 && infected < cells && immune < cells && infected + immune < cells;
            prop_assert_eq!(result.is_ok(), valid);
            if let Ok(model) = result {
                let t = model.tally();
                prop_assert_eq!(model.population.len() as i64, cells);
                prop_assert_eq!(t.infected as i64, infected);
                prop_assert_eq!(t.immune as i64, immune);
            }
        }

        #[test]
        fn test_states_stay_exclusive_and_forward_only(seed in any::<u64>()) {
            let params = SimParams {
                bounds: Bounds::centered(120.0, 120.0),
                recovery_period: 15,
                ..SimParams::default()
            };
            let mut model = Model::new(params, 30, 2, 1, &mut seeded(seed)).unwrap();
            let mut previous: Vec<Sickness> = model.population.iter().map(|c| c.sickness()).collect();
            for _ in 0..60 {
                model.tick();
                for (cell, before) in model.population.iter().zip(previous.iter()) {
                    let states = [cell.is_vulnerable(), cell.is_infected(), cell.is_immune()];
                    prop_assert_eq!(states.iter().filter(|&&s| s).count(), 1);
                    match (before, cell.sickness()) {
                        (Sickness::Immune, now) => {
                            prop_assert_eq!(now, Sickness::Immune);
                        }
                        (Sickness::Infected(_), Sickness::Vulnerable) => {
                            prop_assert!(false, "infected cell became vulnerable");
                        }
                        (Sickness::Infected(a), Sickness::Infected(b)) => {
                            prop_assert!(b >= *a);
                        }
                        _ => {}
                    }
                }
                previous = model.population.iter().map(|c| c.sickness()).collect();
            }
        }

        #[test]
        fn test_completion_is_a_fixed_point(seed in any::<u64>()) {
            let params = SimParams { recovery_period: 10, ..SimParams::default() };
            let mut model = Model::new(params, 25, 1, 0, &mut seeded(seed)).unwrap();
            prop_assert!(run_to_completion(&mut model, Some(50_000)));
            let settled = model.tally();
            for _ in 0..30 {
                model.tick();
                prop_assert!(model.is_complete());
            }
            let later = model.tally();
            prop_assert_eq!((later.infected, later.immune, later.vulnerable), (settled.infected, settled.immune, settled.vulnerable));
        }
    }
}
