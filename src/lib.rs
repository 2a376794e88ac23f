pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod render;
pub mod rng;
pub mod rules;
pub mod universe;

use std::time::Instant;

use tracing::debug;

pub use cell::Cell;
pub use config::{Params, Seeding};
pub use error::{ConfigError, PatternError};
pub use rng::SplitMix64;
pub use universe::Universe;

/// Extra cells stamped on top of the initial fill, already flattened to row/col pairs.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    pub coords: Vec<i64>,
    pub row: i64,
    pub col: i64,
}

impl Overlay {
    /// Place a `rows` x `cols` shape so its center sits on the board's center.
    pub fn centered(coords: Vec<i64>, rows: usize, cols: usize, width: usize, height: usize) -> Self {
        Self {
            coords,
            row: (height as i64 - rows as i64) / 2,
            col: (width as i64 - cols as i64) / 2,
        }
    }
}

pub struct Simulation {
    /// Board as it stood before the first tick.
    pub initial: Universe,
    pub universe: Universe,
    /// Population at the start and after every frame.
    pub population: Vec<usize>,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Seed a board from `params`, stamp `overlay`, then run `generations` ticks in frames of
/// `params.ticks_per_frame`.
pub fn simulate(
    params: &Params,
    overlay: Option<&Overlay>,
    generations: usize,
) -> (Simulation, Vec<Timing>) {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Initial fill
    let t = Instant::now();
    let mut universe = Universe::from_params(params);
    timings.push(Timing {
        name: "seed",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Overlay pattern
    let t = Instant::now();
    if let Some(o) = overlay {
        let n = universe.cells_from_pattern(
            &o.coords,
            i64::MIN,
            i64::MAX,
            o.row,
            o.col,
            (o.coords.len() / 2) as i64,
        );
        debug!(cells = n, row = o.row, col = o.col, "overlay stamped");
    }
    timings.push(Timing {
        name: "stamp",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });
    let initial = universe.clone();

    // 3. Evolve
    let t = Instant::now();
    let per_frame = params.ticks_per_frame.max(1);
    let mut population = vec![universe.population()];
    let mut remaining = generations;
    while remaining > 0 {
        let n = per_frame.min(remaining);
        universe.tick_n(n);
        population.push(universe.population());
        remaining -= n;
    }
    timings.push(Timing {
        name: "evolve",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    timings.push(Timing {
        name: "TOTAL",
        ms: total_ms,
    });
    for t in &timings {
        debug!(stage = t.name, ms = t.ms, "timing");
    }

    let sim = Simulation {
        initial,
        universe,
        population,
    };

    (sim, timings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::BLINKER;

    #[test]
    fn test_simulate_frames() {
        let params = Params {
            width: 8,
            height: 8,
            seeding: Seeding::Empty,
            ticks_per_frame: 3,
            ..Params::default()
        };
        let overlay = Overlay::centered(BLINKER.coords(), 1, 3, 8, 8);
        let (sim, timings) = simulate(&params, Some(&overlay), 7);
        // 7 ticks in frames of 3, 3, 1.
        assert_eq!(sim.population, vec![3, 3, 3, 3]);
        assert_eq!(sim.universe.generation(), 7);
        assert_eq!(sim.initial.generation(), 0);
        assert!(sim.initial.is_alive(3, 2) && sim.initial.is_alive(3, 4));
        assert_eq!(timings.last().map(|t| t.name), Some("TOTAL"));
    }

    #[test]
    fn test_simulate_is_reproducible() {
        let params = Params {
            width: 24,
            height: 16,
            ..Params::default()
        };
        let (a, _) = simulate(&params, None, 10);
        let (b, _) = simulate(&params, None, 10);
        assert_eq!(a.universe.cells(), b.universe.cells());
        assert_eq!(a.population, b.population);
    }
}
