//! Parallel field solver
//!
//! Fans one kernel task per coil out over a rayon pool. Each worker folds its coils
//! into a private partial field; the partials are then summed on the calling thread,
//! so the accumulator is never shared between threads.

use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use tracing::debug;

use crate::coil::Coil;
use crate::error::{FieldError, Result};
use crate::field::{biot_savart, Field};
use crate::grid::{Grid, GridRange};

/// Worker pool configuration
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Worker count; `None` uses the global pool sized to available parallelism
    pub threads: Option<usize>,
}

/// One solve result: the grid and the field sampled on it
#[derive(Debug, Clone)]
pub struct Solution {
    pub grid: Arc<Grid>,
    pub field: Field,
}

impl Solution {
    /// |B| at the middle sample of the grid
    pub fn center_magnitude(&self) -> f64 {
        let [i, j, k] = self.grid.center_index();
        self.field
            .at(i, j, k)
            .map(|b| (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt())
            .unwrap_or(0.0)
    }
}

struct CachedGrid {
    range: GridRange,
    resolution: usize,
    grid: Arc<Grid>,
}

/// Stateless across solves apart from reusing the last grid when its
/// parameters repeat.
pub struct Solver {
    pool: Option<rayon::ThreadPool>,
    cache: Mutex<Option<CachedGrid>>,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            pool: None,
            cache: Mutex::new(None),
        }
    }
}

impl Solver {
    pub fn new(config: &SolverConfig) -> Result<Self> {
        let pool = match config.threads {
            Some(threads) => Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };
        Ok(Self {
            pool,
            cache: Mutex::new(None),
        })
    }

    /// Grid for `range` at `resolution`, shared with earlier calls when unchanged
    pub fn grid(&self, range: &GridRange, resolution: usize) -> Result<Arc<Grid>> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(cached) = cache.as_ref() {
            if cached.range == *range && cached.resolution == resolution {
                return Ok(Arc::clone(&cached.grid));
            }
        }

        let grid = Arc::new(Grid::build(range, resolution)?);
        *cache = Some(CachedGrid {
            range: *range,
            resolution,
            grid: Arc::clone(&grid),
        });
        Ok(grid)
    }

    /// Total field of `coils` over a `resolution`³ grid spanning `range`.
    ///
    /// Blocks until every per-coil task has finished.
    pub fn solve(&self, coils: &[Coil], range: &GridRange, resolution: usize) -> Result<Solution> {
        if coils.is_empty() {
            return Err(FieldError::NoCoils);
        }

        let grid = self.grid(range, resolution)?;
        debug!(
            "Solving {} coil(s) on {:?} grid ({} samples)",
            coils.len(),
            grid.shape(),
            grid.len()
        );

        let field = match &self.pool {
            Some(pool) => pool.install(|| superpose(coils, &grid)),
            None => superpose(coils, &grid),
        };

        Ok(Solution { grid, field })
    }
}

/// Sum of every coil's kernel output on `grid`
fn superpose(coils: &[Coil], grid: &Grid) -> Field {
    let shape = grid.shape();

    let partials: Vec<Field> = coils
        .par_iter()
        .fold(
            || Field::zeros(shape),
            |mut acc, coil| {
                acc.add_samples(&biot_savart(coil, grid));
                acc
            },
        )
        .collect();

    debug!("Reducing {} partial field(s)", partials.len());

    let mut total = Field::zeros(shape);
    for partial in &partials {
        total.add_samples(partial);
    }
    total
}

/// Solve on the global pool without grid reuse
pub fn solve(coils: &[Coil], range: &GridRange, resolution: usize) -> Result<Solution> {
    Solver::default().solve(coils, range, resolution)
}
