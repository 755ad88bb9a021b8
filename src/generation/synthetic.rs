use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Fiber, FiberGrid};
use crate::utils::geometry::Point3;
use crate::utils::error::Result;

/// Generates a `side` x `side` grid of roughly vertical fibers.
///
/// Fiber `(x, y)` starts near `(x * spacing, y * spacing, 0)` and rises by
/// `spacing` per point; every coordinate is perturbed by up to `jitter`.
/// The grid never touches the origin so no point is mistaken for a sentinel.
pub fn generate_fiber_grid(
    side: usize,
    n_points_whole_fiber: usize,
    spacing: f64,
    jitter: f64,
    seed: u64,
) -> Result<FiberGrid> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fibers = Vec::with_capacity(side * side);

    for y in 0..side {
        for x in 0..side {
            let points = (0..n_points_whole_fiber)
                .map(|z| {
                    let mut offset = || {
                        if jitter > 0.0 {
                            rng.gen_range(-jitter..jitter)
                        } else {
                            0.0
                        }
                    };
                    Point3::new(
                        (x + 1) as f64 * spacing + offset(),
                        (y + 1) as f64 * spacing + offset(),
                        (z + 1) as f64 * spacing + offset(),
                    )
                })
                .collect();
            fibers.push(Fiber::new(points));
        }
    }

    FiberGrid::new(fibers, n_points_whole_fiber)
}
