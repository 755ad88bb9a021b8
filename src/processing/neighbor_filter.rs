use log::{debug, info};

use crate::domain::FiberGrid;
use crate::utils::grid::{fiber_coordinate, neighbor_indices};

/// Largest tolerated distance between a fiber and any 4-connected neighbor at
/// the same point index, in simulation length units.
pub const DISTANCE_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStatistics {
    pub index: usize,
    pub x: usize,
    pub y: usize,
    /// Maximum neighbor distance over all compared point pairs, 0 if none were compared.
    pub max_distance: f64,
    /// Number of point pairs compared.
    pub n_compared: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterReport {
    /// Fiber indices emptied by the filter, ascending.
    pub cleared: Vec<usize>,
    pub cells: Vec<CellStatistics>,
}

/// Computes the neighbor statistics of every grid cell without modifying the grid.
pub fn evaluate_neighbor_distances(grid: &FiberGrid) -> Vec<CellStatistics> {
    let side = grid.side();
    let fibers = grid.fibers();

    (0..grid.n_fibers_total())
        .map(|index| {
            let (x, y) = fiber_coordinate(index, side);
            let own = &fibers[index];
            let mut max_distance: f64 = 0.0;
            let mut n_compared = 0;

            for point_no in 0..grid.n_points_whole_fiber() {
                let Some(point) = own.point(point_no) else {
                    break;
                };
                for neighbor in neighbor_indices(x, y, side) {
                    if let Some(other) = fibers[neighbor].point(point_no) {
                        max_distance = max_distance.max(point.distance(other));
                        n_compared += 1;
                    }
                }
            }

            debug!(
                " fiber {},{}, n_points: {}, max_distance: {}",
                x, y, n_compared, max_distance
            );
            CellStatistics {
                index,
                x,
                y,
                max_distance,
                n_compared,
            }
        })
        .collect()
}

/**
 * Empties every fiber whose distance to one of its grid neighbors exceeds
 * `threshold` at some point index.
 *
 * All cells are judged against the grid as it was before the call; a fiber
 * cleared here does not change the verdict on its neighbors until the next call.
 */
pub fn neighbor_consistency_filter(grid: &mut FiberGrid, threshold: f64) -> FilterReport {
    let cells = evaluate_neighbor_distances(grid);
    let cleared: Vec<usize> = cells
        .iter()
        .filter(|cell| cell.max_distance > threshold)
        .map(|cell| cell.index)
        .collect();

    for index in &cleared {
        grid.clear(*index);
    }
    info!(
        "neighbor filter removed {} of {} fibers (threshold {})",
        cleared.len(),
        grid.n_fibers_total(),
        threshold
    );

    FilterReport { cleared, cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Fiber;
    use crate::utils::geometry::Point3;

    fn straight_grid(side: usize, n_points: usize, spacing: f64) -> FiberGrid {
        let mut fibers = Vec::new();
        for y in 0..side {
            for x in 0..side {
                fibers.push(Fiber::new(
                    (0..n_points)
                        .map(|z| {
                            Point3::new(
                                (x + 1) as f64 * spacing,
                                (y + 1) as f64 * spacing,
                                (z + 1) as f64,
                            )
                        })
                        .collect(),
                ));
            }
        }
        FiberGrid::new(fibers, n_points).unwrap()
    }

    fn displace(grid: &FiberGrid, index: usize, offset: f64) -> FiberGrid {
        let fibers = grid
            .fibers()
            .iter()
            .enumerate()
            .map(|(i, fiber)| {
                if i == index {
                    Fiber::new(
                        fiber
                            .points
                            .iter()
                            .map(|p| Point3::new(p.x + offset, p.y + offset, p.z))
                            .collect(),
                    )
                } else {
                    fiber.clone()
                }
            })
            .collect();
        FiberGrid::new(fibers, grid.n_points_whole_fiber()).unwrap()
    }

    #[test]
    fn test_consistent_grid_is_unchanged() {
        let mut grid = straight_grid(4, 5, 1.0);
        let before = grid.clone();
        let report = neighbor_consistency_filter(&mut grid, DISTANCE_THRESHOLD);
        assert!(report.cleared.is_empty());
        assert_eq!(grid, before);
        assert_eq!(report.cells.len(), 16);
    }

    #[test]
    fn test_statistics_count_existing_neighbors() {
        let grid = straight_grid(3, 2, 2.0);
        let cells = evaluate_neighbor_distances(&grid);
        // corner: 2 neighbors, edge: 3, center: 4; two points each
        assert_eq!(cells[0].n_compared, 4);
        assert_eq!(cells[1].n_compared, 6);
        assert_eq!(cells[4].n_compared, 8);
        assert_eq!(cells[4].max_distance, 2.0);
        assert_eq!((cells[5].x, cells[5].y), (2, 1));
    }

    #[test]
    fn test_outlier_corner_in_2x2_grid() {
        let mut grid = displace(&straight_grid(2, 2, 1.0), 0, -20.0);
        let report = neighbor_consistency_filter(&mut grid, DISTANCE_THRESHOLD);
        // the outlier drags down the neighbors that see it, the opposite corner survives
        assert_eq!(report.cleared, vec![0, 1, 2]);
        assert!(grid.fiber_at(0, 0).unwrap().is_empty());
        assert!(!grid.fiber_at(1, 1).unwrap().is_empty());
    }

    #[test]
    fn test_single_pass_in_3x3_grid() {
        let mut grid = displace(&straight_grid(3, 3, 1.0), 4, 15.0);
        let report = neighbor_consistency_filter(&mut grid, DISTANCE_THRESHOLD);
        assert_eq!(report.cleared, vec![1, 3, 4, 5, 7]);
        for corner in [0, 2, 6, 8] {
            assert!(!grid.fiber(corner).unwrap().is_empty());
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        // neighbors exactly 10 apart are kept
        let mut grid = straight_grid(2, 2, 10.0);
        let report = neighbor_consistency_filter(&mut grid, DISTANCE_THRESHOLD);
        assert!(report.cleared.is_empty());
    }

    #[test]
    fn test_empty_fibers_are_skipped() {
        let mut grid = displace(&straight_grid(2, 2, 1.0), 3, 50.0);
        grid.clear(3);
        let cells = evaluate_neighbor_distances(&grid);
        assert_eq!(cells[3].n_compared, 0);
        assert_eq!(cells[3].max_distance, 0.0);
        assert_eq!(cells[1].n_compared, 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut grid = displace(&straight_grid(4, 4, 1.0), 5, 12.0);
        let first = neighbor_consistency_filter(&mut grid, DISTANCE_THRESHOLD);
        assert!(!first.cleared.is_empty());
        let after_first = grid.clone();
        let second = neighbor_consistency_filter(&mut grid, DISTANCE_THRESHOLD);
        assert!(second.cleared.iter().all(|i| after_first.fiber(*i).unwrap().is_empty()));
        assert_eq!(grid, after_first);
    }
}
