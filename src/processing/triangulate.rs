use crate::domain::FiberGrid;
use crate::utils::geometry::{Point3, Triangle};

/// Points closer to the origin than this are skipped when meshing.
///
/// This also catches valid data that happens to lie near the origin, so it is a
/// precision trade-off rather than a sentinel check.
pub const MIN_POINT_NORM: f64 = 1e-3;

/// Turns every non-empty fiber into a strip of flat triangles, one per pair of
/// consecutive retained points. The result is only a coarse visual
/// approximation of the fiber bundle, not a surface mesh.
pub fn triangulate(grid: &FiberGrid, min_point_norm: f64) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    for fiber in grid.fibers().iter().filter(|f| !f.is_empty()) {
        let mut previous: Option<Point3> = None;
        for point in fiber.points.iter().filter(|p| p.norm() >= min_point_norm) {
            if let Some(previous) = previous {
                triangles.push(Triangle::from_segment(previous, *point));
            }
            previous = Some(*point);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Fiber;

    fn grid_2x2(n_points: usize) -> FiberGrid {
        let fibers = (0..4)
            .map(|i| {
                let x = (i % 2 + 1) as f64;
                let y = (i / 2 + 1) as f64;
                Fiber::new(
                    (0..n_points)
                        .map(|z| Point3::new(x, y, z as f64 + 1.0))
                        .collect(),
                )
            })
            .collect();
        FiberGrid::new(fibers, n_points).unwrap()
    }

    #[test]
    fn test_one_triangle_per_fiber_with_two_points() {
        let triangles = triangulate(&grid_2x2(2), MIN_POINT_NORM);
        assert_eq!(triangles.len(), 4);
        assert_eq!(
            triangles[0].vertices,
            [
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(1.0, 1.0, 2.0),
                Point3::new(1.0, 1.0, 1.5)
            ]
        );
    }

    #[test]
    fn test_count_matches_consecutive_pairs() {
        // two populated fibers with three points each
        let mut grid = grid_2x2(3);
        grid.clear(1);
        grid.clear(3);
        let triangles = triangulate(&grid, MIN_POINT_NORM);
        assert_eq!(triangles.len(), 4);
        assert_eq!(triangles[2].vertices[0], Point3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_near_origin_points_are_skipped() {
        let fiber = Fiber::new(vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1e-4),
            Point3::new(3.0, 0.0, 0.0),
        ]);
        let grid = FiberGrid::new(vec![fiber], 3).unwrap();
        let triangles = triangulate(&grid, MIN_POINT_NORM);
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0].vertices[1], Point3::new(3.0, 0.0, 0.0));
        assert_eq!(triangles[0].vertices[2], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_grid() {
        let grid = FiberGrid::new(Vec::new(), 0).unwrap();
        assert!(triangulate(&grid, MIN_POINT_NORM).is_empty());
    }
}
