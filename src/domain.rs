use serde::{Deserialize, Serialize};

use crate::utils::error::{Error, Result};
use crate::utils::geometry::Point3;
use crate::utils::grid::{fiber_coordinate, fiber_index, grid_side};

/// One sampled fiber. An empty point list marks a fiber that was rejected,
/// either while decoding or by the neighbor filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fiber {
    pub points: Vec<Point3>,
}

impl Fiber {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, index: usize) -> Option<&Point3> {
        self.points.get(index)
    }

    pub fn clear(&mut self) {
        self.points = Vec::new();
    }
}

impl From<Vec<Point3>> for Fiber {
    fn from(points: Vec<Point3>) -> Self {
        Fiber::new(points)
    }
}

/// Square, row-major grid of fibers as laid out by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberGrid {
    side: usize,
    n_points_whole_fiber: usize,
    fibers: Vec<Fiber>,
}

impl FiberGrid {
    /// Builds a grid from fibers in row-major order, deriving the side length
    /// from the fiber count.
    pub fn new(fibers: Vec<Fiber>, n_points_whole_fiber: usize) -> Result<Self> {
        let side = grid_side(fibers.len())?;
        Ok(Self {
            side,
            n_points_whole_fiber,
            fibers,
        })
    }

    /// Checks the invariants that deserialized data cannot guarantee.
    pub fn validate(&self) -> Result<()> {
        if self.side.checked_mul(self.side) != Some(self.fibers.len()) {
            return Err(Error::NonSquareGrid {
                n_fibers_total: self.fibers.len(),
                side: self.side,
            });
        }
        if let Some((index, fiber)) = self
            .fibers
            .iter()
            .enumerate()
            .find(|(_, f)| !f.is_empty() && f.len() != self.n_points_whole_fiber)
        {
            return Err(Error::IncompleteGrid {
                fiber: index,
                level: fiber.len(),
            });
        }
        Ok(())
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn n_fibers_total(&self) -> usize {
        self.fibers.len()
    }

    pub fn n_points_whole_fiber(&self) -> usize {
        self.n_points_whole_fiber
    }

    pub fn fibers(&self) -> &[Fiber] {
        &self.fibers
    }

    pub fn fiber(&self, index: usize) -> Option<&Fiber> {
        self.fibers.get(index)
    }

    pub fn fiber_at(&self, x: usize, y: usize) -> Option<&Fiber> {
        if x >= self.side || y >= self.side {
            return None;
        }
        self.fibers.get(fiber_index(x, y, self.side))
    }

    pub fn coordinate_of(&self, index: usize) -> (usize, usize) {
        fiber_coordinate(index, self.side)
    }

    /// Empties the fiber at `index`; out-of-range indices are ignored.
    pub fn clear(&mut self, index: usize) {
        if let Some(fiber) = self.fibers.get_mut(index) {
            fiber.clear();
        }
    }

    pub fn n_valid(&self) -> usize {
        self.fibers.iter().filter(|f| !f.is_empty()).count()
    }

    pub fn n_empty(&self) -> usize {
        self.fibers.len() - self.n_valid()
    }
}
