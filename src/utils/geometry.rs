use geo::{BoundingRect, Coord, MultiPoint, Point, Rect};
use serde::{Deserialize, Serialize};

/// A sample point of a fiber in simulation coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True for the exact `(0, 0, 0)` sentinel the simulation writes for missing data.
    pub fn is_sentinel(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn midpoint(&self, other: &Point3) -> Point3 {
        Point3::new(
            0.5 * (self.x + other.x),
            0.5 * (self.y + other.y),
            0.5 * (self.z + other.z),
        )
    }

    /// Projection onto the xy plane.
    pub fn xy(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Point3::new(p[0], p[1], p[2])
    }
}

/// Flat triangle spanned by a fiber segment and its midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3; 3],
}

impl Triangle {
    pub fn from_segment(previous: Point3, current: Point3) -> Self {
        Self {
            vertices: [previous, current, previous.midpoint(&current)],
        }
    }
}

/// Bounding rectangle of the xy projection of `points`, `None` when empty.
pub fn xy_bounding_rect<'a, I>(points: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = &'a Point3>,
{
    let multi_point: MultiPoint<f64> = points
        .into_iter()
        .map(|p| Point::from(p.xy()))
        .collect();
    multi_point.bounding_rect()
}
