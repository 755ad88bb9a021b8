use std::io::Read;

use log::{debug, info, warn};

use crate::domain::{Fiber, FiberGrid};
use crate::reader::header::Header;
use crate::reader::read_fully;
use crate::utils::error::{Error, Result};
use crate::utils::geometry::Point3;
use crate::utils::grid::{fiber_coordinate, grid_side};

pub const POINT_SIZE: usize = 24;

// header counts are untrusted until the bytes behind them have been read
const MAX_PREALLOCATED: usize = 4096;

/// Where a fiber was first found to contain the `(0, 0, 0)` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidFiber {
    pub index: usize,
    pub x: usize,
    pub y: usize,
    pub point: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFibers {
    pub grid: FiberGrid,
    pub n_valid: usize,
    pub n_invalid: usize,
    pub invalid: Vec<InvalidFiber>,
}

fn read_point<R: Read>(reader: &mut R, fiber: usize, point: usize) -> Result<Point3> {
    let mut bytes = [0u8; POINT_SIZE];
    if read_fully(reader, &mut bytes)? < POINT_SIZE {
        return Err(Error::TruncatedFiber { fiber, point });
    }
    let value = |i: usize| {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
        f64::from_le_bytes(raw)
    };
    Ok(Point3::new(value(0), value(1), value(2)))
}

/**
 * Reads `n_fibers_total` fibers of `n_points_whole_fiber` points each from a
 * stream positioned right after the header.
 *
 * A fiber containing the exact `(0, 0, 0)` point is kept in the grid as an empty
 * fiber; its remaining points are still consumed so the next fiber starts at the
 * right offset.
 *
 * # Errors
 * `NonSquareGrid` if the fiber count has no integer square root (checked before
 * anything is read), `TruncatedFiber` if the stream ends early.
 */
pub fn read_fibers<R: Read>(
    reader: &mut R,
    n_fibers_total: usize,
    n_points_whole_fiber: usize,
) -> Result<DecodedFibers> {
    let side = grid_side(n_fibers_total)?;

    let mut fibers = Vec::with_capacity(n_fibers_total.min(MAX_PREALLOCATED));
    let mut invalid = Vec::new();

    for fiber_no in 0..n_fibers_total {
        let mut points = Vec::with_capacity(n_points_whole_fiber.min(MAX_PREALLOCATED));
        let mut first_sentinel = None;

        for point_no in 0..n_points_whole_fiber {
            let point = read_point(reader, fiber_no, point_no)?;
            if point.is_sentinel() && first_sentinel.is_none() {
                let (x, y) = fiber_coordinate(fiber_no, side);
                warn!(
                    "streamline {}, ({},{})/({},{}) is invalid ({}. point)",
                    fiber_no, x, y, side, side, point_no
                );
                debug!(
                    "streamline so far: {:?}",
                    &points[..points.len().min(10)]
                );
                first_sentinel = Some(InvalidFiber {
                    index: fiber_no,
                    x,
                    y,
                    point: point_no,
                });
            }
            points.push(point);
        }

        match first_sentinel {
            Some(entry) => {
                invalid.push(entry);
                fibers.push(Fiber::empty());
            }
            None => fibers.push(Fiber::new(points)),
        }
    }

    let n_invalid = invalid.len();
    let n_valid = n_fibers_total - n_invalid;
    info!("n valid: {}, n invalid: {}", n_valid, n_invalid);

    Ok(DecodedFibers {
        grid: FiberGrid::new(fibers, n_points_whole_fiber)?,
        n_valid,
        n_invalid,
        invalid,
    })
}

/// Decodes a complete fiber file: header followed by the fiber data.
pub fn decode<R: Read>(reader: &mut R) -> Result<(Header, DecodedFibers)> {
    let header = Header::read_from(reader)?;
    let side = grid_side(header.n_fibers_total())?;
    header.log_summary(side);
    let decoded = read_fibers(
        reader,
        header.n_fibers_total(),
        header.n_points_whole_fiber(),
    )?;
    Ok((header, decoded))
}
