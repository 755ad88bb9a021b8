use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::FiberGrid;
use crate::reader::header::Header;
use crate::utils::error::{Error, Result};
use crate::utils::geometry::Point3;

pub const FIBER_FILE_TAG: &str = "parallel fiber estimation";

/// Encodes a grid in the input format read by [`crate::reader::fiber_stream::decode`].
/// Empty fibers are written as sentinel points so every fiber keeps its full size.
pub fn encode_fiber_file(grid: &FiberGrid, timestamp: i32) -> Vec<u8> {
    let n_fibers_total = grid.n_fibers_total() as i32;
    let n_points = grid.n_points_whole_fiber();
    let header = Header::new(
        FIBER_FILE_TAG,
        vec![
            n_fibers_total,
            n_points as i32,
            0,
            0,
            0,
            1,
            1,
            n_fibers_total,
            timestamp,
        ],
    );

    let mut bytes = header.to_bytes();
    bytes.reserve(grid.n_fibers_total() * n_points * 24);
    for fiber in grid.fibers() {
        for point_no in 0..n_points {
            let point = fiber.point(point_no).copied().unwrap_or_default();
            push_point(&mut bytes, &point);
        }
    }
    bytes
}

fn push_point(bytes: &mut Vec<u8>, point: &Point3) {
    bytes.extend_from_slice(&point.x.to_le_bytes());
    bytes.extend_from_slice(&point.y.to_le_bytes());
    bytes.extend_from_slice(&point.z.to_le_bytes());
}

pub fn write_fiber_file(path: &Path, grid: &FiberGrid, timestamp: i32) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::write(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&encode_fiber_file(grid, timestamp))
        .and_then(|_| writer.flush())
        .map_err(|e| Error::write(path, e))?;
    Ok(())
}
