//! Restartable snapshots of a fiber grid.
//!
//! Serialized with `bincode`, so point coordinates survive bit for bit and empty
//! fibers stay empty. A snapshot can be reloaded without parsing the raw input again.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::domain::FiberGrid;
use crate::utils::error::{Error, Result};

pub fn snapshot_to_bytes(grid: &FiberGrid) -> Result<Vec<u8>> {
    Ok(bincode::serialize(grid)?)
}

pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<FiberGrid> {
    let grid: FiberGrid = bincode::deserialize(bytes)?;
    grid.validate()?;
    Ok(grid)
}

pub fn save_snapshot(path: &Path, grid: &FiberGrid) -> Result<()> {
    let bytes = snapshot_to_bytes(grid)?;
    let file = File::create(path).map_err(|e| Error::write(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| Error::write(path, e))?;
    info!(
        "wrote snapshot of {} fibers to {}",
        grid.n_fibers_total(),
        path.display()
    );
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<FiberGrid> {
    let file = File::open(path).map_err(|e| Error::read(path, e))?;
    let grid: FiberGrid = bincode::deserialize_from(BufReader::new(file))?;
    grid.validate()?;
    Ok(grid)
}
