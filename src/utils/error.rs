use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

// Define error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Truncated header: expected {expected} bytes, got {available}")]
    TruncatedHeader { expected: usize, available: usize },
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Truncated fiber data: stream ended in fiber {fiber} at point {point}")]
    TruncatedFiber { fiber: usize, point: usize },
    #[error("Fiber count {n_fibers_total} is not a square number (nearest side {side})")]
    NonSquareGrid { n_fibers_total: usize, side: usize },
    #[error("Incomplete grid: fiber {fiber} has no point at level {level}")]
    IncompleteGrid { fiber: usize, level: usize },
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl Error {
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }
}
