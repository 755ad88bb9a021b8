use crate::utils::error::{Error, Result};

/// Side length of the square fiber grid holding `n_fibers_total` fibers.
///
/// Fails with [`Error::NonSquareGrid`] when the count has no exact integer square root,
/// since a floored side would shift every row and break the neighbor lookups.
pub fn grid_side(n_fibers_total: usize) -> Result<usize> {
    let side = (n_fibers_total as f64).sqrt().round() as usize;
    // the float root can be off by one for large counts
    let side = [side.saturating_sub(1), side, side + 1]
        .into_iter()
        .find(|s| s.checked_mul(*s) == Some(n_fibers_total))
        .ok_or(Error::NonSquareGrid {
            n_fibers_total,
            side,
        })?;
    Ok(side)
}

/// Row-major fiber index of grid cell `(x, y)`.
#[inline]
pub fn fiber_index(x: usize, y: usize, side: usize) -> usize {
    y * side + x
}

/// Grid cell `(x, y)` of a row-major fiber index.
#[inline]
pub fn fiber_coordinate(index: usize, side: usize) -> (usize, usize) {
    (index % side, index / side)
}

/// Indices of the existing 4-connected neighbors of `(x, y)`: left, bottom, right, top.
pub fn neighbor_indices(x: usize, y: usize, side: usize) -> impl Iterator<Item = usize> {
    let left = (x > 0).then(|| fiber_index(x - 1, y, side));
    let below = (y > 0).then(|| fiber_index(x, y - 1, side));
    let right = (x + 1 < side).then(|| fiber_index(x + 1, y, side));
    let above = (y + 1 < side).then(|| fiber_index(x, y + 1, side));
    [left, below, right, above].into_iter().flatten()
}
