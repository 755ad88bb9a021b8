//! Schematic SVG cross-sections of the fiber grid at three heights.
//!
//! Every fiber contributes a dot at the chosen point index and every grid cell
//! with a right and an upper neighbor is outlined as a quadrilateral. Border rows
//! and columns are colored so the orientation of the grid can be read off the image.

use std::fs;
use std::path::Path;

use geo::{Coord, Rect};
use log::info;

use crate::domain::FiberGrid;
use crate::utils::error::{Error, Result};
use crate::utils::geometry::{Point3, xy_bounding_rect};
use crate::utils::grid::fiber_index;

const DEFAULT_STROKE: &str = "#000000";
const FIRST_COLUMN_STROKE: &str = "#0000aa";
const LAST_COLUMN_STROKE: &str = "#3333ff";
const FIRST_ROW_STROKE: &str = "#aa0000";
const LAST_ROW_STROKE: &str = "#ff3333";
const CORNER_STROKE: &str = "#00ff00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Bottom,
    Center,
    Top,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Bottom, Level::Center, Level::Top];

    pub fn name(&self) -> &'static str {
        match self {
            Level::Bottom => "bottom",
            Level::Center => "center",
            Level::Top => "top",
        }
    }

    /// Point index sampled for this level in fibers of `n_points` points.
    pub fn point_index(&self, n_points: usize) -> usize {
        match self {
            Level::Bottom => 0,
            Level::Center => n_points / 2,
            Level::Top => n_points.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    pub level: Level,
    pub point_index: usize,
    pub bounds: Rect<f64>,
    pub svg: String,
}

/// Stroke of the dot drawn for fiber `(x, y)`; corners are the grid's extreme fibers.
fn point_stroke(x: usize, y: usize, side: usize) -> &'static str {
    let last = side.saturating_sub(1);
    border_stroke(x, y, side, last)
}

/// Stroke of the outline of cell `(x, y)`; corners are the extreme cells.
fn cell_stroke(x: usize, y: usize, side: usize) -> &'static str {
    let last = side.saturating_sub(2);
    border_stroke(x, y, side, last)
}

// later rules win, so corners override rows and rows override columns
fn border_stroke(x: usize, y: usize, side: usize, corner: usize) -> &'static str {
    let second_last = side.checked_sub(2);
    let mut stroke = DEFAULT_STROKE;
    if x == 0 {
        stroke = FIRST_COLUMN_STROKE;
    }
    if Some(x) == second_last {
        stroke = LAST_COLUMN_STROKE;
    }
    if y == 0 {
        stroke = FIRST_ROW_STROKE;
    }
    if Some(y) == second_last {
        stroke = LAST_ROW_STROKE;
    }
    if (y == 0 || y == corner) && (x == 0 || x == corner) {
        stroke = CORNER_STROKE;
    }
    stroke
}

fn format_point(p: &Point3) -> String {
    format!("[{}, {}, {}]", p.x, p.y, p.z)
}

/// Collects the point at `point_index` of every fiber, failing if a fiber is too short.
fn level_points(grid: &FiberGrid, point_index: usize) -> Result<Vec<Point3>> {
    grid.fibers()
        .iter()
        .enumerate()
        .map(|(fiber, f)| {
            f.point(point_index).copied().ok_or(Error::IncompleteGrid {
                fiber,
                level: point_index,
            })
        })
        .collect()
}

/**
 * Renders the cross-section of a fully populated grid at `level`.
 *
 * # Errors
 * `IncompleteGrid` if any fiber lacks a point at the level's index; callers are
 * expected to skip rendering when decoding found invalid fibers.
 */
pub fn render_cross_section(grid: &FiberGrid, level: Level) -> Result<CrossSection> {
    let side = grid.side();
    let point_index = level.point_index(grid.n_points_whole_fiber());
    let points = level_points(grid, point_index)?;
    let at = |x: usize, y: usize| &points[fiber_index(x, y, side)];

    let mut body = String::new();
    for y in 0..side {
        for x in 0..side {
            let p = at(x, y);
            let stroke = point_stroke(x, y, side);
            body.push_str(&format!(
                "\n      <circle cx=\"{}\" cy=\"{}\" r=\"0.1\" stroke=\"{}\" stroke-width=\"0.1\" fill=\"{}\" />",
                p.x, p.y, stroke, stroke
            ));
        }
    }

    // cell corners:
    //  p2 p3
    //  p0 p1
    for y in 0..side.saturating_sub(1) {
        for x in 0..side.saturating_sub(1) {
            let (p0, p1, p2, p3) = (at(x, y), at(x + 1, y), at(x, y + 1), at(x + 1, y + 1));
            let stroke = cell_stroke(x, y, side);
            body.push_str(&format!(
                "\n      <!-- xy {} {}, len {}, points {} {} {} {}-->",
                x,
                y,
                grid.fibers()[fiber_index(x, y, side)].len(),
                format_point(p0),
                format_point(p1),
                format_point(p2),
                format_point(p3)
            ));
            body.push_str(&format!(
                "\n      <path\n         style=\"fill:none;fill-rule:evenodd;stroke:{};stroke-width:0.1;stroke-linecap:round;stroke-linejoin:round;stroke-opacity:1;stroke-miterlimit:4;stroke-dasharray:none\"\n         d=\"m {},{} {},{} {},{} {},{} z\" />",
                stroke,
                p0.x,
                p0.y,
                p1.x - p0.x,
                p1.y - p0.y,
                p3.x - p1.x,
                p3.y - p1.y,
                p2.x - p3.x,
                p2.y - p3.y
            ));
        }
    }

    let bounds = xy_bounding_rect(&points)
        .unwrap_or_else(|| Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }));
    let min = bounds.min();
    // adding zero turns a negated 0.0 into 0.0
    let (tx, ty) = (-min.x + 0.0, -min.y + 0.0);
    let svg = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n  <g transform=\"translate({},{})\">{}\n  </g>\n</svg>\n",
        bounds.width(),
        bounds.height(),
        tx,
        ty,
        body
    );

    Ok(CrossSection {
        level,
        point_index,
        bounds,
        svg,
    })
}

/// Renders the bottom, center and top cross-sections.
pub fn render_cross_sections(grid: &FiberGrid) -> Result<Vec<CrossSection>> {
    Level::ALL
        .iter()
        .map(|level| render_cross_section(grid, *level))
        .collect()
}

pub fn save_cross_section(path: &Path, section: &CrossSection) -> Result<()> {
    fs::write(path, &section.svg).map_err(|e| Error::write(path, e))?;
    info!("wrote file {}", path.display());
    Ok(())
}
