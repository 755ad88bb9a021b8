use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::info;

use crate::domain::FiberGrid;
use crate::processing::neighbor_filter::{
    DISTANCE_THRESHOLD, FilterReport, neighbor_consistency_filter,
};
use crate::processing::triangulate::{MIN_POINT_NORM, triangulate};
use crate::reader::fiber_stream::decode;
use crate::reader::header::Header;
use crate::utils::error::{Error, Result};
use crate::writer::cross_section::{Level, render_cross_sections, save_cross_section};
use crate::writer::snapshot::save_snapshot;
use crate::writer::stl::save_stl;

pub const DEFAULT_INPUT: &str = "fibers.bin";

/// Points in the run where an interactive front end may pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    BeforeNeighborFilter,
    BeforeFinalMesh,
}

/// Confirmation hook that never blocks.
pub fn no_confirmation(_: Checkpoint) {}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub mesh_output: PathBuf,
    pub snapshot_output: PathBuf,
    pub distance_threshold: f64,
    pub min_point_norm: f64,
    pub run_filter: bool,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl PipelineConfig {
    /// Configuration with every output named after `input`.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        Self {
            mesh_output: with_suffix(&input, ".stl"),
            snapshot_output: with_suffix(&input, ".pickle"),
            input,
            distance_threshold: DISTANCE_THRESHOLD,
            min_point_norm: MIN_POINT_NORM,
            run_filter: true,
        }
    }

    pub fn filtered_mesh_output(&self) -> PathBuf {
        with_suffix(&self.mesh_output, "_")
    }

    pub fn filtered_snapshot_output(&self) -> PathBuf {
        with_suffix(&self.snapshot_output, "_")
    }

    pub fn cross_section_output(&self, level: Level) -> PathBuf {
        with_suffix(&self.input, &format!("_{}.svg", level.name()))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub header: Header,
    pub n_valid: usize,
    pub n_invalid: usize,
    pub n_triangles: usize,
    pub filter: Option<FilterReport>,
    pub n_filtered_triangles: Option<usize>,
    pub grid: FiberGrid,
    pub artifacts: Vec<PathBuf>,
}

fn display_name(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/**
 * Runs the whole conversion for one input file.
 *
 * Writes the unfiltered snapshot, the cross-sections (only when no fiber was
 * invalid) and the unfiltered mesh, then applies the neighbor filter and writes
 * the filtered snapshot and mesh. `confirm` is called before the filter and
 * before the final mesh.
 */
pub fn run(config: &PipelineConfig, confirm: &mut dyn FnMut(Checkpoint)) -> Result<RunSummary> {
    info!(
        "{} -> {}, {}",
        config.input.display(),
        config.mesh_output.display(),
        config.snapshot_output.display()
    );

    let (header, decoded) = {
        let file = File::open(&config.input).map_err(|e| Error::read(&config.input, e))?;
        decode(&mut BufReader::new(file))?
    };
    let mut grid = decoded.grid;
    let mut artifacts = Vec::new();

    info!(
        "output snapshot to filename: {}",
        config.snapshot_output.display()
    );
    save_snapshot(&config.snapshot_output, &grid)?;
    artifacts.push(config.snapshot_output.clone());

    if decoded.n_invalid == 0 {
        for section in render_cross_sections(&grid)? {
            let path = config.cross_section_output(section.level);
            save_cross_section(&path, &section)?;
            artifacts.push(path);
        }
    } else {
        info!(
            "skipping cross-sections of {:?}, {} fibers are invalid",
            display_name(&config.input),
            decoded.n_invalid
        );
    }

    let triangles = triangulate(&grid, config.min_point_norm);
    save_stl(&config.mesh_output, &triangles)?;
    artifacts.push(config.mesh_output.clone());

    let n_triangles = triangles.len();
    if !config.run_filter {
        return Ok(RunSummary {
            header,
            n_valid: decoded.n_valid,
            n_invalid: decoded.n_invalid,
            n_triangles,
            filter: None,
            n_filtered_triangles: None,
            grid,
            artifacts,
        });
    }

    info!("postprocessing where fibers with too high distance to neighbouring fibers are removed");
    confirm(Checkpoint::BeforeNeighborFilter);
    let report = neighbor_consistency_filter(&mut grid, config.distance_threshold);

    let filtered_snapshot = config.filtered_snapshot_output();
    info!(
        "output other snapshot to filename: {}",
        filtered_snapshot.display()
    );
    save_snapshot(&filtered_snapshot, &grid)?;
    artifacts.push(filtered_snapshot);

    confirm(Checkpoint::BeforeFinalMesh);
    let filtered_mesh = config.filtered_mesh_output();
    let filtered_triangles = triangulate(&grid, config.min_point_norm);
    save_stl(&filtered_mesh, &filtered_triangles)?;
    artifacts.push(filtered_mesh);

    Ok(RunSummary {
        header,
        n_valid: decoded.n_valid,
        n_invalid: decoded.n_invalid,
        n_triangles,
        filter: Some(report),
        n_filtered_triangles: Some(filtered_triangles.len()),
        grid,
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Fiber;
    use crate::generation::write_fiber_file;
    use crate::utils::geometry::Point3;
    use crate::writer::snapshot::load_snapshot;
    use std::fs;

    fn work_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fiber_utility_pipeline_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn grid_2x2(offset_first: f64) -> FiberGrid {
        let fibers = (0..4)
            .map(|i| {
                let shift = if i == 0 { offset_first } else { 0.0 };
                let x = (i % 2 + 1) as f64 + shift;
                let y = (i / 2 + 1) as f64 + shift;
                Fiber::new(vec![Point3::new(x, y, 1.0), Point3::new(x, y, 2.0)])
            })
            .collect();
        FiberGrid::new(fibers, 2).unwrap()
    }

    #[test]
    fn test_output_names() {
        let mut config = PipelineConfig::new("data/fibers.bin");
        assert_eq!(config.mesh_output, PathBuf::from("data/fibers.bin.stl"));
        assert_eq!(config.snapshot_output, PathBuf::from("data/fibers.bin.pickle"));
        assert_eq!(
            config.filtered_mesh_output(),
            PathBuf::from("data/fibers.bin.stl_")
        );
        assert_eq!(
            config.cross_section_output(Level::Center),
            PathBuf::from("data/fibers.bin_center.svg")
        );
        config.snapshot_output = PathBuf::from("out.snap");
        assert_eq!(config.filtered_snapshot_output(), PathBuf::from("out.snap_"));
        assert_eq!(PipelineConfig::default().input, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn test_clean_grid_scenario() {
        let dir = work_dir("clean");
        let input = dir.join("fibers.bin");
        write_fiber_file(&input, &grid_2x2(0.0), 1_600_000_000).unwrap();

        let config = PipelineConfig::new(&input);
        let mut checkpoints: Vec<Checkpoint> = Vec::new();
        let summary = run(&config, &mut |c: Checkpoint| checkpoints.push(c)).unwrap();

        assert_eq!(summary.n_invalid, 0);
        assert_eq!(summary.n_triangles, 4);
        assert_eq!(summary.n_filtered_triangles, Some(4));
        assert_eq!(
            checkpoints,
            vec![Checkpoint::BeforeNeighborFilter, Checkpoint::BeforeFinalMesh]
        );
        for level in Level::ALL {
            assert!(config.cross_section_output(level).exists());
        }
        assert_eq!(fs::metadata(&config.mesh_output).unwrap().len(), 84 + 4 * 50);

        // nothing was filtered, so both snapshots hold the same grid
        let before = load_snapshot(&config.snapshot_output).unwrap();
        let after = load_snapshot(&config.filtered_snapshot_output()).unwrap();
        assert_eq!(before, after);
        assert_eq!(
            fs::read(&config.snapshot_output).unwrap(),
            fs::read(config.filtered_snapshot_output()).unwrap()
        );
    }

    #[test]
    fn test_outlier_is_removed_from_second_pass() {
        let dir = work_dir("outlier");
        let input = dir.join("fibers.bin");
        write_fiber_file(&input, &grid_2x2(-30.0), 0).unwrap();

        let config = PipelineConfig::new(&input);
        let summary = run(&config, &mut no_confirmation).unwrap();

        let report = summary.filter.unwrap();
        assert!(report.cleared.contains(&0));
        let after = load_snapshot(&config.filtered_snapshot_output()).unwrap();
        assert!(after.fiber_at(0, 0).unwrap().is_empty());
        assert!(!after.fiber_at(1, 1).unwrap().is_empty());
        assert_eq!(summary.n_triangles, 4);
        assert_eq!(summary.n_filtered_triangles, Some(4 - report.cleared.len()));
    }

    #[test]
    fn test_invalid_fiber_skips_cross_sections() {
        let dir = work_dir("invalid");
        let input = dir.join("fibers.bin");
        let mut grid = grid_2x2(0.0);
        grid.clear(2);
        write_fiber_file(&input, &grid, 0).unwrap();

        let config = PipelineConfig {
            run_filter: false,
            ..PipelineConfig::new(&input)
        };
        let summary = run(&config, &mut no_confirmation).unwrap();

        assert_eq!(summary.n_invalid, 1);
        assert_eq!(summary.n_triangles, 3);
        assert!(summary.filter.is_none());
        for level in Level::ALL {
            assert!(!config.cross_section_output(level).exists());
        }
        assert!(!config.filtered_mesh_output().exists());
        let stored = load_snapshot(&config.snapshot_output).unwrap();
        assert!(stored.fibers().iter().all(|f| f.is_empty() || f.len() == 2));
    }

    #[test]
    fn test_missing_input() {
        let dir = work_dir("missing");
        let config = PipelineConfig::new(dir.join("absent.bin"));
        assert!(matches!(
            run(&config, &mut no_confirmation),
            Err(Error::Read { .. })
        ));
    }
}
