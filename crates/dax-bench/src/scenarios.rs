//! Benchmark scenarios: a workload, a grid, and a repetition count.
//!
//! Grids come from the hexahedron-decomposition generators, so every
//! grid kind of a given dimension shares the same points.

use serde::{Deserialize, Serialize};

use dax_grid::generators::{decompose_uniform, perturb_coordinates, uniform_cube};
use dax_grid::{CellShape, TestGrid};
use dax_types::{DaxResult, Id};

/// What a scenario runs on its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Workload {
    /// Flatten every cell's connections.
    ExtractTopology,
    /// Compute every cell's centroid.
    CellCentroids,
}

impl Workload {
    /// Returns all workloads.
    pub fn all() -> &'static [Workload] {
        &[Workload::ExtractTopology, Workload::CellCentroids]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Workload::ExtractTopology => "extract_topology",
            Workload::CellCentroids => "cell_centroids",
        }
    }
}

/// Which grid a scenario runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridKind {
    Uniform,
    Unstructured(CellShape),
}

impl GridKind {
    /// The uniform grid followed by one unstructured grid per shape.
    pub fn all() -> Vec<GridKind> {
        std::iter::once(GridKind::Uniform)
            .chain(CellShape::ALL.iter().map(|&shape| GridKind::Unstructured(shape)))
            .collect()
    }

    pub fn name(&self) -> String {
        match self {
            GridKind::Uniform => "uniform".to_string(),
            GridKind::Unstructured(shape) => format!("unstructured_{}", shape.name()),
        }
    }

    /// Builds the grid with `dim` points per axis.
    pub fn build(&self, dim: Id) -> DaxResult<TestGrid> {
        let uniform = uniform_cube(dim);
        Ok(match self {
            GridKind::Uniform => TestGrid::Uniform(uniform),
            GridKind::Unstructured(shape) => {
                let mut grid = decompose_uniform(&uniform, *shape)?;
                perturb_coordinates(grid.points_mut());
                TestGrid::Unstructured(grid)
            }
        })
    }
}

/// A fully specified benchmark scenario.
pub struct Scenario {
    pub workload: Workload,
    pub grid_kind: GridKind,
    /// Points per axis of the underlying uniform grid.
    pub dim: Id,
    /// Number of timed runs.
    pub repetitions: u32,
    pub grid: TestGrid,
}

impl Scenario {
    /// Creates a scenario with 5 repetitions.
    pub fn new(workload: Workload, grid_kind: GridKind, dim: Id) -> DaxResult<Self> {
        Ok(Self {
            workload,
            grid_kind,
            dim,
            repetitions: 5,
            grid: grid_kind.build(dim)?,
        })
    }

    /// Every workload on every grid kind at one dimension.
    pub fn suite(dim: Id) -> DaxResult<Vec<Scenario>> {
        let mut scenarios = Vec::new();
        for &workload in Workload::all() {
            for grid_kind in GridKind::all() {
                scenarios.push(Self::new(workload, grid_kind, dim)?);
            }
        }
        Ok(scenarios)
    }

    /// Returns `workload/grid/dim`, e.g. `extract_topology/uniform/32`.
    pub fn name(&self) -> String {
        format!("{}/{}/{}", self.workload.name(), self.grid_kind.name(), self.dim)
    }
}
