//! Topology extraction.
//!
//! Flattens the connections of a grid (or of a subset of its cells) into
//! one array of `points_per_cell` point ids per extracted cell. Instance
//! `i` writes entries `i * points_per_cell ..` so the regions written by
//! different instances never overlap.

use dax_device::{DeviceAdapter, ErrorHandler, ExecutionArray};
use dax_grid::{CellShape, Topology as GridTopology};
use dax_types::{DaxError, DaxResult, Id};
use tracing::debug;

use crate::arg::ExecutionTopology;
use crate::array_handle::ArrayHandle;
use crate::scheduler::Scheduler;

struct ExtractParameters<'a, V> {
    view: V,
    cell_ids: Option<ExecutionArray<'a, Id>>,
    output: ExecutionArray<'a, Id>,
    points_per_cell: usize,
}

fn extract_cell<V: GridTopology>(params: &ExtractParameters<'_, V>, index: Id, errors: &ErrorHandler) {
    let cell_index = match &params.cell_ids {
        Some(ids) => ids.get(index),
        None => index,
    };
    let connections = match params.view.cell_connections(cell_index) {
        Ok(connections) => connections,
        Err(DaxError::IndexOutOfRange { len, .. }) => {
            errors.raise(format!(
                "cell id {cell_index} out of range for a grid of {len} cells"
            ));
            return;
        }
        Err(error) => {
            errors.raise_error(&error);
            return;
        }
    };
    // SAFETY: instance `index` is the only writer of its output region.
    unsafe {
        params
            .output
            .set_range(index * params.points_per_cell, connections.as_slice())
    };
}

/// Connection list of every (or selected) cell of a grid.
pub struct ExtractTopology<D: DeviceAdapter> {
    shape: CellShape,
    number_of_cells: Id,
    topology: ArrayHandle<Id, D>,
}

impl<D: DeviceAdapter> ExtractTopology<D> {
    /// Extracts every cell of `grid`.
    pub fn new<G: ExecutionTopology<D>>(scheduler: &Scheduler<D>, grid: &G) -> DaxResult<Self> {
        Self::extract(scheduler, grid, None)
    }

    /// Extracts the cells listed in `cell_ids`, in that order. Ids outside
    /// the grid fail the extraction.
    pub fn with_cells<G: ExecutionTopology<D>>(
        scheduler: &Scheduler<D>,
        grid: &G,
        cell_ids: &mut ArrayHandle<Id, D>,
    ) -> DaxResult<Self> {
        Self::extract(scheduler, grid, Some(cell_ids))
    }

    fn extract<G: ExecutionTopology<D>>(
        scheduler: &Scheduler<D>,
        grid: &G,
        cell_ids: Option<&mut ArrayHandle<Id, D>>,
    ) -> DaxResult<Self> {
        let shape = grid.cell_shape();
        let points_per_cell = shape.num_points();
        let number_of_cells = match &cell_ids {
            Some(ids) => ids.len(),
            None => grid.number_of_cells(),
        };
        debug!(
            shape = shape.name(),
            number_of_cells,
            subset = cell_ids.is_some(),
            "extracting topology"
        );

        let mut topology = ArrayHandle::<Id, D>::new();
        let mut storage = G::Storage::default();
        let params = ExtractParameters {
            view: grid.prepare_execution(&mut storage),
            cell_ids: cell_ids.map(|ids| ids.prepare_for_input()),
            output: topology.prepare_for_output(number_of_cells * points_per_cell),
            points_per_cell,
        };
        scheduler.schedule("ExtractTopology", extract_cell, &params, number_of_cells)?;
        topology.complete_execution_write();

        Ok(Self {
            shape,
            number_of_cells,
            topology,
        })
    }

    pub fn shape(&self) -> CellShape {
        self.shape
    }

    pub fn points_per_cell(&self) -> usize {
        self.shape.num_points()
    }

    /// Number of extracted cells.
    pub fn number_of_cells(&self) -> Id {
        self.number_of_cells
    }

    /// The extracted connections, copied back on first access.
    pub fn topology(&mut self) -> &[Id] {
        self.topology.control_slice()
    }

    /// The handle holding the extracted connections, still resident on
    /// the execution side.
    pub fn topology_handle(&mut self) -> &mut ArrayHandle<Id, D> {
        &mut self.topology
    }

    pub fn into_topology(self) -> Vec<Id> {
        self.topology.into_vec()
    }
}
