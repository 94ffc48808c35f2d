//! Grid arguments.
//!
//! A grid is moved to the execution side through [`ExecutionTopology`]:
//! uniform grids are described by a handful of values and need no
//! storage; unstructured grids transfer their connection and coordinate
//! arrays into device containers.

use std::mem::size_of;

use dax_device::{ArrayContainerExecution, DeviceAdapter, ExecutionArray};
use dax_grid::{
    Cell, CellField, Topology as GridTopology, TopologyUniform, TopologyUnstructured, UniformGrid,
    UnstructuredGrid,
};
use dax_types::{ArrayPortal, DaxError, DaxResult, Domain, Element, Id, Vector3};

use super::{Argument, ExecArg};
use crate::array_handle::ArrayHandle;

/// A control-side grid that can be made available to scheduled work on
/// device `D`.
pub trait ExecutionTopology<D: DeviceAdapter>: GridTopology {
    /// Execution-side storage backing the view.
    type Storage: Default + Send;

    /// Lightweight accessor handed to every instance.
    type View<'a>: GridTopology + Copy + Sync
    where
        Self: 'a;

    /// Transfers grid data into `storage` and returns a view of it.
    fn prepare_execution<'a>(&'a self, storage: &'a mut Self::Storage) -> Self::View<'a>;

    /// Bytes `prepare_execution` transfers.
    fn transfer_bytes(&self) -> u64 {
        0
    }
}

impl<D: DeviceAdapter> ExecutionTopology<D> for UniformGrid {
    type Storage = ();
    type View<'a> = TopologyUniform where Self: 'a;

    fn prepare_execution<'a>(&'a self, _storage: &'a mut ()) -> TopologyUniform {
        self.topology()
    }
}

/// Device copies of an unstructured grid's arrays.
pub struct UnstructuredStorage<D: DeviceAdapter> {
    connections: D::Container<Id>,
    points: D::Container<Vector3>,
}

impl<D: DeviceAdapter> Default for UnstructuredStorage<D> {
    fn default() -> Self {
        Self {
            connections: Default::default(),
            points: Default::default(),
        }
    }
}

fn transfer<T: Element, C: ArrayContainerExecution<T>>(container: &mut C, values: &[T]) {
    container.allocate(values.len());
    container.copy_from_control(values);
}

impl<D: DeviceAdapter> ExecutionTopology<D> for UnstructuredGrid {
    type Storage = UnstructuredStorage<D>;
    type View<'a> = TopologyUnstructured<ExecutionArray<'a, Id>, ExecutionArray<'a, Vector3>>
    where
        Self: 'a;

    fn prepare_execution<'a>(&'a self, storage: &'a mut UnstructuredStorage<D>) -> Self::View<'a> {
        let UnstructuredStorage {
            connections,
            points,
        } = storage;
        transfer(connections, self.connections());
        transfer(points, self.points());
        TopologyUnstructured::new(
            self.shape(),
            connections.execution_array(),
            points.execution_array(),
        )
    }

    fn transfer_bytes(&self) -> u64 {
        (self.connections().len() * size_of::<Id>() + self.points().len() * size_of::<Vector3>())
            as u64
    }
}

fn require_cell_domain(domain: Domain, argument: &str) -> DaxResult<()> {
    match domain {
        Domain::Cell => Ok(()),
        Domain::Point => Err(DaxError::InvalidArgument(format!(
            "{argument} can only be scheduled over the cell domain"
        ))),
    }
}

/// A grid bound to the cell domain. Each instance receives its [`Cell`].
pub struct Topology<'g, G: ExecutionTopology<D>, D: DeviceAdapter> {
    grid: &'g G,
    storage: G::Storage,
}

impl<'g, G: ExecutionTopology<D>, D: DeviceAdapter> Topology<'g, G, D> {
    pub fn new(grid: &'g G) -> Self {
        Self {
            grid,
            storage: Default::default(),
        }
    }
}

impl<G: ExecutionTopology<D>, D: DeviceAdapter> Argument<D> for Topology<'_, G, D> {
    type Value = Cell;
    type Exec<'a> = TopologyExec<G::View<'a>> where Self: 'a;

    fn describe(&self) -> String {
        format!("{} topology", self.grid.cell_shape().name())
    }

    fn domain_length(&self, domain: Domain) -> DaxResult<Option<Id>> {
        require_cell_domain(domain, "a topology argument")?;
        Ok(Some(self.grid.number_of_cells()))
    }

    fn prepare<'a>(&'a mut self, _size: Id) -> DaxResult<Self::Exec<'a>> {
        Ok(TopologyExec {
            view: self.grid.prepare_execution(&mut self.storage),
        })
    }

    fn bytes_to_execution(&self) -> u64 {
        self.grid.transfer_bytes()
    }
}

/// Execution view of a [`Topology`] argument.
#[derive(Debug, Clone, Copy)]
pub struct TopologyExec<V> {
    view: V,
}

impl<V: GridTopology> ExecArg for TopologyExec<V> {
    type Value = Cell;

    #[inline]
    fn fetch(&self, index: Id) -> DaxResult<Cell> {
        self.view.cell(index)
    }
}

/// A point field gathered per cell: each instance receives the field
/// values at its cell's vertices, in local vertex order.
pub struct FieldPoints<'h, 'g, T: Element, G: ExecutionTopology<D>, D: DeviceAdapter> {
    grid: &'g G,
    storage: G::Storage,
    field: &'h mut ArrayHandle<T, D>,
}

impl<'h, 'g, T: Element, G: ExecutionTopology<D>, D: DeviceAdapter> FieldPoints<'h, 'g, T, G, D> {
    /// Binds `field`, which must hold one value per point of `grid`.
    pub fn new(grid: &'g G, field: &'h mut ArrayHandle<T, D>) -> Self {
        Self {
            grid,
            storage: Default::default(),
            field,
        }
    }
}

impl<T: Element, G: ExecutionTopology<D>, D: DeviceAdapter> Argument<D>
    for FieldPoints<'_, '_, T, G, D>
{
    type Value = CellField<T>;
    type Exec<'a> = FieldPointsExec<'a, T, G::View<'a>> where Self: 'a;

    fn describe(&self) -> String {
        format!("point field of {} values", self.field.len())
    }

    fn domain_length(&self, domain: Domain) -> DaxResult<Option<Id>> {
        require_cell_domain(domain, "a point field argument")?;
        let expected = self.grid.number_of_points();
        let actual = self.field.len();
        if expected != actual {
            return Err(DaxError::DomainMismatch {
                argument: self.describe(),
                domain: Domain::Point,
                expected,
                actual,
            });
        }
        Ok(Some(self.grid.number_of_cells()))
    }

    fn prepare<'a>(&'a mut self, _size: Id) -> DaxResult<Self::Exec<'a>> {
        let FieldPoints {
            grid,
            storage,
            field,
        } = self;
        Ok(FieldPointsExec {
            view: grid.prepare_execution(storage),
            values: field.prepare_for_input(),
        })
    }

    fn bytes_to_execution(&self) -> u64 {
        let field_bytes = if self.field.is_execution_valid() {
            0
        } else {
            (self.field.len() * size_of::<T>()) as u64
        };
        self.grid.transfer_bytes() + field_bytes
    }
}

/// Execution view of a [`FieldPoints`] argument.
#[derive(Debug, Clone, Copy)]
pub struct FieldPointsExec<'a, T, V> {
    view: V,
    values: ExecutionArray<'a, T>,
}

impl<T: Element, V: GridTopology> ExecArg for FieldPointsExec<'_, T, V> {
    type Value = CellField<T>;

    fn fetch(&self, index: Id) -> DaxResult<CellField<T>> {
        let connections = self.view.cell_connections(index)?;
        let mut gathered = CellField::<T>::new(connections.len());
        for (slot, &point) in gathered.as_mut_slice().iter_mut().zip(connections.iter()) {
            *slot = self.values.try_get(point)?;
        }
        Ok(gathered)
    }
}
