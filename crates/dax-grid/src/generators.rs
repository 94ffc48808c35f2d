//! Procedural grid generators for tests and benchmarks.
//!
//! Every shape is produced by cutting each hexahedron of a uniform grid
//! into cells of that shape with [`CellShape::hexahedron_decomposition`].
//! The resulting grids share point numbering with the uniform grid they
//! came from, so results can be cross-checked between shapes.

use dax_types::{make_id3, make_vector3, DaxResult, Domain, Extent3, Id, Vector3};

use crate::cell::{CellShape, CellVertices};
use crate::topology::Topology;
use crate::uniform::UniformGrid;
use crate::unstructured::UnstructuredGrid;

/// Uniform grid with `dim` points per axis, unit spacing, origin at zero.
pub fn uniform_cube(dim: Id) -> UniformGrid {
    let max = dim as i32 - 1;
    UniformGrid::new(
        Vector3::ZERO,
        Vector3::ONE,
        Extent3::new(make_id3(0, 0, 0), make_id3(max, max, max)),
    )
}

/// A uniform grid with a non-zero origin, anisotropic spacing, and an
/// extent whose minimum is not at zero. Shakes out index-offset bugs.
pub fn reference_uniform() -> UniformGrid {
    UniformGrid::new(
        make_vector3(1.0, -0.5, 13.0),
        make_vector3(2.5, 6.25, 1.0),
        Extent3::new(make_id3(5, -2, -7), make_id3(20, 4, 10)),
    )
}

/// Cuts every hexahedron of `uniform` into cells of `shape`.
///
/// Points are copied from `uniform` in flat point order. Cell `c` of the
/// uniform grid becomes cells `c * k .. (c + 1) * k` of the result, where
/// `k = shape.cells_per_hexahedron()`.
pub fn decompose_uniform(uniform: &UniformGrid, shape: CellShape) -> DaxResult<UnstructuredGrid> {
    let topology = uniform.topology();
    let points = (0..topology.number_of_points())
        .map(|p| topology.point_coordinates(p))
        .collect::<DaxResult<Vec<_>>>()?;

    let decomposition = shape.hexahedron_decomposition();
    let mut connections = Vec::with_capacity(
        topology.number_of_cells() * decomposition.len() * shape.num_points(),
    );
    for cell_index in 0..topology.number_of_cells() {
        let hexahedron: CellVertices = topology.cell_connections(cell_index)?;
        for local in decomposition {
            connections.extend(local.iter().map(|&vertex| hexahedron[vertex]));
        }
    }

    UnstructuredGrid::new(shape, connections, points)
}

/// Shears point coordinates so that no cell is axis aligned:
/// `x += z / 2`, `y += z`.
pub fn perturb_coordinates(points: &mut [Vector3]) {
    for point in points {
        point.x += 0.5 * point.z;
        point.y += point.z;
    }
}

/// A grid of either topology kind, for iterating over every test case.
#[derive(Debug, Clone, PartialEq)]
pub enum TestGrid {
    Uniform(UniformGrid),
    Unstructured(UnstructuredGrid),
}

impl TestGrid {
    /// Label for test output: the shape name, prefixed for uniform grids.
    pub fn label(&self) -> String {
        match self {
            TestGrid::Uniform(_) => "uniform hexahedron".to_string(),
            TestGrid::Unstructured(grid) => format!("unstructured {}", grid.shape().name()),
        }
    }
}

impl Topology for TestGrid {
    fn cell_shape(&self) -> CellShape {
        match self {
            TestGrid::Uniform(grid) => grid.cell_shape(),
            TestGrid::Unstructured(grid) => grid.cell_shape(),
        }
    }

    fn number_of_points(&self) -> Id {
        match self {
            TestGrid::Uniform(grid) => grid.number_of_points(),
            TestGrid::Unstructured(grid) => grid.number_of_points(),
        }
    }

    fn number_of_cells(&self) -> Id {
        match self {
            TestGrid::Uniform(grid) => grid.number_of_cells(),
            TestGrid::Unstructured(grid) => grid.number_of_cells(),
        }
    }

    fn cell_connections(&self, cell_index: Id) -> DaxResult<CellVertices> {
        match self {
            TestGrid::Uniform(grid) => grid.cell_connections(cell_index),
            TestGrid::Unstructured(grid) => grid.cell_connections(cell_index),
        }
    }

    fn point_coordinates(&self, point_index: Id) -> DaxResult<Vector3> {
        match self {
            TestGrid::Uniform(grid) => grid.point_coordinates(point_index),
            TestGrid::Unstructured(grid) => grid.point_coordinates(point_index),
        }
    }

    fn domain_length(&self, domain: Domain) -> Id {
        match self {
            TestGrid::Uniform(grid) => grid.domain_length(domain),
            TestGrid::Unstructured(grid) => grid.domain_length(domain),
        }
    }
}

/// The uniform cube of `dim` points per axis followed by its decomposition
/// into every cell shape, with perturbed coordinates for the unstructured
/// grids.
pub fn all_test_grids(dim: Id) -> DaxResult<Vec<TestGrid>> {
    let uniform = uniform_cube(dim);
    let mut grids = Vec::with_capacity(CellShape::ALL.len() + 1);
    grids.push(TestGrid::Uniform(uniform.clone()));
    for shape in CellShape::ALL {
        let mut grid = decompose_uniform(&uniform, shape)?;
        perturb_coordinates(grid.points_mut());
        grids.push(TestGrid::Unstructured(grid));
    }
    Ok(grids)
}
