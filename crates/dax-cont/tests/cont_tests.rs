//! Integration tests for dax-cont.

use std::sync::atomic::{AtomicUsize, Ordering};

use dax_cont::{
    stream_compact, ArrayHandle, ExecutionTopology, ExtractTopology, Field, FieldPoints,
    Scheduler, Topology, Worklet,
};
use dax_device::{
    DeviceAdapter, DeviceAdapterDebug, DeviceAdapterKernel, DeviceAdapterThreaded, DeviceConfig,
    ErrorHandler,
};
use dax_grid::generators::{all_test_grids, decompose_uniform, reference_uniform, uniform_cube};
use dax_grid::{Cell, CellField, CellShape, TestGrid, Topology as GridTopology, UnstructuredGrid};
use dax_telemetry::{EventBus, EventKind, TransferDirection, VecSink};
use dax_types::{DaxError, Domain, Id, Vector3};
use glam::Vec3;

// ─── Worklets ─────────────────────────────────────────────────

struct Square;

impl Worklet for Square {
    const DOMAIN: Domain = Domain::Point;
    type Values = (f32, f32);

    fn execute(&self, (x, y): &mut (f32, f32), _errors: &ErrorHandler) {
        *y = *x * *x;
    }
}

struct Scale(f32);

impl Worklet for Scale {
    const DOMAIN: Domain = Domain::Point;
    type Values = (f32,);

    fn execute(&self, (x,): &mut (f32,), _errors: &ErrorHandler) {
        *x *= self.0;
    }
}

/// Copies input to output, raising on negative values.
struct RejectNegative;

impl Worklet for RejectNegative {
    const DOMAIN: Domain = Domain::Point;
    type Values = (f32, f32);

    fn execute(&self, (x, y): &mut (f32, f32), errors: &ErrorHandler) {
        if *x < 0.0 {
            errors.raise(format!("negative value {x}"));
        }
        *y = *x;
    }
}

/// Offsets point ids in place, raising on id 0.
struct OffsetNonZeroIds;

impl Worklet for OffsetNonZeroIds {
    const DOMAIN: Domain = Domain::Point;
    type Values = (Id,);

    fn execute(&self, (id,): &mut (Id,), errors: &ErrorHandler) {
        if *id == 0 {
            errors.raise("point id 0 is not allowed");
        }
        *id += 100;
    }
}

struct CountCalls<'c>(&'c AtomicUsize);

impl Worklet for CountCalls<'_> {
    const DOMAIN: Domain = Domain::Point;
    type Values = (f32, f32);

    fn execute(&self, _values: &mut (f32, f32), _errors: &ErrorHandler) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

struct CellCentroid;

impl Worklet for CellCentroid {
    const DOMAIN: Domain = Domain::Cell;
    type Values = (Cell, Vector3);

    fn execute(&self, (cell, centroid): &mut (Cell, Vector3), _errors: &ErrorHandler) {
        *centroid = cell.centroid();
    }
}

/// Same values as `CellCentroid`, but declared over points.
struct PointCentroid;

impl Worklet for PointCentroid {
    const DOMAIN: Domain = Domain::Point;
    type Values = (Cell, Vector3);

    fn execute(&self, (cell, centroid): &mut (Cell, Vector3), _errors: &ErrorHandler) {
        *centroid = cell.centroid();
    }
}

struct CellAverage;

impl Worklet for CellAverage {
    const DOMAIN: Domain = Domain::Cell;
    type Values = (CellField<f32>, f32);

    fn execute(&self, (values, mean): &mut (CellField<f32>, f32), _errors: &ErrorHandler) {
        *mean = values.iter().sum::<f32>() / values.len() as f32;
    }
}

fn small_kernel() -> DeviceAdapterKernel {
    DeviceAdapterKernel::with_config(&DeviceConfig {
        threads_per_block: 8,
        max_blocks: 2,
        ..Default::default()
    })
    .unwrap()
}

// ─── Scheduler Tests ──────────────────────────────────────────

fn squares<D: DeviceAdapter>(device: D, input: &[f32]) -> Vec<f32> {
    let scheduler = Scheduler::new(device);
    let mut x = ArrayHandle::<f32, D>::from_vec(input.to_vec());
    let mut y = ArrayHandle::<f32, D>::new();
    scheduler
        .invoke(&Square, (Field::input(&mut x), Field::output(&mut y)))
        .unwrap();
    y.into_vec()
}

#[test]
fn worklet_results_match_across_devices() {
    let input: Vec<f32> = (0..1000).map(|i| (i as f32).sin() * 3.0).collect();
    let expected = squares(DeviceAdapterDebug, &input);
    assert_eq!(expected.len(), 1000);
    assert_eq!(squares(DeviceAdapterThreaded::new(), &input), expected);
    assert_eq!(squares(DeviceAdapterKernel::new(), &input), expected);
    assert_eq!(squares(small_kernel(), &input), expected);
}

#[test]
fn empty_domain_runs_nothing() {
    let calls = AtomicUsize::new(0);
    let scheduler = Scheduler::new(DeviceAdapterThreaded::new());
    let mut x = ArrayHandle::<f32, _>::new();
    let mut y = ArrayHandle::<f32, _>::from_vec(vec![1.0]);
    scheduler
        .invoke(&CountCalls(&calls), (Field::input(&mut x), Field::output(&mut y)))
        .unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert!(y.into_vec().is_empty());
}

#[test]
fn in_out_field_updates_in_place() {
    let scheduler = Scheduler::new(small_kernel());
    let mut x = ArrayHandle::from_vec(vec![1.0f32, -2.0, 0.5]);
    scheduler.invoke(&Scale(4.0), (Field::in_out(&mut x),)).unwrap();
    scheduler.invoke(&Scale(0.5), (Field::in_out(&mut x),)).unwrap();
    assert_eq!(x.into_vec(), vec![2.0, -4.0, 1.0]);
}

#[test]
fn scheduler_shared_between_threads() {
    let sink = VecSink::new();
    let mut scheduler =
        Scheduler::new(DeviceAdapterThreaded::new()).with_events(EventBus::new().with_sink(sink.clone()));
    std::thread::scope(|scope| {
        for t in 0..4 {
            let scheduler = &scheduler;
            scope.spawn(move || {
                let mut x = ArrayHandle::from_vec(vec![t as f32; 50]);
                scheduler.invoke(&Scale(2.0), (Field::in_out(&mut x),)).unwrap();
                assert_eq!(x.into_vec(), vec![2.0 * t as f32; 50]);
            });
        }
    });
    assert_eq!(scheduler.invocation_count(), 4);
    scheduler.events_mut().unwrap().flush();
    let ends = sink
        .events()
        .iter()
        .filter(|e| matches!(e.kind, EventKind::ScheduleEnd { .. }))
        .count();
    assert_eq!(ends, 4);
}

#[test]
fn domain_mismatch_rejected_before_scheduling() {
    let calls = AtomicUsize::new(0);
    let scheduler = Scheduler::new(DeviceAdapterDebug);
    let mut a = ArrayHandle::from_vec(vec![1.0f32; 4]);
    let mut b = ArrayHandle::from_vec(vec![2.0f32; 5]);
    let result = scheduler.invoke(&CountCalls(&calls), (Field::input(&mut a), Field::in_out(&mut b)));
    match result {
        Err(DaxError::DomainMismatch {
            domain,
            expected,
            actual,
            ..
        }) => {
            assert_eq!(domain, Domain::Point);
            assert_eq!((expected, actual), (4, 5));
        }
        other => panic!("expected domain mismatch, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert!(!a.is_execution_valid());
    assert_eq!(b.into_vec(), vec![2.0; 5]);
}

#[test]
fn unconstrained_domain_is_rejected() {
    let scheduler = Scheduler::new(DeviceAdapterDebug);
    let mut y = ArrayHandle::<f32, _>::new();
    let result = scheduler.invoke(&Scale(2.0), (Field::output(&mut y),));
    assert!(matches!(result, Err(DaxError::InvalidArgument(_))));
}

fn reject_negative<D: DeviceAdapter>(device: D) {
    let scheduler = Scheduler::new(device);
    let mut x = ArrayHandle::<f32, D>::from_vec(vec![1.0, 2.0, -3.0, 4.0]);
    let mut y = ArrayHandle::<f32, D>::from_vec(vec![9.0; 4]);
    let result = scheduler.invoke(&RejectNegative, (Field::input(&mut x), Field::output(&mut y)));
    match result {
        Err(DaxError::Execution(message)) => assert_eq!(message, "negative value -3"),
        other => panic!("expected execution error, got {other:?}"),
    }
    assert_eq!(y.into_vec(), vec![9.0; 4]);
}

#[test]
fn failed_invocation_does_not_copy_back() {
    reject_negative(DeviceAdapterDebug);
    reject_negative(DeviceAdapterThreaded::new());
    reject_negative(small_kernel());
}

#[test]
fn failed_in_place_keeps_control_values() {
    let scheduler = Scheduler::new(DeviceAdapterDebug);
    let mut x = ArrayHandle::from_vec(vec![-1.0f32, 2.0]);
    let mut y = ArrayHandle::from_vec(vec![0.0f32; 2]);
    assert!(scheduler
        .invoke(&RejectNegative, (Field::input(&mut x), Field::in_out(&mut y)))
        .is_err());
    assert_eq!(y.into_vec(), vec![0.0, 0.0]);
}

#[test]
fn kernel_device_transfers_through_device_containers() {
    use dax_device::ArrayContainerExecution;

    let scheduler = Scheduler::new(DeviceAdapterKernel::new());
    let mut x = ArrayHandle::from_vec(vec![3.0f32; 10]);
    let mut y = ArrayHandle::new();
    scheduler
        .invoke(&Square, (Field::input(&mut x), Field::output(&mut y)))
        .unwrap();
    let stats = x.execution_container().transfer_stats();
    assert_eq!(stats.to_device_bytes, 40);
    assert_eq!(y.execution_container().len(), 10);
    assert_eq!(y.execution_container().transfer_stats().to_host_bytes, 40);
    assert_eq!(y.into_vec(), vec![9.0; 10]);
}

// ─── Grid Argument Tests ──────────────────────────────────────

fn centroids<G: ExecutionTopology<D>, D: DeviceAdapter>(device: D, grid: &G) -> Vec<Vector3> {
    let scheduler = Scheduler::new(device);
    let mut out = ArrayHandle::<Vector3, D>::new();
    scheduler
        .invoke(&CellCentroid, (Topology::new(grid), Field::output(&mut out)))
        .unwrap();
    out.into_vec()
}

#[test]
fn topology_argument_on_uniform_and_unstructured() {
    let uniform = reference_uniform();
    let hexahedra = decompose_uniform(&uniform, CellShape::Hexahedron).unwrap();
    let expected = centroids(DeviceAdapterDebug, &uniform);
    assert_eq!(expected.len(), uniform.number_of_cells());
    assert_eq!(expected[0], Vec3::new(2.25, 2.625, 13.5));
    assert_eq!(centroids(DeviceAdapterThreaded::new(), &uniform), expected);
    assert_eq!(centroids(small_kernel(), &hexahedra), expected);
}

#[test]
fn point_field_gathered_per_cell() {
    let grid = uniform_cube(3);
    let x_coordinates: Vec<f32> = (0..grid.number_of_points())
        .map(|p| grid.point_coordinates(p).unwrap().x)
        .collect();
    let scheduler = Scheduler::new(DeviceAdapterThreaded::new());
    let mut field = ArrayHandle::from_vec(x_coordinates);
    let mut means = ArrayHandle::new();
    scheduler
        .invoke(&CellAverage, (FieldPoints::new(&grid, &mut field), Field::output(&mut means)))
        .unwrap();
    let means = means.into_vec();
    let expected = centroids(DeviceAdapterDebug, &grid);
    assert_eq!(means.len(), 8);
    for (mean, centroid) in means.iter().zip(&expected) {
        assert!((mean - centroid.x).abs() < 1e-6);
    }
}

#[test]
fn point_field_length_must_match_grid() {
    let grid = uniform_cube(2);
    let scheduler = Scheduler::new(DeviceAdapterDebug);
    let mut field = ArrayHandle::from_vec(vec![0.0f32; 7]);
    let mut means = ArrayHandle::new();
    let result =
        scheduler.invoke(&CellAverage, (FieldPoints::new(&grid, &mut field), Field::output(&mut means)));
    assert!(matches!(
        result,
        Err(DaxError::DomainMismatch {
            domain: Domain::Point,
            expected: 8,
            actual: 7,
            ..
        })
    ));
}

#[test]
fn topology_requires_cell_domain() {
    let grid = uniform_cube(2);
    let scheduler = Scheduler::new(DeviceAdapterDebug);
    let mut out = ArrayHandle::new();
    let result = scheduler.invoke(&PointCentroid, (Topology::new(&grid), Field::output(&mut out)));
    assert!(matches!(result, Err(DaxError::InvalidArgument(_))));
}

#[test]
fn bad_connection_detected_when_cell_is_built() {
    let grid =
        UnstructuredGrid::new(CellShape::Line, vec![0, 1, 1, 5], vec![Vec3::ZERO; 3]).unwrap();
    let scheduler = Scheduler::new(DeviceAdapterKernel::new());
    let mut out = ArrayHandle::new();
    let result = scheduler.invoke(&CellCentroid, (Topology::new(&grid), Field::output(&mut out)));
    match result {
        Err(DaxError::Execution(message)) => assert!(message.contains("Index 5 out of range")),
        other => panic!("expected execution error, got {other:?}"),
    }
    assert!(out.into_vec().is_empty());
}

// ─── Extraction Tests ─────────────────────────────────────────

fn extract_all<G: ExecutionTopology<D>, D: DeviceAdapter>(device: D, grid: &G) -> Vec<Id> {
    let scheduler = Scheduler::new(device);
    ExtractTopology::new(&scheduler, grid)
        .unwrap()
        .into_topology()
}

fn expected_topology<G: GridTopology>(grid: &G, cells: &[Id]) -> Vec<Id> {
    cells
        .iter()
        .flat_map(|&c| grid.cell_connections(c).unwrap().as_slice().to_vec())
        .collect()
}

#[test]
fn extract_unit_cube() {
    let grid = uniform_cube(2);
    let scheduler = Scheduler::new(DeviceAdapterDebug);
    let mut extracted = ExtractTopology::new(&scheduler, &grid).unwrap();
    assert_eq!(extracted.number_of_cells(), 1);
    assert_eq!(extracted.points_per_cell(), 8);
    assert_eq!(extracted.shape(), CellShape::Hexahedron);
    assert_eq!(extracted.topology(), &[0, 1, 3, 2, 4, 5, 7, 6]);

    assert_eq!(extract_all(DeviceAdapterThreaded::new(), &grid), vec![0, 1, 3, 2, 4, 5, 7, 6]);
    assert_eq!(extract_all(DeviceAdapterKernel::new(), &grid), vec![0, 1, 3, 2, 4, 5, 7, 6]);
}

fn failed_update_keeps_extracted<D: DeviceAdapter>(device: D) {
    let grid = uniform_cube(2);
    let scheduler = Scheduler::new(device);
    let mut extracted = ExtractTopology::new(&scheduler, &grid).unwrap();
    let result = scheduler.invoke(&OffsetNonZeroIds, (Field::in_out(extracted.topology_handle()),));
    assert!(matches!(result, Err(DaxError::Execution(_))));
    assert_eq!(extracted.topology_handle().len(), 8);
    assert_eq!(extracted.topology(), &[0, 1, 3, 2, 4, 5, 7, 6]);
}

#[test]
fn failed_in_place_update_keeps_extracted_topology() {
    failed_update_keeps_extracted(DeviceAdapterDebug);
    failed_update_keeps_extracted(DeviceAdapterThreaded::new());
    failed_update_keeps_extracted(small_kernel());
}

fn extract_test_grid<D: DeviceAdapter>(device: D, grid: &TestGrid) -> Vec<Id> {
    match grid {
        TestGrid::Uniform(grid) => extract_all(device, grid),
        TestGrid::Unstructured(grid) => extract_all(device, grid),
    }
}

#[test]
fn extract_every_grid_type() {
    for grid in all_test_grids(4).unwrap() {
        let cells: Vec<Id> = (0..grid.number_of_cells()).collect();
        let expected = expected_topology(&grid, &cells);
        assert_eq!(
            expected.len(),
            grid.number_of_cells() * grid.cell_shape().num_points()
        );
        assert_eq!(extract_test_grid(DeviceAdapterDebug, &grid), expected, "{}", grid.label());
        assert_eq!(
            extract_test_grid(DeviceAdapterThreaded::new(), &grid),
            expected,
            "{}",
            grid.label()
        );
        assert_eq!(extract_test_grid(small_kernel(), &grid), expected, "{}", grid.label());
    }
}

#[test]
fn extract_reference_grid_on_kernel() {
    let grid = reference_uniform();
    let cells: Vec<Id> = (0..grid.number_of_cells()).collect();
    assert_eq!(
        extract_all(DeviceAdapterKernel::new(), &grid),
        expected_topology(&grid, &cells)
    );
}

#[test]
fn extract_cell_subset_in_requested_order() {
    let grid = decompose_uniform(&uniform_cube(3), CellShape::Tetrahedron).unwrap();
    let scheduler = Scheduler::new(DeviceAdapterThreaded::new());
    for ids in [vec![5, 0, 47, 3], vec![3, 47, 0, 5]] {
        let mut handle = ArrayHandle::from_vec(ids.clone());
        let extracted = ExtractTopology::with_cells(&scheduler, &grid, &mut handle).unwrap();
        assert_eq!(extracted.number_of_cells(), 4);
        let topology = extracted.into_topology();
        assert_eq!(topology.len(), 4 * 4);
        assert_eq!(topology, expected_topology(&grid, &ids));
    }
}

#[test]
fn extract_empty_subset() {
    let grid = uniform_cube(3);
    let scheduler = Scheduler::new(DeviceAdapterDebug);
    let mut ids = ArrayHandle::new();
    let extracted = ExtractTopology::with_cells(&scheduler, &grid, &mut ids).unwrap();
    assert!(extracted.into_topology().is_empty());
}

#[test]
fn extract_rejects_out_of_range_id() {
    let grid = uniform_cube(3);
    let scheduler = Scheduler::new(small_kernel());
    let mut ids = ArrayHandle::from_vec(vec![1, 8, 2]);
    match ExtractTopology::with_cells(&scheduler, &grid, &mut ids) {
        Err(DaxError::Execution(message)) => {
            assert_eq!(message, "cell id 8 out of range for a grid of 8 cells")
        }
        Err(other) => panic!("expected execution error, got {other:?}"),
        Ok(_) => panic!("expected execution error"),
    }
}

// ─── Stream Compaction Tests ──────────────────────────────────

fn compact<D: DeviceAdapter>(device: D, stencil: &[u32]) -> Vec<Id> {
    let scheduler = Scheduler::new(device);
    let mut handle = ArrayHandle::<u32, D>::from_vec(stencil.to_vec());
    stream_compact(&scheduler, &mut handle).unwrap().into_vec()
}

#[test]
fn stream_compact_selects_non_default_entries() {
    let stencil = [0u32, 3, 0, 0, 7, 1, 0];
    assert_eq!(compact(DeviceAdapterDebug, &stencil), vec![1, 4, 5]);
    assert_eq!(compact(DeviceAdapterThreaded::new(), &stencil), vec![1, 4, 5]);
    assert_eq!(compact(small_kernel(), &stencil), vec![1, 4, 5]);
}

#[test]
fn stream_compact_edge_cases() {
    let scheduler = Scheduler::new(DeviceAdapterThreaded::new());
    let mut empty = ArrayHandle::<f32, _>::new();
    assert!(stream_compact(&scheduler, &mut empty).unwrap().is_empty());
    let mut zeros = ArrayHandle::from_vec(vec![0.0f32; 100]);
    assert!(stream_compact(&scheduler, &mut zeros).unwrap().is_empty());
    let mut ones = ArrayHandle::from_vec(vec![1u8; 300]);
    let all: Vec<Id> = (0..300).collect();
    assert_eq!(stream_compact(&scheduler, &mut ones).unwrap().into_vec(), all);
}

// ─── Telemetry Tests ──────────────────────────────────────────

#[test]
fn scheduler_emits_event_stream() {
    let sink = VecSink::new();
    let mut scheduler =
        Scheduler::new(DeviceAdapterDebug).with_events(EventBus::new().with_sink(sink.clone()));
    let mut x = ArrayHandle::from_vec(vec![1.0f32, 2.0]);
    let mut y = ArrayHandle::new();
    scheduler
        .invoke(&Square, (Field::input(&mut x), Field::output(&mut y)))
        .unwrap();
    scheduler
        .invoke(&Square, (Field::input(&mut x), Field::output(&mut y)))
        .unwrap();
    assert_eq!(scheduler.invocation_count(), 2);
    scheduler.events_mut().unwrap().flush();

    let events = sink.events();
    let kinds: Vec<&EventKind> = events.iter().map(|e| &e.kind).collect();
    assert!(matches!(
        kinds[0],
        EventKind::Transfer {
            direction: TransferDirection::ToExecution,
            bytes: 8
        }
    ));
    assert!(matches!(
        kinds[1],
        EventKind::ScheduleBegin { num_instances: 2, worklet, .. } if worklet == "Square"
    ));
    assert!(matches!(kinds[2], EventKind::ScheduleEnd { .. }));
    assert!(matches!(
        kinds[3],
        EventKind::Transfer {
            direction: TransferDirection::ToControl,
            bytes: 8
        }
    ));
    // The input is still resident, so the second invocation skips it.
    assert!(events[4..].iter().all(|e| e.invocation == 1));
    assert!(matches!(kinds[4], EventKind::ScheduleBegin { .. }));
}

#[test]
fn scheduler_reports_failures() {
    let sink = VecSink::new();
    let mut scheduler =
        Scheduler::new(DeviceAdapterThreaded::new()).with_events(EventBus::new().with_sink(sink.clone()));
    let mut x = ArrayHandle::from_vec(vec![-1.0f32]);
    let mut y = ArrayHandle::new();
    assert!(scheduler
        .invoke(&RejectNegative, (Field::input(&mut x), Field::output(&mut y)))
        .is_err());
    let mut a = ArrayHandle::from_vec(vec![1.0f32]);
    let mut b = ArrayHandle::from_vec(vec![1.0f32; 2]);
    assert!(scheduler
        .invoke(&Square, (Field::input(&mut a), Field::in_out(&mut b)))
        .is_err());
    scheduler.events_mut().unwrap().flush();

    let failures: Vec<u64> = sink
        .events()
        .iter()
        .filter(|e| e.is_failure())
        .map(|e| e.invocation)
        .collect();
    assert_eq!(failures, vec![0, 1]);
}
