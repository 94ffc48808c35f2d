//! Benchmark runner: executes scenarios on a device and collects metrics.

use std::time::Instant;

use dax_cont::{
    ArrayHandle, ExecutionTopology, ExtractTopology, Field, Scheduler, Topology, Worklet,
};
use dax_device::{
    DeviceAdapter, DeviceAdapterDebug, DeviceAdapterKernel, DeviceAdapterThreaded, DeviceConfig,
    ErrorHandler,
};
use dax_grid::{Cell, TestGrid, Topology as GridTopology};
use dax_types::{DaxResult, Domain, Vector3};
use tracing::info;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, Workload};

struct CellCentroid;

impl Worklet for CellCentroid {
    const DOMAIN: Domain = Domain::Cell;
    type Values = (Cell, Vector3);

    fn execute(&self, (cell, centroid): &mut (Cell, Vector3), _errors: &ErrorHandler) {
        *centroid = cell.centroid();
    }
}

/// Runs one repetition of `workload`, returning the number of output values.
fn run_workload<G, D>(scheduler: &Scheduler<D>, workload: Workload, grid: &G) -> DaxResult<usize>
where
    G: ExecutionTopology<D>,
    D: DeviceAdapter,
{
    match workload {
        Workload::ExtractTopology => {
            let extracted = ExtractTopology::new(scheduler, grid)?;
            Ok(extracted.into_topology().len())
        }
        Workload::CellCentroids => {
            let mut centroids = ArrayHandle::<Vector3, D>::new();
            scheduler.invoke(
                &CellCentroid,
                (Topology::new(grid), Field::output(&mut centroids)),
            )?;
            Ok(centroids.into_vec().len())
        }
    }
}

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Times every repetition of `scenario` on the scheduler's device.
    pub fn run<D: DeviceAdapter>(
        scenario: &Scenario,
        scheduler: &Scheduler<D>,
    ) -> DaxResult<BenchmarkMetrics> {
        let mut run_times: Vec<f64> = Vec::with_capacity(scenario.repetitions as usize);
        let mut output_values = 0;

        let total_start = Instant::now();
        for _ in 0..scenario.repetitions {
            let start = Instant::now();
            output_values = match &scenario.grid {
                TestGrid::Uniform(grid) => run_workload(scheduler, scenario.workload, grid)?,
                TestGrid::Unstructured(grid) => run_workload(scheduler, scenario.workload, grid)?,
            };
            run_times.push(start.elapsed().as_secs_f64());
        }
        let total_wall_time = total_start.elapsed().as_secs_f64();

        let avg_run = if run_times.is_empty() {
            0.0
        } else {
            run_times.iter().sum::<f64>() / run_times.len() as f64
        };
        let min_run = run_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_run = run_times.iter().copied().fold(0.0, f64::max);

        let metrics = BenchmarkMetrics {
            scenario: scenario.name(),
            device: scheduler.device().name().to_string(),
            number_of_points: scenario.grid.number_of_points(),
            number_of_cells: scenario.grid.number_of_cells(),
            repetitions: scenario.repetitions,
            total_wall_time,
            avg_run_time: avg_run,
            min_run_time: if run_times.is_empty() { 0.0 } else { min_run },
            max_run_time: max_run,
            output_values,
        };
        info!(
            scenario = %metrics.scenario,
            device = %metrics.device,
            avg_ms = metrics.avg_run_time * 1000.0,
            "benchmark complete"
        );
        Ok(metrics)
    }

    /// Runs every scenario on one device.
    pub fn run_all<D: DeviceAdapter>(
        scenarios: &[Scenario],
        scheduler: &Scheduler<D>,
    ) -> DaxResult<Vec<BenchmarkMetrics>> {
        scenarios
            .iter()
            .map(|scenario| Self::run(scenario, scheduler))
            .collect()
    }

    /// Runs `scenario` on the debug, threaded, and kernel devices, the
    /// parallel ones configured by `config`.
    pub fn compare_devices(
        scenario: &Scenario,
        config: &DeviceConfig,
    ) -> DaxResult<Vec<BenchmarkMetrics>> {
        Ok(vec![
            Self::run(scenario, &Scheduler::new(DeviceAdapterDebug))?,
            Self::run(
                scenario,
                &Scheduler::new(DeviceAdapterThreaded::with_config(config)?),
            )?,
            Self::run(
                scenario,
                &Scheduler::new(DeviceAdapterKernel::with_config(config)?),
            )?,
        ])
    }
}
