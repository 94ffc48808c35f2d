//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Device adapter name.
    pub device: String,
    pub number_of_points: usize,
    pub number_of_cells: usize,
    pub repetitions: u32,
    /// Total wall-clock time over all repetitions (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per repetition (seconds).
    pub avg_run_time: f64,
    pub min_run_time: f64,
    pub max_run_time: f64,
    /// Values produced by one repetition.
    pub output_values: usize,
}

impl BenchmarkMetrics {
    /// Returns the CSV header row.
    pub fn to_csv_header() -> String {
        "scenario,device,points,cells,repetitions,total_wall_time_s,avg_run_ms,min_run_ms,max_run_ms,cells_per_s,output_values".to_string()
    }

    /// Cells processed per second, averaged over repetitions.
    pub fn cells_per_second(&self) -> f64 {
        if self.avg_run_time > 0.0 {
            self.number_of_cells as f64 / self.avg_run_time
        } else {
            0.0
        }
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.3e},{}",
            self.scenario,
            self.device,
            self.number_of_points,
            self.number_of_cells,
            self.repetitions,
            self.total_wall_time,
            self.avg_run_time * 1000.0,
            self.min_run_time * 1000.0,
            self.max_run_time * 1000.0,
            self.cells_per_second(),
            self.output_values,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
