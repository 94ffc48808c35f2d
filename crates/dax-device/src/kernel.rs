//! Kernel-launch adapter.
//!
//! Mirrors how a GPU runs a kernel: the instance range is mapped onto a
//! grid of `blocks × threads_per_block` logical threads. When there are
//! more instances than threads in the grid, each thread strides through
//! the range by the grid size. Blocks run concurrently on rayon; threads
//! within a block run in order.
//!
//! Execution arrays live in [`DeviceContainer`]s, a memory space reached
//! only through explicit transfers.

use dax_types::{DaxResult, Element, Id};
use rayon::prelude::*;
use tracing::debug;

use crate::adapter::DeviceAdapter;
use crate::config::DeviceConfig;
use crate::container::DeviceContainer;
use crate::error_handler::ErrorHandler;

/// Launch geometry for one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchDimensions {
    pub blocks: usize,
    pub threads_per_block: usize,
}

impl LaunchDimensions {
    /// Total logical threads in the grid.
    pub fn grid_size(&self) -> usize {
        self.blocks * self.threads_per_block
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceAdapterKernel {
    threads_per_block: usize,
    max_blocks: usize,
}

impl Default for DeviceAdapterKernel {
    fn default() -> Self {
        let config = DeviceConfig::default();
        Self {
            threads_per_block: config.threads_per_block,
            max_blocks: config.max_blocks,
        }
    }
}

impl DeviceAdapterKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter with the launch limits from `config`.
    pub fn with_config(config: &DeviceConfig) -> DaxResult<Self> {
        config.validate()?;
        Ok(Self {
            threads_per_block: config.threads_per_block,
            max_blocks: config.max_blocks,
        })
    }

    /// Launch geometry used for `num_instances` invocations: enough blocks
    /// to give every instance its own thread, capped at `max_blocks`.
    pub fn launch_dimensions(&self, num_instances: Id) -> LaunchDimensions {
        let blocks = num_instances
            .div_ceil(self.threads_per_block)
            .min(self.max_blocks);
        LaunchDimensions {
            blocks,
            threads_per_block: self.threads_per_block,
        }
    }
}

impl DeviceAdapter for DeviceAdapterKernel {
    type Container<T: Element> = DeviceContainer<T>;

    fn name(&self) -> &'static str {
        "kernel"
    }

    fn separate_memory_space(&self) -> bool {
        true
    }

    fn schedule<P, F>(&self, functor: F, parameters: &P, num_instances: Id) -> DaxResult<()>
    where
        P: Sync + ?Sized,
        F: Fn(&P, Id, &ErrorHandler) + Sync,
    {
        let launch = self.launch_dimensions(num_instances);
        debug!(
            device = self.name(),
            num_instances,
            blocks = launch.blocks,
            threads_per_block = launch.threads_per_block,
            "launch"
        );
        let errors = ErrorHandler::new();
        let grid_size = launch.grid_size();
        (0..launch.blocks).into_par_iter().for_each(|block| {
            for thread in 0..launch.threads_per_block {
                let mut index = block * launch.threads_per_block + thread;
                while index < num_instances {
                    functor(parameters, index, &errors);
                    index += grid_size;
                }
            }
        });
        errors.into_result()
    }
}
