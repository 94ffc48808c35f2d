//! Thread-pool adapter.
//!
//! A parallel-for over rayon. Work is split across the pool by rayon's
//! work stealing; each index is visited exactly once.

use std::sync::Arc;

use dax_types::{DaxError, DaxResult, Element, Id};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::adapter::DeviceAdapter;
use crate::config::DeviceConfig;
use crate::container::HostContainer;
use crate::error_handler::ErrorHandler;

/// Parallel-for on the global rayon pool, or on a dedicated pool when
/// configured with `num_threads`.
#[derive(Debug, Clone, Default)]
pub struct DeviceAdapterThreaded {
    pool: Option<Arc<ThreadPool>>,
}

impl DeviceAdapterThreaded {
    /// Creates an adapter that runs on the global rayon pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter from configuration. A dedicated pool is built
    /// when `config.num_threads` is set.
    pub fn with_config(config: &DeviceConfig) -> DaxResult<Self> {
        config.validate()?;
        let pool = match config.num_threads {
            Some(num_threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .thread_name(|i| format!("dax-worker-{i}"))
                    .build()
                    .map_err(|e| DaxError::InvalidConfig(format!("thread pool: {e}")))?;
                Some(Arc::new(pool))
            }
            None => None,
        };
        Ok(Self { pool })
    }

    /// Number of worker threads invocations are spread over.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl DeviceAdapter for DeviceAdapterThreaded {
    type Container<T: Element> = HostContainer<T>;

    fn name(&self) -> &'static str {
        "threaded"
    }

    fn schedule<P, F>(&self, functor: F, parameters: &P, num_instances: Id) -> DaxResult<()>
    where
        P: Sync + ?Sized,
        F: Fn(&P, Id, &ErrorHandler) + Sync,
    {
        debug!(
            device = self.name(),
            num_instances,
            num_threads = self.num_threads(),
            "schedule"
        );
        let errors = ErrorHandler::new();
        let run = || {
            (0..num_instances)
                .into_par_iter()
                .for_each(|index| functor(parameters, index, &errors));
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
        errors.into_result()
    }
}
