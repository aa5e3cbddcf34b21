//! Worker pool construction.

use tokio::runtime::{Builder, Runtime};

/// Available hardware parallelism, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builds the multi-threaded runtime that runs the accept loop and every
/// session. `workers` is clamped to at least one.
pub fn build(workers: usize) -> std::io::Result<Runtime> {
    let workers = workers.max(1);
    tracing::debug!(workers, "Building runtime");

    Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_name("arikitari-worker")
        .enable_all()
        .build()
}
