//! Parallel execution of geometry tasks
use crate::{
    Error,
    config::Parallelism,
    error::{CalculatorError, chain},
    mesh::Mesh,
    task::MeshTask,
};
use log::{debug, error, info};
use rayon::prelude::*;

/// Pool on which mesh tasks are run
///
/// [`Executor::new`] builds a dedicated pool; [`ThreadPool::Global`] shares
/// Rayon's global pool with the rest of the process.
pub enum ThreadPool {
    /// User-provided pool
    Custom(rayon::ThreadPool),
    /// Global Rayon pool
    Global,
}

impl ThreadPool {
    /// Runs a function across the thread pool
    pub fn run<F: FnOnce() -> V + Send, V: Send>(&self, f: F) -> V {
        match self {
            ThreadPool::Custom(p) => p.install(f),
            ThreadPool::Global => f(),
        }
    }

    /// Returns the number of threads in the pool
    pub fn thread_count(&self) -> usize {
        match self {
            ThreadPool::Custom(p) => p.current_num_threads(),
            ThreadPool::Global => rayon::current_num_threads(),
        }
    }
}

/// Runs [`MeshTask`]s and merges their results
///
/// With no pool, tasks run in order on the calling thread.
pub struct Executor {
    pool: Option<ThreadPool>,
}

impl Executor {
    /// Builds an executor which runs every task on the calling thread
    pub fn sequential() -> Self {
        Self { pool: None }
    }

    /// Builds an executor using the given pool
    pub fn with_pool(pool: ThreadPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Builds an executor with a dedicated pool of `threads` workers
    ///
    /// A single thread selects sequential execution.
    pub fn new(threads: usize) -> Result<Self, Error> {
        if threads <= 1 {
            return Ok(Self::sequential());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        Ok(Self::with_pool(ThreadPool::Custom(pool)))
    }

    /// Builds an executor from configuration
    ///
    /// The thread count is the smaller of the hardware concurrency and the
    /// configured limit.  When the limit does not constrain it, tasks run on
    /// [`ThreadPool::Global`] instead of a dedicated pool.
    pub fn from_config(cfg: &Parallelism) -> Result<Self, Error> {
        if !cfg.active {
            return Ok(Self::sequential());
        }
        let hw = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        if hw > 1 && cfg.thread_limit >= hw {
            Ok(Self::with_pool(ThreadPool::Global))
        } else {
            Self::new(hw.min(cfg.thread_limit))
        }
    }

    /// Number of threads used to run tasks
    pub fn thread_count(&self) -> usize {
        self.pool.as_ref().map(|p| p.thread_count()).unwrap_or(1)
    }

    /// Runs every task, blocking until all have finished
    ///
    /// Results are in the same order as the input tasks.
    pub fn run(
        &self,
        tasks: Vec<MeshTask>,
    ) -> Vec<Result<Mesh, CalculatorError>> {
        let start = std::time::Instant::now();
        let n = tasks.len();
        let out = match &self.pool {
            None => tasks.into_iter().map(MeshTask::run).collect(),
            Some(pool) => pool.run(|| {
                tasks.into_par_iter().map(MeshTask::run).collect()
            }),
        };
        debug!(
            "ran {n} tasks on {} thread(s) in {:?}",
            self.thread_count(),
            start.elapsed()
        );
        out
    }

    /// Runs every task and merges the successful results
    pub fn run_and_merge(&self, tasks: Vec<MeshTask>) -> Mesh {
        let labels: Vec<String> =
            tasks.iter().map(|t| t.label().to_owned()).collect();
        let results = self.run(tasks);
        merge(results, &labels)
    }
}

/// Joins task results into a single mesh, in order
///
/// Failed results are logged along with their label and skipped.
pub fn merge(
    results: Vec<Result<Mesh, CalculatorError>>,
    labels: &[String],
) -> Mesh {
    let mut out = Mesh::new();
    let mut failed = 0;
    for (i, r) in results.into_iter().enumerate() {
        let label = labels.get(i).map(String::as_str).unwrap_or("?");
        match r {
            Ok(m) => out.append(m),
            Err(e) => {
                failed += 1;
                error!("mesh task #{i} ({label}) failed:\n{}", chain(&e));
            }
        }
    }
    info!(
        "merged mesh has {} vertices and {} triangles ({failed} task(s) \
         failed)",
        out.vertices.len(),
        out.triangles.len()
    );
    out
}
