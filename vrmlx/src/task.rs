//! Deferred geometry computations
use crate::{error::CalculatorError, mesh::Mesh};

type Job = Box<dyn FnOnce() -> Result<Mesh, CalculatorError> + Send>;

/// A single geometry computation, ready to run on any thread
///
/// Tasks own every input they need; they hold no references into the scene
/// tree.
pub struct MeshTask {
    label: String,
    job: Job,
}

impl MeshTask {
    /// Builds a task from a label and a closure
    pub fn new<F>(label: impl Into<String>, job: F) -> Self
    where
        F: FnOnce() -> Result<Mesh, CalculatorError> + Send + 'static,
    {
        Self {
            label: label.into(),
            job: Box::new(job),
        }
    }

    /// Short description used when logging
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs the computation, consuming the task
    pub fn run(self) -> Result<Mesh, CalculatorError> {
        (self.job)()
    }
}

impl std::fmt::Debug for MeshTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshTask")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
