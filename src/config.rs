//! Configuration management for the co-occurrence cluster analyzer

use crate::error::{PipelineError, Result};

/// Default configuration for a clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Weight a matrix-power entry must strictly exceed to count as a relationship
    pub theta: f64,

    /// Highest matrix power to examine; zero or negative requests no clustering
    pub depth: i64,

    /// Emit partner -> marker maps instead of plain partner sets
    pub dictionary_form: bool,

    /// Keep only the first N documents before counting
    pub max_documents: Option<usize>,

    /// Worker threads (0 = use all available cores)
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theta: 0.4,
            depth: 1,
            dictionary_form: true,
            max_documents: None,
            threads: 0,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        theta: f64,
        depth: i64,
        dictionary_form: bool,
        max_documents: Option<usize>,
        threads: usize,
    ) -> Self {
        Self {
            theta,
            depth,
            dictionary_form,
            max_documents,
            threads,
        }
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// The sign of `theta` is not constrained and a non-positive `depth` is a
    /// valid request for the no-result outcome.
    pub fn validate(&self) -> Result<()> {
        if !self.theta.is_finite() {
            return Err(PipelineError::InvalidConfig(format!(
                "theta must be finite, got {}",
                self.theta
            )));
        }
        Ok(())
    }

    /// Resolve the configured thread count
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get()
        }
    }
}
