//! Task tree runner.

use std::ops::AddAssign;

use rayon::prelude::*;

use super::{StepReport, Task, TaskContext, TaskError};

/// Aggregated outcome of a task tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub steps: usize,
    pub written: usize,
    pub failures: usize,
}

impl From<StepReport> for Summary {
    fn from(report: StepReport) -> Self {
        Self {
            steps: 1,
            written: report.written,
            failures: report.failures.len(),
        }
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, rhs: Self) {
        self.steps += rhs.steps;
        self.written += rhs.written;
        self.failures += rhs.failures;
    }
}

/// Run a task tree to completion.
///
/// A sequence stops at its first fatal error. A parallel group runs every
/// member on the rayon pool, waits for all of them, and returns the first
/// fatal error in declaration order.
pub fn run(task: &Task, ctx: &TaskContext) -> Result<Summary, TaskError> {
    match task {
        Task::Step(step) => step.run(ctx).map(Summary::from),

        Task::Sequence(tasks) => {
            let mut summary = Summary::default();
            for task in tasks {
                summary += run(task, ctx)?;
            }
            Ok(summary)
        }

        Task::Parallel(tasks) => {
            let results: Vec<_> = tasks.par_iter().map(|task| run(task, ctx)).collect();

            let mut summary = Summary::default();
            let mut first_error = None;
            for result in results {
                match result {
                    Ok(part) => summary += part,
                    Err(e) if first_error.is_none() => first_error = Some(e),
                    Err(e) => crate::debug!("task"; "suppressed: {}", e),
                }
            }
            first_error.map_or(Ok(summary), Err)
        }
    }
}
