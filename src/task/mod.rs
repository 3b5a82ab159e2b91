//! Task graph: steps composed with sequence and parallel combinators.
//!
//! ```text
//! clean ──► Parallel ┬─ styles
//!                    ├─ pages
//!                    ├─ scripts
//!                    ├─ copy images
//!                    ├─ convert images
//!                    └─ copy fonts / videos / docs
//! ```
//!
//! - `Sequence`: strict order, the first error aborts the remainder.
//! - `Parallel`: every member runs, completion waits for all, the first
//!   error is reported.
//!
//! Transform failures never surface as errors here: each step collects
//! them into its [`StepReport`] and hands them to the [`Notifier`].

pub mod binding;
mod context;
mod error;
mod scheduler;


pub use binding::{WatchBinding, WatchTable};
pub use context::{Notifier, TaskContext, Transforms};
pub use error::TaskError;
pub use scheduler::{Summary, run};

use std::fmt;

use crate::core::AssetClass;
use crate::pipeline;

/// A single unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Delete the whole output root
    CleanAll,
    /// Delete one class's output directory
    Clean(AssetClass),
    Pages,
    Styles,
    Scripts,
    CopyImages,
    ConvertImages,
    /// Verbatim copy (fonts, videos, docs)
    Copy(AssetClass),
    /// Signal connected browsers, tagged with the class that changed
    Reload(AssetClass),
}

impl Step {
    /// Class whose output the step writes, `None` for the global steps.
    pub fn class(self) -> Option<AssetClass> {
        match self {
            Self::CleanAll => None,
            Self::Clean(class) | Self::Copy(class) | Self::Reload(class) => Some(class),
            Self::Pages => Some(AssetClass::Pages),
            Self::Styles => Some(AssetClass::Styles),
            Self::Scripts => Some(AssetClass::Scripts),
            Self::CopyImages | Self::ConvertImages => Some(AssetClass::Images),
        }
    }

    /// Execute the step. Transform failures are reported, not returned.
    pub fn run(self, ctx: &TaskContext) -> Result<StepReport, TaskError> {
        crate::debug!("task"; "run {}", self);

        let report = match self {
            Self::CleanAll => return pipeline::clean::all(ctx),
            Self::Clean(class) => return pipeline::clean::class(ctx, class),
            Self::Reload(class) => {
                ctx.reload.reload(class.name());
                return Ok(StepReport::default());
            }
            Self::Pages => pipeline::pages::run(ctx)?,
            Self::Styles => pipeline::styles::run(ctx)?,
            Self::Scripts => pipeline::scripts::run(ctx)?,
            Self::CopyImages => pipeline::copy::run(ctx, AssetClass::Images)?,
            Self::ConvertImages => pipeline::images::convert(ctx)?,
            Self::Copy(class) => pipeline::copy::run(ctx, class)?,
        };

        if let Some(class) = self.class() {
            ctx.notifier.report(class, &report);
        }
        Ok(report)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CleanAll => f.write_str("clean"),
            Self::Clean(class) => write!(f, "clean {class}"),
            Self::Pages => f.write_str("pages"),
            Self::Styles => f.write_str("styles"),
            Self::Scripts => f.write_str("scripts"),
            Self::CopyImages => f.write_str("copy images"),
            Self::ConvertImages => f.write_str("convert images"),
            Self::Copy(class) => write!(f, "copy {class}"),
            Self::Reload(class) => write!(f, "reload ({class})"),
        }
    }
}

/// Composable task tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Step(Step),
    Sequence(Vec<Task>),
    Parallel(Vec<Task>),
}

impl From<Step> for Task {
    fn from(step: Step) -> Self {
        Self::Step(step)
    }
}

impl Task {
    pub fn sequence(steps: impl IntoIterator<Item = Step>) -> Self {
        Self::Sequence(steps.into_iter().map(Task::Step).collect())
    }

    /// Delete the output root.
    pub fn clean() -> Self {
        Self::Step(Step::CleanAll)
    }

    /// Every class built in one parallel group.
    pub fn build_all() -> Self {
        Self::Parallel(
            [
                Step::Styles,
                Step::Pages,
                Step::Scripts,
                Step::CopyImages,
                Step::ConvertImages,
                Step::Copy(AssetClass::Fonts),
                Step::Copy(AssetClass::Videos),
                Step::Copy(AssetClass::Documents),
            ]
            .into_iter()
            .map(Task::Step)
            .collect(),
        )
    }

    /// `clean` then `build_all`.
    pub fn clean_build() -> Self {
        Self::Sequence(vec![Self::clean(), Self::build_all()])
    }

    /// Steps in execution order (parallel members in declaration order).
    pub fn steps(&self) -> Vec<Step> {
        match self {
            Self::Step(step) => vec![*step],
            Self::Sequence(tasks) | Self::Parallel(tasks) => {
                tasks.iter().flat_map(Task::steps).collect()
            }
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Default)]
pub struct StepReport {
    /// Files written to the output tree
    pub written: usize,
    /// Recoverable transform failures
    pub failures: Vec<TaskError>,
}

impl StepReport {
    pub fn wrote(&mut self, count: usize) {
        self.written += count;
    }

    pub fn fail(&mut self, err: TaskError) {
        self.failures.push(err);
    }
}
