//! Execution context shared by every step.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::StepReport;
use crate::config::KilnConfig;
use crate::core::AssetClass;
use crate::paths::PathTable;
use crate::pipeline::pages::{CommandRenderer, PageRenderer};
use crate::pipeline::styles::{CommandSass, SassCompiler};
use crate::reload::ReloadHandle;

/// External transforms. Tests substitute in-process fakes.
#[derive(Clone)]
pub struct Transforms {
    pub pages: Arc<dyn PageRenderer>,
    pub sass: Arc<dyn SassCompiler>,
}

impl Transforms {
    /// Command-backed transforms from `[pages]` and `[styles]`.
    pub fn from_config(config: &KilnConfig) -> Self {
        Self {
            pages: Arc::new(CommandRenderer::new(&config.pages)),
            sass: Arc::new(CommandSass::new(&config.styles)),
        }
    }
}

/// Everything a step needs: paths, settings, transforms, reload signal.
#[derive(Clone)]
pub struct TaskContext {
    pub config: Arc<KilnConfig>,
    pub table: Arc<PathTable>,
    pub transforms: Transforms,
    pub reload: ReloadHandle,
    pub notifier: Arc<Notifier>,
}

impl TaskContext {
    pub fn new(config: Arc<KilnConfig>, table: Arc<PathTable>, reload: ReloadHandle) -> Self {
        let transforms = Transforms::from_config(&config);
        Self {
            notifier: Arc::new(Notifier::new(reload.clone())),
            config,
            table,
            transforms,
            reload,
        }
    }

    #[cfg(test)]
    pub fn with_transforms(mut self, transforms: Transforms) -> Self {
        self.transforms = transforms;
        self
    }
}

/// Reports transform failures to the terminal and the browser overlay.
///
/// Remembers which classes are failing: when one recovers, the overlay
/// falls back to another failing class or is cleared.
pub struct Notifier {
    reload: ReloadHandle,
    failing: Mutex<FxHashMap<AssetClass, (String, String)>>,
}

impl Notifier {
    pub fn new(reload: ReloadHandle) -> Self {
        Self {
            reload,
            failing: Mutex::new(FxHashMap::default()),
        }
    }

    /// Publish the outcome of a step for `class`.
    pub fn report(&self, class: AssetClass, report: &StepReport) {
        match report.failures.as_slice() {
            [] => self.succeeded(class, report.written),
            failures => {
                let detail = failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n");
                self.failed(class, failures.len(), detail);
            }
        }
    }

    #[cfg(test)]
    pub fn is_failing(&self, class: AssetClass) -> bool {
        self.failing.lock().contains_key(&class)
    }

    fn failed(&self, class: AssetClass, count: usize, detail: String) {
        let title = class.name().to_ascii_uppercase();
        let summary = format!(
            "{class}: {count} file{} failed",
            if count == 1 { "" } else { "s" }
        );

        if crate::core::is_watching() {
            crate::logger::status_error(&summary, &detail);
        } else {
            crate::log!("error"; "{}\n{}", summary, detail);
        }

        self.reload.error(&title, &detail);
        self.failing.lock().insert(class, (title, detail));
    }

    fn succeeded(&self, class: AssetClass, written: usize) {
        if crate::core::is_watching() {
            crate::logger::status_success(&format!(
                "{class}: {written} file{}",
                if written == 1 { "" } else { "s" }
            ));
        } else {
            crate::debug!("build"; "{}: {} files", class, written);
        }

        let mut failing = self.failing.lock();
        if failing.remove(&class).is_none() {
            return;
        }
        match failing.values().next() {
            Some((title, detail)) => self.reload.error(title, detail),
            None => self.reload.clear_error(),
        }
    }
}
