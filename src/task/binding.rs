//! Watch bindings: trigger pattern → task sequence.
//!
//! | binding | trigger                | sequence                                   |
//! |---------|------------------------|--------------------------------------------|
//! | images  | `assets/images/**/*`   | clean → copy → convert → reload            |
//! | fonts   | `assets/fonts/**/*`    | clean → copy → reload                      |
//! | styles  | `**/*.{sass,scss,css}` | styles                                     |
//! | scripts | `**/*.js`              | scripts → reload                           |
//! | pages   | `views/**/*.pug`       | pages                                      |
//! | videos  | `assets/videos/**/*`   | clean → copy → reload                      |
//! | docs    | `assets/docs/**/*`     | clean → copy → reload                      |
//!
//! Styles and pages rebuild without a reload step.

use std::path::{Path, PathBuf};

use super::{Step, Task};
use crate::core::AssetClass;
use crate::paths::{PathTable, Pattern};

/// One watch binding. The asset class doubles as the binding id.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    pub id: AssetClass,
    pub trigger: Pattern,
    pub task: Task,
}

/// Every binding installed by `watch`.
#[derive(Debug, Clone)]
pub struct WatchTable {
    root: PathBuf,
    bindings: Vec<WatchBinding>,
}

impl WatchTable {
    /// The standard bindings over a path table.
    pub fn standard(table: &PathTable) -> Self {
        use AssetClass::*;

        let binding = |id: AssetClass, task: Task| WatchBinding {
            id,
            trigger: table.get(id).watch.clone(),
            task,
        };
        let recopy = |class: AssetClass| {
            Task::sequence([Step::Clean(class), Step::Copy(class), Step::Reload(class)])
        };

        let bindings = vec![
            binding(
                Images,
                Task::sequence([
                    Step::Clean(Images),
                    Step::CopyImages,
                    Step::ConvertImages,
                    Step::Reload(Images),
                ]),
            ),
            binding(Fonts, recopy(Fonts)),
            binding(Styles, Task::sequence([Step::Styles])),
            binding(Scripts, Task::sequence([Step::Scripts, Step::Reload(Scripts)])),
            binding(Pages, Task::sequence([Step::Pages])),
            binding(Videos, recopy(Videos)),
            binding(Documents, recopy(Documents)),
        ];

        Self {
            root: table.root().to_path_buf(),
            bindings,
        }
    }

    #[cfg(test)]
    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    pub fn get(&self, id: AssetClass) -> Option<&WatchBinding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    /// Bindings triggered by a batch of changed absolute paths, each once,
    /// in table order.
    pub fn triggered(&self, paths: &[PathBuf]) -> Vec<AssetClass> {
        self.bindings
            .iter()
            .filter(|binding| paths.iter().any(|path| self.matches(binding, path)))
            .map(|binding| binding.id)
            .collect()
    }

    fn matches(&self, binding: &WatchBinding, path: &Path) -> bool {
        binding.trigger.matches_under(&self.root, path)
    }
}
