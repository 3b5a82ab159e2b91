//! Template rendering.
//!
//! Every template under `views/pages/` renders to
//! `<output>/<relative path>.html`. Includes and extends resolve against
//! the `views/` directory, so layouts and partials outside `pages/` are
//! usable but never rendered on their own.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::{Outcome, collect, display_path, output_for, write_file};
use crate::config::PagesConfig;
use crate::core::AssetClass;
use crate::task::{StepReport, TaskContext, TaskError};
use crate::utils::exec::{Cmd, require_program};

/// Renders one template file to markup.
pub trait PageRenderer: Send + Sync {
    /// `basedir` resolves absolute include paths.
    fn render(&self, template: &Path, basedir: &Path) -> Result<String>;
}

/// Renderer backed by the `pug` command line (stdin → stdout).
pub struct CommandRenderer {
    command: Vec<String>,
    pretty: bool,
}

impl CommandRenderer {
    pub fn new(config: &PagesConfig) -> Self {
        Self {
            command: config.command.clone(),
            pretty: config.pretty,
        }
    }
}

impl PageRenderer for CommandRenderer {
    fn render(&self, template: &Path, basedir: &Path) -> Result<String> {
        require_program(&self.command)?;

        let source = fs::read(template)
            .with_context(|| format!("failed to read {}", template.display()))?;

        let pretty: &[&str] = if self.pretty { &["--pretty"] } else { &[] };
        let output = Cmd::from_slice(&self.command)
            .args(pretty)
            .arg("--path")
            .arg(template)
            .arg("--basedir")
            .arg(basedir)
            .stdin(source)
            .run()?;

        String::from_utf8(output.stdout).context("renderer produced invalid UTF-8")
    }
}

/// Render every page template.
///
/// A failing template is reported and its previous output left in place;
/// the remaining templates still render.
pub fn run(ctx: &TaskContext) -> Result<StepReport, TaskError> {
    let root = ctx.table.root();
    let entry = ctx.table.get(AssetClass::Pages);
    let basedir = root.join(entry.watch.base());
    let renderer = &ctx.transforms.pages;

    let outcomes: Vec<_> = entry
        .source
        .collect(root)
        .par_iter()
        .map(|template| match renderer.render(template, &basedir) {
            Ok(html) => {
                let dest = output_for(entry, root, template).with_extension("html");
                write_file(&dest, html)?;
                Ok(Outcome::Written(1))
            }
            Err(e) => Ok(Outcome::Failed(TaskError::transform(
                AssetClass::Pages,
                &display_path(root, template),
                format!("{e:#}"),
            ))),
        })
        .collect();

    collect(outcomes)
}
