//! Stylesheet compilation.
//!
//! ```text
//! main.sass ─sass─► css ─inline @import─► lightningcss ─► main.css
//!                                              │ minify + prefix
//!                                              └─► ../maps/main.css.map
//! ```
//!
//! The map points at the compiled CSS (`main.compiled.css`, carried in
//! `sourcesContent`); the Sass compiler's own map is not chained.
//!
//! `url()` references inside inlined files are rebased to the entry's
//! directory. The output tree mirrors `assets/`, so references relative to
//! the entry stay valid from `assets/css/`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;
use regex::{Captures, Regex};
use rustc_hash::FxHashSet;
use serde::Serialize;

use super::{display_path, normalize_lexical, relative_path, to_slash, write_file};
use crate::config::StylesConfig;
use crate::core::AssetClass;
use crate::paths::MAPS_DIR;
use crate::task::{StepReport, TaskContext, TaskError};
use crate::utils::exec::{Cmd, FilterRule, require_program};

/// Sass deprecation chatter is not worth echoing on every rebuild.
static SASS_FILTER: FilterRule = FilterRule::new(&["Deprecation Warning", "More info", "╷", "│", "╵"]);

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']?([^"')\s;]+)["']?\s*\)?\s*([^;]*);"#)
        .expect("valid regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(["']?)([^"')]+?)["']?\s*\)"#).expect("valid regex")
});

/// Compiles a Sass entry point (indented or SCSS syntax) to CSS.
pub trait SassCompiler: Send + Sync {
    fn compile(&self, entry: &Path, load_path: &Path) -> Result<String>;
}

/// Compiler backed by the `sass` command line (Dart Sass).
pub struct CommandSass {
    command: Vec<String>,
}

impl CommandSass {
    pub fn new(config: &StylesConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }
}

impl SassCompiler for CommandSass {
    fn compile(&self, entry: &Path, load_path: &Path) -> Result<String> {
        require_program(&self.command)?;

        let output = Cmd::from_slice(&self.command)
            .arg("--no-source-map")
            .arg("--load-path")
            .arg(load_path)
            .arg(entry)
            .filter(&SASS_FILTER)
            .run()?;

        String::from_utf8(output.stdout).context("sass produced invalid UTF-8")
    }
}

/// Compiled stylesheet and optional source map JSON.
struct Compiled {
    css: String,
    map: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapJson<'a> {
    version: u8,
    file: &'a str,
    mappings: String,
    sources: &'a Vec<String>,
    sources_content: &'a Vec<String>,
    names: &'a Vec<String>,
}

/// Compile the stylesheet entry point to `assets/css/<name>.css`.
///
/// Compile errors are reported; the previous stylesheet stays in place.
pub fn run(ctx: &TaskContext) -> Result<StepReport, TaskError> {
    let root = ctx.table.root();
    let entry = ctx.table.get(AssetClass::Styles);
    let mut report = StepReport::default();

    let Some(source) = entry.source.collect(root).into_iter().next() else {
        crate::debug!("styles"; "no entry point at {}", entry.source.as_str());
        return Ok(report);
    };

    let name = format!(
        "{}.css",
        source.file_stem().unwrap_or_default().to_string_lossy()
    );
    let dest = entry.output.join(&name);
    let maps_dir = entry.maps_dir();

    match compile(ctx, &source, &maps_dir, &name) {
        Ok(Compiled { css, map: Some(map) }) => {
            let map_name = format!("{name}.map");
            write_file(&maps_dir.join(&map_name), map)?;
            write_file(
                &dest,
                format!("{css}\n/*# sourceMappingURL={MAPS_DIR}/{map_name} */\n"),
            )?;
            report.wrote(2);
        }
        Ok(Compiled { css, map: None }) => {
            write_file(&dest, css)?;
            report.wrote(1);
        }
        Err(message) => report.fail(TaskError::transform(
            AssetClass::Styles,
            &display_path(root, &source),
            message,
        )),
    }
    Ok(report)
}

fn compile(
    ctx: &TaskContext,
    source: &Path,
    maps_dir: &Path,
    name: &str,
) -> Result<Compiled, String> {
    let config = &ctx.config.styles;
    let source_dir = source.parent().unwrap_or(Path::new(""));

    let css = ctx
        .transforms
        .sass
        .compile(source, source_dir)
        .map_err(|e| format!("{e:#}"))?;

    let mut seen = FxHashSet::default();
    let css = inline_imports(&css, source_dir, &mut seen)?;

    postprocess(&css, config, &map_source_name(maps_dir, source), name)
}

/// Name the map gives its single source. The mapped text is the compiler's
/// CSS output, not the Sass entry, so it is labelled as such.
fn map_source_name(maps_dir: &Path, source: &Path) -> String {
    to_slash(&relative_path(maps_dir, &source.with_extension("compiled.css")))
}

/// Minify, prefix for the configured browsers, and build the source map.
fn postprocess(css: &str, config: &StylesConfig, filename: &str, name: &str) -> Result<Compiled, String> {
    let targets = match Browsers::from_browserslist(&config.browsers) {
        Ok(browsers) => browsers.map(Targets::from).unwrap_or_default(),
        Err(e) => return Err(format!("invalid browserslist query: {e}")),
    };

    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let mut source_map = config.source_map.then(|| {
        let mut sm = SourceMap::new("/");
        sm.add_source(filename);
        sm
    });
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: config.minify,
            source_map: source_map.as_mut(),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map = match source_map {
        Some(mut sm) => Some(source_map_json(&mut sm, css, name)?),
        None => None,
    };

    Ok(Compiled {
        css: result.code,
        map,
    })
}

fn source_map_json(sm: &mut SourceMap, css: &str, name: &str) -> Result<String, String> {
    sm.set_source_content(0, css)
        .map_err(|e| format!("source map: {e:?}"))?;

    let mut mappings = Vec::new();
    sm.write_vlq(&mut mappings)
        .map_err(|e| format!("source map: {e:?}"))?;

    let json = SourceMapJson {
        version: 3,
        file: name,
        mappings: String::from_utf8_lossy(&mappings).into_owned(),
        sources: sm.get_sources(),
        sources_content: sm.get_sources_content(),
        names: sm.get_names(),
    };
    serde_json::to_string(&json).map_err(|e| e.to_string())
}

/// Inline local plain-CSS `@import` rules, recursively. Each file is
/// inlined once; remote imports are left in place. URLs inside an
/// imported file are rebased to `dir`.
fn inline_imports(css: &str, dir: &Path, seen: &mut FxHashSet<PathBuf>) -> Result<String, String> {
    let mut out = String::with_capacity(css.len());
    let mut last = 0;

    for caps in IMPORT_RE.captures_iter(css) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let target = target.as_str();
        if !is_local_url(target) {
            continue;
        }

        out.push_str(&css[last..whole.start()]);
        last = whole.end();

        let path = normalize_lexical(&dir.join(target));
        if !seen.insert(path.clone()) {
            continue;
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| format!("cannot import `{target}`: {e}"))?;
        let import_dir = path.parent().unwrap_or(dir);
        let nested = inline_imports(&content, import_dir, seen)?;
        let rebased = rebase_urls(&nested, import_dir, dir);

        match caps.get(2).map(|m| m.as_str().trim()).unwrap_or("") {
            "" => out.push_str(&rebased),
            media => {
                let _ = write!(out, "@media {media}{{{rebased}}}");
            }
        }
    }

    out.push_str(&css[last..]);
    Ok(out)
}

/// Rewrite relative `url()` references written against `from` so they
/// resolve from `to`.
fn rebase_urls(css: &str, from: &Path, to: &Path) -> String {
    URL_RE
        .replace_all(css, |caps: &Captures| {
            let url = caps[2].trim();
            if !is_local_url(url) {
                return caps[0].to_string();
            }

            let split = url.find(['?', '#']).unwrap_or(url.len());
            let (path, suffix) = url.split_at(split);
            let target = normalize_lexical(&from.join(path));
            let rebased = to_slash(&relative_path(to, &target));
            format!("url({q}{rebased}{suffix}{q})", q = &caps[1])
        })
        .into_owned()
}

/// Relative reference to a file on disk (not remote, data, absolute or fragment).
fn is_local_url(url: &str) -> bool {
    !(url.is_empty()
        || url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with("data:")
        || url.contains("://"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rebase_between_dirs() {
        let css = r#".hero{background:url("../images/bg.png")}.x{src:url(fonts/a.woff2?#iefix)}"#;
        let out = rebase_urls(
            css,
            Path::new("/p/src/assets/vendor/slider"),
            Path::new("/p/src/assets/sass"),
        );
        assert!(out.contains(r#"url("../vendor/images/bg.png")"#));
        assert!(out.contains("url(../vendor/slider/fonts/a.woff2?#iefix)"));
    }

    #[test]
    fn test_rebase_keeps_remote_and_data() {
        let css = "a{b:url(https://cdn.x/a.png);c:url(data:image/png;base64,AA);d:url(/abs.png)}";
        assert_eq!(rebase_urls(css, Path::new("/a"), Path::new("/b")), css);
    }

    #[test]
    fn test_inline_imports_once() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("vendor/img")).unwrap();
        fs::write(dir.join("vendor/reset.css"), "b{background:url(img/x.png)}").unwrap();

        let css = "@import \"vendor/reset.css\";\n@import url(vendor/reset.css);\na{color:red}";
        let mut seen = FxHashSet::default();
        let out = inline_imports(css, dir, &mut seen).unwrap();

        assert_eq!(out.matches("b{").count(), 1);
        assert!(out.contains("url(vendor/img/x.png)"));
        assert!(out.contains("a{color:red}"));
        assert!(!out.contains("@import"));
    }

    #[test]
    fn test_inline_import_with_media() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("print.css"), "p{margin:0}").unwrap();

        let mut seen = FxHashSet::default();
        let out = inline_imports("@import 'print.css' print;", temp.path(), &mut seen).unwrap();
        assert_eq!(out, "@media print{p{margin:0}}");
    }

    #[test]
    fn test_remote_import_untouched() {
        let css = "@import url(https://fonts.googleapis.com/css?family=Roboto);";
        let mut seen = FxHashSet::default();
        assert_eq!(inline_imports(css, Path::new("/x"), &mut seen).unwrap(), css);
    }

    #[test]
    fn test_missing_import_is_error() {
        let mut seen = FxHashSet::default();
        let err = inline_imports("@import 'nope.css';", Path::new("/no/such/dir"), &mut seen)
            .unwrap_err();
        assert!(err.contains("nope.css"));
    }

    #[test]
    fn test_postprocess_minifies_and_prefixes() {
        let config = StylesConfig {
            browsers: vec!["safari 8".into()],
            ..StylesConfig::default()
        };
        let out = postprocess(
            ".a {\n  user-select: none;\n  color: #ff0000;\n}\n",
            &config,
            "../sass/main.compiled.css",
            "main.css",
        )
        .unwrap();

        assert!(out.css.contains("-webkit-user-select:none"));
        assert!(out.css.contains("color:red"));
        assert!(!out.css.contains('\n'));

        let map: serde_json::Value = serde_json::from_str(&out.map.unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        assert!(map["sources"][0].as_str().unwrap().ends_with("main.compiled.css"));
        assert!(map["sourcesContent"][0].as_str().unwrap().contains("user-select: none"));
    }

    #[test]
    fn test_map_source_names_compiled_css() {
        let name = map_source_name(
            Path::new("/p/public/assets/maps"),
            Path::new("/p/src/assets/sass/main.sass"),
        );
        assert_eq!(name, "../../../src/assets/sass/main.compiled.css");
        assert!(!name.ends_with(".sass"));
    }

    #[test]
    fn test_postprocess_syntax_error() {
        let config = StylesConfig::default();
        assert!(postprocess(".a[ { color: red }", &config, "main.sass", "main.css").is_err());
    }
}
