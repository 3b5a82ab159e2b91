//! Script bundling.
//!
//! ```text
//! index.js ─//= include─► bundle ─transpile (es5)─► minify ─► assets/js/index.js
//!                                                          └─► ../maps/index.js.map
//! ```
//!
//! Includes are inlined before transpiling so one syntax tree covers the
//! whole bundle.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};
use regex::Regex;
use rustc_hash::FxHashSet;

use super::{display_path, relative_path, write_file};
use crate::config::ScriptsConfig;
use crate::core::AssetClass;
use crate::paths::{MAPS_DIR, Pattern};
use crate::task::{StepReport, TaskContext, TaskError};

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*//=[ \t]*(?:include|require)[ \t]+["']?([^"'\r\n]+?)["']?[ \t]*\r?$"#)
        .expect("valid regex")
});

/// Transpiled bundle and optional source map JSON.
#[derive(Debug)]
struct Bundle {
    code: String,
    map: Option<String>,
}

/// Bundle the script entry point to `assets/js/<name>.js`.
///
/// Syntax and include errors are reported; the previous bundle stays in place.
pub fn run(ctx: &TaskContext) -> Result<StepReport, TaskError> {
    let root = ctx.table.root();
    let entry = ctx.table.get(AssetClass::Scripts);
    let mut report = StepReport::default();

    let Some(source) = entry.source.collect(root).into_iter().next() else {
        crate::debug!("scripts"; "no entry point at {}", entry.source.as_str());
        return Ok(report);
    };

    let name = source
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let dest = entry.output.join(&name);

    let map_source = relative_path(&entry.maps_dir(), &source);
    let result = inline_includes(&source)
        .and_then(|bundled| transpile(&bundled, &source, &map_source, &ctx.config.scripts));

    match result {
        Ok(Bundle { code, map: Some(map) }) => {
            let map_name = format!("{name}.map");
            write_file(&entry.maps_dir().join(&map_name), map)?;
            write_file(&dest, format!("{code}\n//# sourceMappingURL={MAPS_DIR}/{map_name}\n"))?;
            report.wrote(2);
        }
        Ok(Bundle { code, map: None }) => {
            write_file(&dest, code)?;
            report.wrote(1);
        }
        Err(message) => report.fail(TaskError::transform(
            AssetClass::Scripts,
            &display_path(root, &source),
            message,
        )),
    }
    Ok(report)
}

/// Inline `//= include path` and `//= require path` directives.
///
/// Paths resolve relative to the including file and may be globs. Each file
/// is inlined at most once per bundle, which also breaks include cycles.
pub fn inline_includes(entry: &Path) -> Result<String, String> {
    let mut seen = FxHashSet::default();
    seen.insert(entry.to_path_buf());
    let source = read(entry)?;
    expand(&source, entry, &mut seen)
}

fn expand(source: &str, file: &Path, seen: &mut FxHashSet<PathBuf>) -> Result<String, String> {
    let dir = file.parent().unwrap_or(Path::new(""));
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for caps in DIRECTIVE_RE.captures_iter(source) {
        let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&source[last..whole.start()]);
        last = whole.end();

        for path in resolve_include(dir, target.as_str(), file)? {
            if !seen.insert(path.clone()) {
                continue;
            }
            let nested = read(&path)?;
            out.push_str(&expand(&nested, &path, seen)?);
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }

    out.push_str(&source[last..]);
    Ok(out)
}

/// Files named by one directive, sorted. A literal path must exist.
fn resolve_include(dir: &Path, target: &str, from: &Path) -> Result<Vec<PathBuf>, String> {
    let target = target.trim();
    let pattern = Pattern::new(target).map_err(|e| e.to_string())?;

    if pattern.is_literal() {
        let path = super::normalize_lexical(&dir.join(target));
        return if path.is_file() {
            Ok(vec![path])
        } else {
            Err(format!(
                "include `{target}` not found (from {})",
                from.file_name().unwrap_or_default().to_string_lossy()
            ))
        };
    }

    let matches = pattern.collect(dir);
    if matches.is_empty() {
        crate::debug!("scripts"; "include `{}` matched nothing", target);
    }
    Ok(matches)
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

/// Parse, lower to the configured target, optionally minify, print.
///
/// `map_source` is the source path recorded in the map, relative to the map file.
fn transpile(
    source: &str,
    path: &Path,
    map_source: &Path,
    config: &ScriptsConfig,
) -> Result<Bundle, String> {
    let allocator = Allocator::default();
    let source_type = SourceType::cjs();

    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(diagnostics(ret.errors.iter()));
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let options = TransformOptions::from_target(&config.target)
        .map_err(|e| format!("invalid scripts.target `{}`: {e}", config.target))?;
    let ret = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(diagnostics(ret.errors.iter()));
    }

    let scoping = if config.minify {
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        Minifier::new(options).minify(&allocator, &mut program).scoping
    } else {
        None
    };

    let ret = Codegen::new()
        .with_options(CodegenOptions {
            minify: config.minify,
            comments: if config.minify {
                CommentOptions::disabled()
            } else {
                CommentOptions::default()
            },
            source_map_path: config.source_map.then(|| map_source.to_path_buf()),
            ..CodegenOptions::default()
        })
        .with_scoping(scoping)
        .build(&program);

    Ok(Bundle {
        code: ret.code,
        map: ret.map.map(|map| map.to_json_string()),
    })
}

fn diagnostics<'a>(errors: impl Iterator<Item = &'a oxc::diagnostics::OxcDiagnostic>) -> String {
    errors.map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(minify: bool, source_map: bool) -> ScriptsConfig {
        ScriptsConfig {
            minify,
            source_map,
            ..ScriptsConfig::default()
        }
    }

    fn bundle(src: &str, config: &ScriptsConfig) -> Result<Bundle, String> {
        transpile(src, Path::new("index.js"), Path::new("../js/index.js"), config)
    }

    #[test]
    fn test_include_resolves_relative_and_once() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("modules")).unwrap();
        fs::write(dir.join("modules/a.js"), "var a = 1;\n//= require ../shared.js\n").unwrap();
        fs::write(dir.join("shared.js"), "var shared = true;").unwrap();
        fs::write(
            dir.join("index.js"),
            "//= include modules/a.js\n//= require 'shared.js'\nconsole.log(a);\n",
        )
        .unwrap();

        let out = inline_includes(&dir.join("index.js")).unwrap();
        assert_eq!(out.matches("var shared").count(), 1);
        assert!(out.find("var a").unwrap() < out.find("console.log").unwrap());
        assert!(!out.contains("//="));
    }

    #[test]
    fn test_include_glob() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("parts")).unwrap();
        fs::write(dir.join("parts/1.js"), "var one;").unwrap();
        fs::write(dir.join("parts/2.js"), "var two;").unwrap();
        fs::write(dir.join("index.js"), "//= include parts/*.js\n").unwrap();

        let out = inline_includes(&dir.join("index.js")).unwrap();
        assert!(out.find("var one").unwrap() < out.find("var two").unwrap());
    }

    #[test]
    fn test_include_cycle_terminates() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("a.js"), "//= include b.js\nvar a;").unwrap();
        fs::write(dir.join("b.js"), "//= include a.js\nvar b;").unwrap();

        let out = inline_includes(&dir.join("a.js")).unwrap();
        assert_eq!(out.matches("var b").count(), 1);
        assert_eq!(out.matches("var a").count(), 1);
    }

    #[test]
    fn test_missing_include_is_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("index.js"), "//= include nope.js\n").unwrap();
        let err = inline_includes(&temp.path().join("index.js")).unwrap_err();
        assert!(err.contains("nope.js"));
    }

    #[test]
    fn test_transpile_lowers_arrow_functions() {
        let src = "var greet = (name) => console.log(name);\ngreet('x');\n";
        let out = bundle(src, &config(false, false)).unwrap();

        assert!(!out.code.contains("=>"), "{}", out.code);
        assert!(out.code.contains("function"));
        assert!(out.map.is_none());
    }

    #[test]
    fn test_es5_target_coverage() {
        let src = "\
var total = base ?? 1;
var squared = total ** 2;
var label = opts?.name;
class Greeter { greet() { return `hi ${label}`; } }
const items = [1, 2];
for (const item of items) { console.log(item); }
";
        let out = bundle(src, &config(false, false)).unwrap();
        let code = &out.code;

        // lowered: ES2016+ operators
        assert!(!code.contains("??"), "{code}");
        assert!(!code.contains("?."), "{code}");
        assert!(code.contains("Math.pow"), "{code}");

        // passed through: ES2015 classes, block scoping, templates, for-of
        assert!(code.contains("class Greeter"), "{code}");
        assert!(code.contains("const items"), "{code}");
        assert!(code.contains('`'), "{code}");
        assert!(code.contains(" of items"), "{code}");
    }

    #[test]
    fn test_transpile_minifies() {
        let src = "var longVariableName = 1;\n// comment\nconsole.log(longVariableName);\n";
        let out = bundle(src, &config(true, false)).unwrap();

        assert!(!out.code.contains("// comment"));
        assert!(out.code.len() < src.len());
    }

    #[test]
    fn test_invalid_target_is_error() {
        let config = ScriptsConfig {
            target: "es1999".into(),
            ..config(false, false)
        };
        let err = bundle("var a;", &config).unwrap_err();
        assert!(err.contains("scripts.target"));
    }

    #[test]
    fn test_transpile_emits_map() {
        let out = bundle("var a = 1;\nconsole.log(a);\n", &config(true, true)).unwrap();
        let map: serde_json::Value = serde_json::from_str(&out.map.unwrap()).unwrap();
        assert_eq!(map["version"], 3);
    }

    #[test]
    fn test_syntax_error_reported() {
        let err = bundle("function (", &config(true, false)).unwrap_err();
        assert!(!err.is_empty());
    }
}
