//! Raster image conversion.
//!
//! Writes a space-efficient counterpart next to each copied image:
//! `photo.png` → `photo.webp` (or `.avif`). Paths under the configured
//! exclusion globs (the favicon subtree by default) are copied only.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use image::DynamicImage;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{Outcome, collect, display_path, output_for, write_file};
use crate::config::{ImageFormat, ImagesConfig};
use crate::core::AssetClass;
use crate::paths::PathEntry;
use crate::task::{StepReport, TaskContext, TaskError};

/// Extensions decoded and re-encoded. Vector and already-efficient formats are not.
const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "gif"];

/// AVIF encoder speed, 1 (slowest) to 10.
const AVIF_SPEED: u8 = 6;

/// Convert every eligible image under the images source pattern.
///
/// A conversion whose output name is already taken (by a copied source
/// image, or by another conversion) is skipped and reported, so the
/// result never depends on which writer finishes last.
pub fn convert(ctx: &TaskContext) -> Result<StepReport, TaskError> {
    let root = ctx.table.root();
    let entry = ctx.table.get(AssetClass::Images);
    let config = &ctx.config.images;
    let exclude = exclude_set(&config.convert_exclude)?;

    let files = entry.source.collect(root);
    let jobs = plan(entry, root, &files, &exclude, config.format);

    let outcomes: Vec<_> = jobs
        .par_iter()
        .map(|(file, target)| {
            let result = target
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|dest| encode(file, config).map(|bytes| (dest, bytes)));
            match result {
                Ok((dest, bytes)) => {
                    write_file(dest, bytes)?;
                    Ok(Outcome::Written(1))
                }
                Err(message) => Ok(Outcome::Failed(TaskError::transform(
                    AssetClass::Images,
                    &display_path(root, file),
                    message,
                ))),
            }
        })
        .collect();

    collect(outcomes)
}

/// Pair each convertible file with its output path, or with the reason the
/// output name is unavailable.
fn plan<'a>(
    entry: &PathEntry,
    root: &Path,
    files: &'a [PathBuf],
    exclude: &GlobSet,
    format: ImageFormat,
) -> Vec<(&'a PathBuf, Result<PathBuf, String>)> {
    let copied: FxHashSet<PathBuf> = files
        .iter()
        .map(|file| output_for(entry, root, file))
        .collect();

    let candidates: Vec<(&PathBuf, PathBuf)> = files
        .iter()
        .filter(|file| is_raster(file))
        .filter(|file| {
            entry
                .source
                .relative_to_base(root, file)
                .is_none_or(|rel| !exclude.is_match(rel))
        })
        .map(|file| {
            let dest = output_for(entry, root, file).with_extension(format.extension());
            (file, dest)
        })
        .collect();

    let mut claims: FxHashMap<&Path, Vec<&Path>> = FxHashMap::default();
    for (file, dest) in &candidates {
        claims.entry(dest.as_path()).or_default().push(file.as_path());
    }

    candidates
        .iter()
        .map(|(file, dest)| {
            let name = display_path(&entry.output, dest);
            let target = if copied.contains(dest) {
                Err(format!(
                    "converted output `{}` would overwrite a copied image",
                    name.display()
                ))
            } else if let Some(others) = claims.get(dest.as_path()).filter(|c| c.len() > 1) {
                let others: Vec<_> = others
                    .iter()
                    .filter(|other| **other != file.as_path())
                    .map(|other| display_path(root, other).display().to_string())
                    .collect();
                Err(format!(
                    "converted output `{}` is also produced by {}",
                    name.display(),
                    others.join(", ")
                ))
            } else {
                Ok(dest.clone())
            };
            (*file, target)
        })
        .collect()
}

/// Whether `path` has a convertible raster extension (case-insensitive).
pub fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            RASTER_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

fn exclude_set(patterns: &[String]) -> Result<GlobSet, TaskError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| crate::paths::PathError::Glob(pattern.clone(), e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| crate::paths::PathError::Glob(patterns.join(", "), e.to_string()).into())
}

/// Decode `file` and encode it in the configured format.
fn encode(file: &Path, config: &ImagesConfig) -> Result<Vec<u8>, String> {
    let img = image::open(file).map_err(|e| e.to_string())?;
    match config.format {
        ImageFormat::Webp => Ok(encode_webp(&img, config.quality)),
        ImageFormat::Avif => encode_avif(&img, config.quality),
    }
}

/// Lossy WebP via libwebp.
fn encode_webp(img: &DynamicImage, quality: u8) -> Vec<u8> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    webp::Encoder::from_rgba(rgba.as_raw(), width, height)
        .encode(f32::from(quality))
        .to_vec()
}

fn encode_avif(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, String> {
    use ravif::{Encoder, Img, RGBA8};

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels: Vec<RGBA8> = rgba
        .pixels()
        .map(|p| RGBA8::new(p[0], p[1], p[2], p[3]))
        .collect();

    let encoded = Encoder::new()
        .with_quality(f32::from(quality))
        .with_speed(AVIF_SPEED)
        .encode_rgba(Img::new(&pixels[..], width as usize, height as usize))
        .map_err(|e| e.to_string())?;
    Ok(encoded.avif_file)
}
