//! Export of composited captures to disk.
//!
//! File names come from a user template with date, time and GUID
//! placeholders. Expansion is pure so tests can pin the clock; only
//! [`save_capture`] touches the filesystem.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Used when the configured template is empty or whitespace.
pub const DEFAULT_TEMPLATE: &str = "{yyyy}-{MM}-{dd}_{HHmmss}";

/// Characters that never survive into a generated file name.
const INVALID_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Expands the placeholder set `{yyyy} {MM} {dd} {HH} {mm} {ss} {HHmmss}
/// {GUID}` against `now` and `guid`, then replaces characters that are not
/// valid in file names with underscores. Unknown placeholders pass through
/// untouched.
pub fn expand_template(template: &str, now: DateTime<Local>, guid: &str) -> String {
    let trimmed = template.trim();
    let trimmed = if trimmed.is_empty() {
        DEFAULT_TEMPLATE
    } else {
        trimmed
    };
    let expanded = trimmed
        .replace("{HHmmss}", &now.format("%H%M%S").to_string())
        .replace("{yyyy}", &now.format("%Y").to_string())
        .replace("{MM}", &now.format("%m").to_string())
        .replace("{dd}", &now.format("%d").to_string())
        .replace("{HH}", &now.format("%H").to_string())
        .replace("{mm}", &now.format("%M").to_string())
        .replace("{ss}", &now.format("%S").to_string())
        .replace("{GUID}", guid);
    expanded
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Eight hex characters of randomness for the `{GUID}` placeholder.
pub fn short_guid() -> String {
    let bytes: [u8; 4] = rand::random();
    hex::encode(bytes)
}

/// First free `<stem>.png` path under `dir`, counting `<stem>_1.png`,
/// `<stem>_2.png`, ... past collisions.
pub fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.png"));
    let mut counter = 1u32;
    while path.exists() {
        path = dir.join(format!("{stem}_{counter}.png"));
        counter += 1;
    }
    path
}

/// Writes `image` as a PNG under `dir`, naming it from `template` and `now`.
/// The directory is created if missing. Returns the path written.
pub fn save_capture(
    image: &RgbaImage,
    dir: &Path,
    template: &str,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create save folder {}", dir.display()))?;
    let stem = expand_template(template, now, &short_guid());
    let path = unique_path(dir, &stem);
    image
        .save(&path)
        .with_context(|| format!("write capture {}", path.display()))?;
    tracing::info!(path = %path.display(), "capture saved");
    Ok(path)
}
