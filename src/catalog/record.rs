// Clip records and the file naming convention `<displayName>_<suffix>.<ext>`

use crate::playback::PlaybackState;
use crate::util::format_duration;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Separates the display name from the opaque suffix in clip file names
pub const NAME_SEPARATOR: char = '_';

/// A persisted recording as shown to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    /// File name inside the recordings directory, unique within the catalog
    pub id: String,
    /// User-facing name
    pub display_name: String,
    /// Full path of the audio file
    pub location: PathBuf,
    /// When the clip was recorded
    pub created_at: DateTime<Utc>,
    /// Length of the clip, once probed
    pub duration_secs: Option<f64>,
    /// Live playback state of this clip
    pub playback_state: PlaybackState,
}

impl ClipRecord {
    /// Duration formatted for display, `"0s"` while unknown
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_secs.unwrap_or(0.0))
    }

    pub fn is_active(&self) -> bool {
        self.playback_state != PlaybackState::Idle
    }
}

/// Display name encoded in a file name: everything before the first separator,
/// or the file stem when there is no separator.
pub fn display_name_from_filename(filename: &str) -> String {
    match filename.split_once(NAME_SEPARATOR) {
        Some((name, _)) => name.to_string(),
        None => Path::new(filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(filename)
            .to_string(),
    }
}

/// File name for a freshly captured clip, e.g. `New Recording_20240309T140507.123Z.m4a`
pub fn generate_filename(prefix: &str, at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}{}{}{}",
        prefix,
        NAME_SEPARATOR,
        at.format("%Y%m%dT%H%M%S%.3fZ"),
        normalize_extension(extension)
    )
}

/// File name after renaming to `new_name`, keeping the opaque suffix of `filename`.
///
/// A file name without a separator gets a fresh unique suffix so the result
/// still follows the naming convention.
pub fn renamed_filename(filename: &str, new_name: &str) -> String {
    match filename.split_once(NAME_SEPARATOR) {
        Some((_, suffix)) => format!("{}{}{}", new_name, NAME_SEPARATOR, suffix),
        None => {
            let extension = Path::new(filename)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| format!(".{}", ext))
                .unwrap_or_default();
            format!(
                "{}{}{}{}",
                new_name,
                NAME_SEPARATOR,
                uuid::Uuid::new_v4().simple(),
                extension
            )
        }
    }
}

/// Insert a numeric counter before the extension: `a_b.m4a` -> `a_b-2.m4a`
pub fn with_counter(filename: &str, counter: u32) -> String {
    let path = Path::new(filename);
    match (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
    ) {
        (Some(stem), Some(ext)) => format!("{}-{}.{}", stem, counter, ext),
        _ => format!("{}-{}", filename, counter),
    }
}

/// Validate a user-supplied display name, returning it trimmed.
///
/// Names must be non-blank and must not start with a dot (hidden files are not
/// listed). Path separators, NUL and [`NAME_SEPARATOR`] are rejected, the
/// latter so the file name suffix stays recoverable.
pub fn validate_display_name(name: &str) -> Result<&str, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("name is empty".to_string());
    }
    if trimmed.starts_with('.') {
        return Err(format!("'{}' would be a hidden file", trimmed));
    }
    if trimmed.contains(['/', '\\', '\0']) {
        return Err(format!("'{}' contains a path separator", trimmed));
    }
    if trimmed.contains(NAME_SEPARATOR) {
        return Err(format!(
            "'{}' contains the reserved character '{}'",
            trimmed, NAME_SEPARATOR
        ));
    }
    Ok(trimmed)
}

fn normalize_extension(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
