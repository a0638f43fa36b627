//! Shared utilities for the voxclip backend.
//!
//! This module provides common functionality used across the codebase:
//! - `settings`: RecorderSettings loading and defaults
//! - `format`: display helpers for clip durations and dates

mod format;
mod settings;

pub use format::{format_date, format_duration};
pub use settings::{
    default_recordings_dir, ProbePolicy, RecorderSettings, SettingsError, DEFAULT_CLIP_PREFIX,
    DEFAULT_INDEX_FILE,
};
