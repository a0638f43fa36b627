use super::*;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let settings = RecorderSettings::default();
    assert_eq!(settings.new_clip_prefix, "New Recording");
    assert_eq!(settings.index_file_name, ".clips.json");
    assert_eq!(settings.duration_probe, ProbePolicy::Eager);
    assert_eq!(settings.preset, CapturePreset::high_quality());
    assert!(settings.recordings_dir.ends_with("recordings"));
}

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings = RecorderSettings::load(&temp_dir.path().join("settings.json")).unwrap();
    assert_eq!(settings, RecorderSettings::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"recordingsDir": "/data/memos", "durationProbe": "onPlay"}"#,
    )
    .unwrap();

    let settings = RecorderSettings::load(&path).unwrap();
    assert_eq!(settings.recordings_dir, PathBuf::from("/data/memos"));
    assert_eq!(settings.duration_probe, ProbePolicy::OnPlay);
    assert_eq!(settings.new_clip_prefix, DEFAULT_CLIP_PREFIX);
    assert_eq!(settings.index_path(), PathBuf::from("/data/memos/.clips.json"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(&path, "recordingsDir = nope").unwrap();

    let err = RecorderSettings::load(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }));
}

#[test]
fn test_with_recordings_dir() {
    let settings = RecorderSettings::with_recordings_dir("/tmp/clips");
    assert_eq!(settings.recordings_dir, PathBuf::from("/tmp/clips"));
    assert_eq!(settings.new_clip_prefix, DEFAULT_CLIP_PREFIX);
}
