use super::*;
use chrono::TimeZone;

#[test]
fn test_display_name_is_text_before_first_separator() {
    assert_eq!(
        display_name_from_filename("New Recording_2024-03-09T14:05:07.123Z.m4a"),
        "New Recording"
    );
    assert_eq!(display_name_from_filename("Walk_home_1.m4a"), "Walk");
    assert_eq!(display_name_from_filename("imported.m4a"), "imported");
}

#[test]
fn test_generate_filename_uses_basic_iso_timestamp() {
    let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    assert_eq!(
        generate_filename("New Recording", at, ".m4a"),
        "New Recording_20240309T140507.000Z.m4a"
    );
    assert_eq!(
        generate_filename("Memo", at, "wav"),
        "Memo_20240309T140507.000Z.wav"
    );
    let name = generate_filename("New Recording", at, ".m4a");
    assert_eq!(display_name_from_filename(&name), "New Recording");
}

#[test]
fn test_renamed_filename_preserves_suffix() {
    assert_eq!(
        renamed_filename("New Recording_20240309T140507.000Z.m4a", "Groceries"),
        "Groceries_20240309T140507.000Z.m4a"
    );
    // Only the first separator splits the name
    assert_eq!(renamed_filename("a_b_c.m4a", "z"), "z_b_c.m4a");
}

#[test]
fn test_renamed_filename_without_separator_gets_fresh_suffix() {
    let renamed = renamed_filename("imported.m4a", "Lecture");
    assert!(renamed.starts_with("Lecture_"));
    assert!(renamed.ends_with(".m4a"));
    assert_eq!(display_name_from_filename(&renamed), "Lecture");
}

#[test]
fn test_with_counter() {
    assert_eq!(with_counter("Memo_1.m4a", 2), "Memo_1-2.m4a");
    assert_eq!(with_counter("Memo_1", 3), "Memo_1-3");
}

#[test]
fn test_validate_display_name() {
    assert_eq!(validate_display_name("  Groceries ").unwrap(), "Groceries");
    assert!(validate_display_name("").is_err());
    assert!(validate_display_name("   ").is_err());
    assert!(validate_display_name(".hidden").is_err());
    assert!(validate_display_name("a/b").is_err());
    assert!(validate_display_name("a\\b").is_err());
    assert!(validate_display_name("a\0b").is_err());
    assert!(validate_display_name("foo_bar").is_err());
}

#[test]
fn test_repeated_renames_keep_original_suffix() {
    let first = renamed_filename(
        "Memo_20240309T140507.000Z.m4a",
        validate_display_name("foo bar").unwrap(),
    );
    let second = renamed_filename(&first, validate_display_name("baz").unwrap());
    assert_eq!(second, "baz_20240309T140507.000Z.m4a");
    assert_eq!(display_name_from_filename(&second), "baz");
}

#[test]
fn test_record_formatting_and_activity() {
    let mut record = ClipRecord {
        id: "Memo_1.m4a".to_string(),
        display_name: "Memo".to_string(),
        location: PathBuf::from("/clips/Memo_1.m4a"),
        created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
        duration_secs: None,
        playback_state: PlaybackState::Idle,
    };
    assert_eq!(record.formatted_duration(), "0s");
    assert!(!record.is_active());

    record.duration_secs = Some(75.2);
    record.playback_state = PlaybackState::Paused;
    assert_eq!(record.formatted_duration(), "1m15s");
    assert!(record.is_active());

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["displayName"], "Memo");
    assert_eq!(json["playbackState"], "paused");
}
