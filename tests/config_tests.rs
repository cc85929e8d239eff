use std::path::PathBuf;
use std::time::Duration;

use rust_slideshow::config::Settings;
use rust_slideshow::error::Error;
use rust_slideshow::scan::SortOrder;

#[test]
fn parse_kebab_case_settings() {
    let yaml = r#"
photo-directory: "/photos"
display-duration: 8s
transition-duration: 750ms
transition-steps: 24
start-index: 2
loop: false
sort-order: natural
"#;
    let s: Settings = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(s.photo_directory, Some(PathBuf::from("/photos")));
    assert_eq!(s.display_duration, Duration::from_secs(8));
    assert_eq!(s.transition_duration, Duration::from_millis(750));
    assert_eq!(s.transition_steps, 24);
    assert_eq!(s.start_index, 2);
    assert!(!s.loop_slides);
    assert_eq!(s.sort_order(), SortOrder::Natural);
}

#[test]
fn empty_document_uses_defaults() {
    let s: Settings = serde_yaml::from_str("{}").unwrap();
    assert_eq!(s.display_duration, Duration::from_secs(5));
    assert_eq!(s.transition_duration, Duration::from_secs(1));
    assert_eq!(s.transition_steps, 30);
    assert!(s.loop_slides);
    assert_eq!(s.sort_order(), SortOrder::platform_default());
}

#[test]
fn validation_rejects_zero_display() {
    let s: Settings = serde_yaml::from_str("display-duration: 0s").unwrap();
    assert!(s.validated().is_err());
    let s: Settings = serde_yaml::from_str("transition-steps: 0").unwrap();
    assert!(s.validated().is_err());
}

#[test]
fn unknown_sort_order_is_an_error() {
    assert!(serde_yaml::from_str::<Settings>("sort-order: random").is_err());
}

#[test]
fn settings_file_round_trip_into_slideshow() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("settings.yaml");
    std::fs::write(&file, "start-index: 1\ntransition-duration: 0s\n").unwrap();
    let s = Settings::from_yaml_file(&file).unwrap().validated().unwrap();

    let images = vec![PathBuf::from("/p/a.jpg"), PathBuf::from("/p/b.jpg")];
    let cfg = s.slideshow(images, PathBuf::from("/p")).unwrap();
    assert_eq!(cfg.start_index(), 1);
    assert!(cfg.transition_duration().is_zero());
    assert_eq!(cfg.source_dir(), PathBuf::from("/p").as_path());

    let err = s.slideshow(Vec::new(), PathBuf::from("/p")).unwrap_err();
    assert!(matches!(err, Error::EmptyLibrary(_)));
}
