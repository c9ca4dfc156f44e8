use mask_config::Config;
use rstest::rstest;

#[test]
fn full_document_parses() {
    let cfg = Config::from_toml_str(
        r#"
[motor]
steps_per_rotation = 400
tick_rate_hz = 250

[mask]
gear_ratio = -7.5

[indexing]
timeout_ms = 5000

[pins]
motor_step = 13
motor_dir = 19
hall_power = 5
hall_state = 6

[logging]
file = "logs/maskctl.log"
level = "debug"
rotation = "daily"
"#,
    )
    .unwrap();

    assert_eq!(cfg.motor.steps_per_rotation, 400);
    assert_eq!(cfg.motor.tick_rate_hz, 250);
    assert!((cfg.mask.gear_ratio + 7.5).abs() < f32::EPSILON);
    assert_eq!(cfg.indexing.timeout_ms, 5_000);
    assert_eq!(cfg.pins.motor_step, Some(13));
    assert_eq!(cfg.pins.hall_state, Some(6));
    assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn empty_document_uses_defaults() {
    let cfg = Config::from_toml_str("").unwrap();
    assert_eq!(cfg.motor.steps_per_rotation, 200);
    assert_eq!(cfg.motor.tick_rate_hz, 125);
    assert!((cfg.mask.gear_ratio - 1.0).abs() < f32::EPSILON);
    assert_eq!(cfg.indexing.timeout_ms, 10_000);
    assert!(cfg.pins.motor_step.is_none());
    assert!(cfg.logging.file.is_none());
}

#[test]
fn partial_tables_keep_remaining_defaults() {
    let cfg = Config::from_toml_str("[mask]\ngear_ratio = 5.0\n").unwrap();
    assert!((cfg.mask.gear_ratio - 5.0).abs() < f32::EPSILON);
    assert_eq!(cfg.motor.steps_per_rotation, 200);
}

#[rstest]
#[case("[motor]\nsteps_per_rotation = 0\n", "steps_per_rotation")]
#[case("[motor]\nsteps_per_rotation = -200\n", "steps_per_rotation")]
#[case("[motor]\ntick_rate_hz = 0\n", "tick_rate_hz")]
#[case("[motor]\ntick_rate_hz = 100000\n", "tick_rate_hz")]
#[case("[mask]\ngear_ratio = 0.0\n", "gear_ratio")]
#[case("[mask]\ngear_ratio = nan\n", "gear_ratio")]
#[case("[mask]\ngear_ratio = inf\n", "gear_ratio")]
#[case("[indexing]\ntimeout_ms = 0\n", "timeout_ms")]
fn invalid_documents_are_rejected(#[case] text: &str, #[case] needle: &str) {
    let err = Config::from_toml_str(text).unwrap_err();
    assert!(
        format!("{err:#}").contains(needle),
        "expected '{needle}' in: {err:#}"
    );
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = Config::from_toml_str("[motor\nsteps = ").unwrap_err();
    assert!(format!("{err:#}").contains("parsing config TOML"));
}

#[test]
fn load_config_reads_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask_config.toml");
    std::fs::write(&path, "[mask]\ngear_ratio = 2.0\n").unwrap();

    let cfg = mask_config::load_config(&path).unwrap();
    assert!((cfg.mask.gear_ratio - 2.0).abs() < f32::EPSILON);
}

#[test]
fn load_config_reports_the_missing_path() {
    let err =
        mask_config::load_config(std::path::Path::new("/nonexistent/mask.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("reading config"));
}
