//! Configuration loading tests

use std::io::Write;

use skirmish::config::CombatConfig;

fn toml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

#[test]
fn test_load_without_file_uses_defaults() {
    let config = CombatConfig::load(None).unwrap();
    assert_eq!(config.base_ticks, 100_000.0);
    assert_eq!(config.max_skill_points, 5);
}

#[test]
fn test_file_overrides_defaults() {
    let file = toml_file(
        r#"
        miss_baseline = 0.1
        skill_points = 1
        meter_gain_on_hurt = 25.0
        "#,
    );
    let config = CombatConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.miss_baseline, 0.1);
    assert_eq!(config.skill_points, 1);
    assert_eq!(config.meter_gain_on_hurt, 25.0);
    // untouched keys keep their defaults
    assert_eq!(config.friendly_fire_balance, 15.0);
}

#[test]
fn test_env_overrides_file() {
    let file = toml_file("input_timeout_secs = 30\n");
    std::env::set_var("SKIRMISH_INPUT_TIMEOUT_SECS", "7");
    let config = CombatConfig::load(Some(file.path())).unwrap();
    std::env::remove_var("SKIRMISH_INPUT_TIMEOUT_SECS");

    assert_eq!(config.input_timeout_secs, 7);
    assert_eq!(config.input_timeout(), std::time::Duration::from_secs(7));
}

#[test]
fn test_invalid_value_is_an_error() {
    let file = toml_file("max_reprompts = \"plenty\"\n");
    assert!(CombatConfig::load(Some(file.path())).is_err());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = CombatConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    let defaults = CombatConfig::default();
    assert_eq!(config.base_ticks, defaults.base_ticks);
    assert_eq!(config.skill_points, defaults.skill_points);
    assert_eq!(config.miss_damage_factor, defaults.miss_damage_factor);
}
