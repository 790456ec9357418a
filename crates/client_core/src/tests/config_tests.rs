use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_server_with_goals_and_no_timeout() {
    let settings = ClientSettings::default();
    assert_eq!(settings.server_url, "http://127.0.0.1:5000");
    assert_eq!(settings.exercise_kind, ExerciseKind::Strength);
    assert!(settings.include_goals);
    assert_eq!(settings.fetch_timeout(), None);
}

#[test]
fn toml_file_overrides_defaults() {
    let mut settings = ClientSettings::default();
    settings
        .apply_toml(
            r#"
            server_url = "https://workouts.example.com"
            exercise_kind = "cardio"
            fetch_timeout_secs = 15
            include_goals = false
            "#,
        )
        .expect("valid settings");

    assert_eq!(settings.server_url, "https://workouts.example.com");
    assert_eq!(settings.exercise_kind, ExerciseKind::Cardio);
    assert_eq!(settings.fetch_timeout(), Some(Duration::from_secs(15)));
    assert!(!settings.include_goals);
    assert_eq!(settings.access_token, None);
}

#[test]
fn unknown_toml_keys_are_rejected() {
    let mut settings = ClientSettings::default();
    let err = settings
        .apply_toml("retry_count = 3")
        .expect_err("unknown key");
    assert!(err.to_string().contains("invalid settings file"));
}

#[test]
fn env_overrides_win_and_app_prefix_is_honoured() {
    let mut settings = ClientSettings::default();
    settings.apply_env_with(env(&[
        ("TRENDS_SERVER_URL", "http://trends.local"),
        ("APP__SERVER_URL", "http://app.local"),
        ("TRENDS_ACCESS_TOKEN", "abc123"),
        ("TRENDS_EXERCISE_KIND", "Cardio"),
        ("TRENDS_FETCH_TIMEOUT_SECS", " 30 "),
        ("TRENDS_INCLUDE_GOALS", "no"),
    ]));

    assert_eq!(settings.server_url, "http://app.local");
    assert_eq!(settings.access_token.as_deref(), Some("abc123"));
    assert_eq!(settings.exercise_kind, ExerciseKind::Cardio);
    assert_eq!(settings.fetch_timeout_secs, Some(30));
    assert!(!settings.include_goals);
}

#[test]
fn unparseable_env_values_are_skipped() {
    let mut settings = ClientSettings {
        fetch_timeout_secs: Some(10),
        ..ClientSettings::default()
    };
    settings.apply_env_with(env(&[
        ("TRENDS_EXERCISE_KIND", "yoga"),
        ("TRENDS_FETCH_TIMEOUT_SECS", "soon"),
        ("TRENDS_INCLUDE_GOALS", "maybe"),
    ]));

    assert_eq!(settings, ClientSettings {
        fetch_timeout_secs: Some(10),
        ..ClientSettings::default()
    });
}

#[test]
fn zero_timeout_disables_the_limit() {
    let settings = ClientSettings {
        fetch_timeout_secs: Some(0),
        ..ClientSettings::default()
    };
    assert_eq!(settings.fetch_timeout(), None);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let path = std::env::temp_dir().join("trends-settings-that-does-not-exist.toml");
    let err = load_settings(Some(&path)).expect_err("missing file");
    assert!(format!("{err:#}").contains("failed to read"));
}

#[test]
fn explicit_file_is_loaded() {
    let path = std::env::temp_dir().join(format!("trends-settings-{}.toml", std::process::id()));
    fs::write(&path, "include_goals = false\n").expect("write settings");

    let loaded = load_settings(Some(&path));
    let _ = fs::remove_file(&path);

    let settings = loaded.expect("settings");
    assert!(!settings.include_goals);
}
