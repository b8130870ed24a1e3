use blobctl_lib::settings::{LogLevel, Settings};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_defaults_when_file_missing() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(dir.path().join(".env")).unwrap();

    assert_eq!(settings.account_name(), "");
    assert_eq!(settings.container(), "");
    assert_eq!(settings.log_level(), LogLevel::Warning);
    assert!(settings.output_folder().ends_with("output"));
}

#[test]
fn test_load_reads_env_file_values() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(
        &env_path,
        "ACCOUNT_NAME=acme\nAZURE_CONTAINER=backups\nLOG_LEVEL=DEBUG\n",
    )
    .unwrap();

    let settings = Settings::load(&env_path).unwrap();
    assert_eq!(settings.account_name(), "acme");
    assert_eq!(settings.container(), "backups");
    assert_eq!(settings.log_level(), LogLevel::Debug);
}

#[test]
fn test_load_ignores_unknown_keys() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(&env_path, "SOME_OTHER_TOOL=1\nACCOUNT_NAME=acme\n").unwrap();

    let settings = Settings::load(&env_path).unwrap();
    assert_eq!(settings.account_name(), "acme");
}

#[test]
fn test_load_rejects_invalid_log_level() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(&env_path, "LOG_LEVEL=SHOUTING\n").unwrap();

    assert!(Settings::load(&env_path).is_err());
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(&env_path, "ACCOUNT_KEY=from-file\n").unwrap();

    // process environment is shared across test threads; no other test in
    // this binary asserts ACCOUNT_KEY
    std::env::set_var("ACCOUNT_KEY", "from-env");
    let settings = Settings::load(&env_path);
    std::env::remove_var("ACCOUNT_KEY");

    assert_eq!(
        settings.unwrap().get_value("ACCOUNT_KEY").unwrap(),
        "from-env"
    );
}

#[test]
fn test_ensure_output_folder_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join(".env");
    let output = dir.path().join("out");
    fs::write(
        &env_path,
        format!("OUTPUT_FOLDER={}\n", output.display()),
    )
    .unwrap();

    let settings = Settings::load(&env_path).unwrap();
    assert!(!output.exists());

    let first = settings.ensure_output_folder().unwrap();
    assert!(output.is_dir());

    let second = settings.ensure_output_folder().unwrap();
    assert_eq!(first, second);
}
