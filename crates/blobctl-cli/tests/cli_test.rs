use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SETTING_KEYS: [&str; 6] = [
    "ACCOUNT_NAME",
    "ACCOUNT_KEY",
    "AZURE_BLOB_CONNECTION_STRING",
    "AZURE_CONTAINER",
    "OUTPUT_FOLDER",
    "LOG_LEVEL",
];

/// A blobctl command pointed at a private settings file, shielded from the
/// caller's environment.
fn blobctl(env_file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("blobctl").unwrap();
    cmd.arg("--env-file").arg(env_file);
    cmd.env_remove("BLOBCTL_ENV_FILE");
    for key in SETTING_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("blobctl").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("blobctl"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("blobctl").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pulling, pushing and listing blobs"));
}

#[test]
fn test_settings_set_and_show() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");

    blobctl(&env_file)
        .args(["settings", "set", "AZURE_CONTAINER", "backups"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Setting 'AZURE_CONTAINER' successfully updated!",
        ));

    blobctl(&env_file)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AZURE_CONTAINER: backups ()"))
        .stdout(predicate::str::contains("LOG_LEVEL: WARNING (WARNING)"));
}

#[test]
fn test_settings_show_redacts_secrets() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "ACCOUNT_KEY=supersecretkey\n").unwrap();

    blobctl(&env_file)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ACCOUNT_KEY: **********"))
        .stdout(predicate::str::contains("supersecretkey").not());
}

#[test]
fn test_settings_set_invalid_log_level_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "ACCOUNT_NAME=acme\nLOG_LEVEL=INFO\n").unwrap();
    let before = fs::read(&env_file).unwrap();

    blobctl(&env_file)
        .args(["settings", "set", "LOG_LEVEL", "SHOUTING"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid LOG_LEVEL"));

    assert_eq!(fs::read(&env_file).unwrap(), before);
}

#[test]
fn test_settings_set_unknown_name_fails() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");

    blobctl(&env_file)
        .args(["settings", "set", "NOT_A_SETTING", "whatever"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("NOT_A_SETTING"));

    assert!(!env_file.exists());
}

#[test]
fn test_settings_unset_removes_key() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "AZURE_CONTAINER=backups\nLOG_LEVEL=INFO\n").unwrap();

    blobctl(&env_file)
        .args(["settings", "unset", "AZURE_CONTAINER"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Setting 'AZURE_CONTAINER' unset successfully.",
        ));

    let contents = fs::read_to_string(&env_file).unwrap();
    assert!(!contents.contains("AZURE_CONTAINER"));
    assert!(contents.contains("LOG_LEVEL=INFO"));
}

#[test]
fn test_settings_unset_unknown_name_fails() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");

    blobctl(&env_file)
        .args(["settings", "unset", "NOT_A_SETTING"])
        .assert()
        .code(2);
}

#[test]
fn test_settings_unset_all_removes_file() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "AZURE_CONTAINER=backups\n").unwrap();

    blobctl(&env_file)
        .args(["settings", "unset", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));

    assert!(!env_file.exists());
}

#[test]
fn test_pull_without_credentials_exits_2() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "AZURE_CONTAINER=backups\n").unwrap();

    blobctl(&env_file)
        .args(["pull", "some/blob.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing credential"));
}

#[test]
fn test_list_without_container_exits_2() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(
        &env_file,
        "AZURE_BLOB_CONNECTION_STRING=UseDevelopmentStorage=true\n",
    )
    .unwrap();

    blobctl(&env_file)
        .args(["list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Both connection string and container are mandatory.",
        ));
}

#[test]
fn test_invalid_log_level_in_file_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "LOG_LEVEL=11\n").unwrap();

    blobctl(&env_file)
        .args(["settings", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid LOG_LEVEL"));
}
