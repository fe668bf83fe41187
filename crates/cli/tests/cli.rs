use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("libris")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("config"));
}

#[test]
fn config_prints_effective_settings() {
    let output = Command::cargo_bin("libris")
        .unwrap()
        .args(["--env", "staging", "config"])
        .env("LIBRIS_CONFIG_DIR", "/nonexistent-libris-config")
        .env("LIBRIS_DATABASE_BACKEND", "memory")
        .output()
        .unwrap();

    assert!(output.status.success());
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["environment"], "staging");
    assert_eq!(settings["database"]["backend"], "memory");
    assert_eq!(settings["server"]["port"], 8080);
}

#[test]
fn unknown_environment_fails() {
    Command::cargo_bin("libris")
        .unwrap()
        .args(["--env", "qa", "config"])
        .env("LIBRIS_CONFIG_DIR", "/nonexistent-libris-config")
        .assert()
        .failure();
}
