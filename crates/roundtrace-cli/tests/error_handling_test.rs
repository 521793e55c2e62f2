use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use roundtrace_testing::TestWorld;
use roundtrace_testing::fixtures::CLAUDE_SESSION;

#[test]
fn test_missing_log_file() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("roundtrace");
    world.configure_command(&mut cmd).args(["rounds", "does-not-exist.jsonl"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error: Failed to read log"));
}

#[test]
fn test_round_out_of_range() {
    let world = TestWorld::new();
    let log = world.copy_sample(CLAUDE_SESSION, "session.jsonl").unwrap();

    let mut cmd = cargo_bin_cmd!("roundtrace");
    world
        .configure_command(&mut cmd)
        .args(["images", "--round", "5"])
        .arg(&log);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Round 5 not found (session has 2 rounds)"));
}

#[test]
fn test_invalid_config() {
    let world = TestWorld::new().with_config("preview_chars = \"many\"\n");
    let log = world.copy_sample(CLAUDE_SESSION, "session.jsonl").unwrap();

    let mut cmd = cargo_bin_cmd!("roundtrace");
    world.configure_command(&mut cmd).arg("rounds").arg(&log);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn test_explicit_config_must_exist() {
    let world = TestWorld::new();
    let log = world.copy_sample(CLAUDE_SESSION, "session.jsonl").unwrap();

    let mut cmd = cargo_bin_cmd!("roundtrace");
    world
        .configure_command(&mut cmd)
        .args(["--config", "missing.toml", "rounds"])
        .arg(&log);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found: missing.toml"));
}

#[test]
fn test_garbage_log_is_not_fatal() {
    let world = TestWorld::new();
    let log = world
        .write_log("garbage.jsonl", "not json\n{\"type\":\"progress\"}\n")
        .unwrap();

    let mut cmd = cargo_bin_cmd!("roundtrace");
    world
        .configure_command(&mut cmd)
        .args(["issues", "--format", "json"])
        .arg(&log);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"invalid_json\""))
        .stdout(predicate::str::contains("\"unsupported_record\""));
}

#[test]
fn test_verbose_logs_go_to_stderr() {
    let world = TestWorld::new();
    let log = world.copy_sample(CLAUDE_SESSION, "session.jsonl").unwrap();

    let mut cmd = cargo_bin_cmd!("roundtrace");
    world
        .configure_command(&mut cmd)
        .args(["-v", "rounds", "--format", "json"])
        .arg(&log);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
    assert!(String::from_utf8_lossy(&output.stderr).contains("assembled session"));
}
