//! Integration tests for layered config resolution via `moor config show`.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_show_no_files_no_settings() {
    let env = TestEnv::new();
    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings: (none)"))
        .stdout(predicate::str::contains("(absent)"));
}

#[test]
fn test_show_system_layer_only() {
    let env = TestEnv::new();
    env.write_system_config("[llm]\nmodel = \"gpt-4o\"\n");

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM_MODEL=gpt-4o (system)"));
}

#[test]
fn test_user_layer_overrides_system_per_key() {
    let env = TestEnv::new();
    env.write_system_config("[llm]\nmodel = \"from-system\"\nnum_retries = 3\n");
    env.write_user_config("[llm]\nmodel = \"from-user\"\n");

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM_MODEL=from-user (user)"))
        .stdout(predicate::str::contains("LLM_NUM_RETRIES=3 (system)"));
}

#[test]
fn test_project_layer_overrides_user() {
    let env = TestEnv::new();
    env.write_user_config("[llm]\nmodel = \"from-user\"\n");
    env.write_project_config("client-work/app", "[llm]\nmodel = \"from-project\"\n");

    env.moor()
        .args(["config", "show", "client-work/app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM_MODEL=from-project (project)"));
}

#[test]
fn test_project_layer_skipped_without_project_argument() {
    let env = TestEnv::new();
    env.write_user_config("[llm]\nmodel = \"from-user\"\n");
    env.write_project_config("client-work/app", "[llm]\nmodel = \"from-project\"\n");

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM_MODEL=from-user (user)"));
}

#[test]
fn test_environment_overrides_all_files() {
    let env = TestEnv::new();
    env.write_project_config("client-work/app", "[llm]\nmodel = \"from-project\"\n");

    let mut cmd = env.moor();
    cmd.env("LLM_MODEL", "from-env");
    cmd.args(["config", "show", "client-work/app"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("LLM_MODEL=from-env (env)"));
}

#[test]
fn test_environment_only_value_appears() {
    let env = TestEnv::new();

    let mut cmd = env.moor();
    cmd.env("SANDBOX_ENABLE_GPU", "true");
    cmd.args(["config", "show"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SANDBOX_ENABLE_GPU=true (env)"));
}

#[test]
fn test_secrets_masked_in_output() {
    let env = TestEnv::new();
    env.write_user_config("[llm]\napi_key = \"sk-abcd1234efgh5678x\"\n");

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM_API_KEY=sk-a...678x (user)"))
        .stdout(predicate::str::contains("sk-abcd1234efgh5678x").not());
}

#[test]
fn test_short_secret_fully_masked() {
    let env = TestEnv::new();
    env.write_user_config("[llm]\napi_key = \"shortkey\"\n");

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM_API_KEY=******** (user)"))
        .stdout(predicate::str::contains("shortkey").not());
}

#[test]
fn test_malformed_file_warns_but_others_apply() {
    let env = TestEnv::new();
    env.write_system_config("not = [valid toml\n");
    env.write_user_config("[llm]\nmodel = \"gpt-4o\"\n");

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("warning: could not parse"))
        .stdout(predicate::str::contains("LLM_MODEL=gpt-4o (user)"));
}

#[test]
#[cfg(unix)]
fn test_world_readable_file_warns() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let env = TestEnv::new();
    env.write_user_config("[llm]\nmodel = \"gpt-4o\"\n");
    fs::set_permissions(
        env.user_config_path(),
        fs::Permissions::from_mode(0o644),
    )
    .unwrap();

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("readable by other users"))
        .stdout(predicate::str::contains("chmod 600"))
        .stdout(predicate::str::contains("LLM_MODEL=gpt-4o (user)"));
}

#[test]
fn test_unrecognized_keys_ignored() {
    let env = TestEnv::new();
    env.write_user_config("[llm]\nmodel = \"gpt-4o\"\nmystery = 1\n[custom]\nfoo = \"bar\"\n");

    env.moor()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM_MODEL=gpt-4o (user)"))
        .stdout(predicate::str::contains("mystery").not())
        .stdout(predicate::str::contains("foo").not());
}

#[test]
fn test_show_json_lists_files_and_settings() {
    let env = TestEnv::new();
    env.write_user_config("[core]\nmax_iterations = 120\n");

    let output = env
        .moor()
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let layers: Vec<_> = parsed["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["layer"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(layers, vec!["system", "user"]);
    let settings = parsed["settings"].as_array().unwrap();
    assert!(
        settings
            .iter()
            .any(|s| s.as_str().unwrap() == "CORE_MAX_ITERATIONS=120 (user)")
    );
}
