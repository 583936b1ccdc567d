#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

mod common;

use assert_cmd::Command;
use common::TestEnv;
use predicates::prelude::*;

const PASSWORD: &str = "S3cret!pass";

/// 必須項目を指定済みの create コマンド
fn create_cmd(env: &TestEnv) -> Command {
    let mut cmd = Command::cargo_bin("sqlmi").unwrap();
    cmd.current_dir(env.path())
        .env("SQLMI_CONFIG_PATH", env.config_path())
        .env_remove("SQLMI_RESOURCE_GROUP")
        .env_remove("SQLMI_AZ_PATH")
        .env_remove("RUST_LOG")
        .env("SQLMI_ADMIN_PASSWORD", PASSWORD)
        .args([
            "create",
            "-g",
            "rg1",
            "-n",
            "sqlmi1",
            "-l",
            "japaneast",
            "--subnet-id",
            "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet/subnets/mi",
            "-u",
            "miadmin",
        ]);
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("sqlmi").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("version"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("sqlmi").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlmi"));
}

/// createコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_create_help() {
    let mut cmd = Command::cargo_bin("sqlmi").unwrap();
    cmd.arg("create")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--resource-group"))
        .stdout(predicate::str::contains("--tag"))
        .stdout(predicate::str::contains("--as-job"))
        .stdout(predicate::str::contains("--dry-run"));
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("sqlmi").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

/// 名前なしの create はエラー
#[test]
fn test_create_requires_name() {
    let env = TestEnv::new();
    let mut cmd = Command::cargo_bin("sqlmi").unwrap();
    cmd.current_dir(env.path())
        .env("SQLMI_CONFIG_PATH", env.config_path())
        .env_remove("SQLMI_RESOURCE_GROUP")
        .args(["create", "-g", "rg1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

/// 設定ファイルにも無い必須項目は分かりやすいエラーになる
#[test]
fn test_create_requires_location() {
    let env = TestEnv::new();
    let mut cmd = Command::cargo_bin("sqlmi").unwrap();
    cmd.current_dir(env.path())
        .env("SQLMI_CONFIG_PATH", env.config_path())
        .env("SQLMI_ADMIN_PASSWORD", PASSWORD)
        .args(["create", "-g", "rg1", "-n", "sqlmi1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--location"));
}

/// 不正な SKU は引数解析で弾かれる
#[test]
fn test_invalid_sku() {
    let env = TestEnv::new();
    create_cmd(&env)
        .args(["--sku", "Premium"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown SKU"));
}

/// vCore 数 0 は受け付けない
#[test]
fn test_zero_vcores_rejected() {
    let env = TestEnv::new();
    create_cmd(&env)
        .args(["--vcores", "0"])
        .assert()
        .failure();
}

/// タグ重複は az を呼ぶ前にエラーになる（az が存在しなくても同じ結果）
#[test]
fn test_duplicate_tags_fail_before_any_call() {
    let env = TestEnv::new();
    create_cmd(&env)
        .args(["--tag", "env=prod", "--tag", "ENV=dev"])
        .args(["--az-path", "/nonexistent/az"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate tag"));
}

/// 設定ファイルにパスワードは書けない
#[test]
fn test_password_in_config_rejected() {
    let env = TestEnv::new();
    env.write_config("admin_password: hunter2\n");
    create_cmd(&env).assert().failure();
}

/// az が見つからない場合はゲートウェイのエラーとして失敗する
#[test]
fn test_missing_az_binary() {
    let env = TestEnv::new();
    create_cmd(&env)
        .args(["--az-path", "/nonexistent/az"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/az"));
}

/// dry-run は desired state を表示し、パスワードは出さない
#[cfg(unix)]
#[test]
fn test_dry_run_masks_password() {
    let env = TestEnv::new();
    let az = env.write_fake_az(None, common::INSTANCE_JSON);

    create_cmd(&env)
        .args(["--dry-run", "-o", "json", "--tag", "env=prod"])
        .arg("--az-path")
        .arg(&az)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"administratorPassword\": \"********\""))
        .stdout(predicate::str::contains("\"env\": \"prod\""))
        .stdout(predicate::str::contains(PASSWORD).not());

    assert!(!env.create_marker().exists());
}

/// 存在しなければ作成し、結果を表示する
#[cfg(unix)]
#[test]
fn test_create_when_absent() {
    let env = TestEnv::new();
    let az = env.write_fake_az(None, common::INSTANCE_JSON);

    create_cmd(&env)
        .args(["-o", "json"])
        .arg("--az-path")
        .arg(&az)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"sqlmi1\""))
        .stdout(predicate::str::contains(PASSWORD).not())
        .stderr(predicate::str::contains(PASSWORD).not());

    let submitted = std::fs::read_to_string(env.create_marker()).unwrap();
    assert!(submitted.contains("--edition GeneralPurpose"));
    assert!(submitted.contains("--capacity 4"));
}

/// 既存インスタンスがあれば作成せずに失敗する
#[cfg(unix)]
#[test]
fn test_existing_instance_is_conflict() {
    let env = TestEnv::new();
    let az = env.write_fake_az(Some(common::INSTANCE_JSON), common::INSTANCE_JSON);

    create_cmd(&env)
        .arg("--az-path")
        .arg(&az)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert!(!env.create_marker().exists());
}

/// ジョブとして実行しても同じ結果になる
#[cfg(unix)]
#[test]
fn test_create_as_job() {
    let env = TestEnv::new();
    let az = env.write_fake_az(None, common::INSTANCE_JSON);

    create_cmd(&env)
        .args(["--as-job", "-o", "json"])
        .arg("--az-path")
        .arg(&az)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"sqlmi1\""));

    assert!(env.create_marker().exists());
}
