use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the caller's `.env`, config files and credentials
fn isolated(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kirtan-pipeline").unwrap();
    cmd.env_clear()
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .current_dir(dir.path());
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();

    isolated(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("run")
                .and(predicate::str::contains("latest"))
                .and(predicate::str::contains("transcript"))
                .and(predicate::str::contains("config")),
        );
}

#[test]
fn run_refuses_placeholder_credentials() {
    let dir = tempfile::tempdir().unwrap();

    isolated(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("API keys are not set")
                .and(predicate::str::contains("YOUTUBE_API_KEY"))
                .and(predicate::str::contains("FACEBOOK_ACCESS_TOKEN")),
        );
}

#[test]
fn run_names_only_the_missing_credentials() {
    let dir = tempfile::tempdir().unwrap();

    isolated(&dir)
        .env("YOUTUBE_API_KEY", "key")
        .env("YOUTUBE_CHANNEL_ID", "UC123")
        .env("FACEBOOK_PAGE_ID", "4242")
        .arg("run")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("FACEBOOK_ACCESS_TOKEN")
                .and(predicate::str::contains("YOUTUBE_API_KEY").not()),
        );
}

#[test]
fn latest_needs_only_youtube_credentials() {
    let dir = tempfile::tempdir().unwrap();

    isolated(&dir)
        .env("YOUTUBE_CHANNEL_ID", "UC123")
        .arg("latest")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("YOUTUBE_API_KEY")
                .and(predicate::str::contains("FACEBOOK").not()),
        );
}

#[test]
fn config_show_masks_secrets() {
    let dir = tempfile::tempdir().unwrap();

    isolated(&dir)
        .env("FACEBOOK_ACCESS_TOKEN", "EAAB-secret-token-9876")
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("****9876")
                .and(predicate::str::contains("EAAB-secret").not()),
        );
}

#[test]
fn config_init_writes_template() {
    let dir = tempfile::tempdir().unwrap();

    isolated(&dir)
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));

    let written = dir
        .path()
        .join(".config")
        .join("kirtan-pipeline")
        .join("config.yaml");
    let content = fs_err::read_to_string(written).unwrap();
    assert!(content.contains("YOUR_YOUTUBE_API_KEY"));
}

#[test]
fn config_init_conflicts_with_show() {
    let dir = tempfile::tempdir().unwrap();

    isolated(&dir)
        .args(["config", "--show", "--init"])
        .assert()
        .failure();
}

#[test]
fn config_init_ignores_broken_local_config() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(dir.path().join("config.yaml"), "youtube: [not, a, map").unwrap();

    isolated(&dir)
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Configuration template written to")
                .and(predicate::str::contains("takes precedence")),
        );

    assert!(dir
        .path()
        .join(".config")
        .join("kirtan-pipeline")
        .join("config.yaml")
        .exists());
}

#[test]
fn partial_local_config_layers_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(
        dir.path().join("config.yaml"),
        "pipeline:\n  require_review: true\n",
    )
    .unwrap();

    isolated(&dir)
        .env("YOUTUBE_API_KEY", "yt-key-0001")
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Require Review: true")
                .and(predicate::str::contains("****0001"))
                .and(predicate::str::contains("Graph API Version: v19.0")),
        );
}
