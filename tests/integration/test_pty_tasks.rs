//! Integration Tests for PTY-hosted CLI tasks
//!
//! Runs the built-in commands against a stand-in `azd` script so the whole
//! path is exercised: config, executable lookup, handler, PTY executor and
//! terminal host.

use azdterm::commands::{PipelineOptions, LOGIN_COMMAND_ID, PIPELINE_CONFIG_COMMAND_ID};
use azdterm::config::{CliConfig, Config};
use azdterm::error::Error;
use azdterm::task::TerminalPanel;
use azdterm::{default_registry, TerminalHost};
use std::sync::Arc;
use std::time::Duration;

/// Collect output until the terminal closes or `timeout` passes
async fn collect_output(panel: &TerminalPanel, timeout: Duration) -> String {
    let mut out = Vec::new();
    let _ = tokio::time::timeout(timeout, async {
        while let Some(chunk) = panel.read_output().await {
            out.extend_from_slice(&chunk);
        }
    })
    .await;
    String::from_utf8_lossy(&out).to_string()
}

fn pty_unavailable(err: &Error) -> bool {
    matches!(
        err,
        Error::PtyCreationFailed { .. } | Error::CommandSpawnFailed { .. }
    )
}

#[cfg(unix)]
fn fake_azd(dir: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("azd");
    std::fs::write(
        &path,
        "#!/bin/sh\necho \"args: $*\"\nread answer\necho \"answer: $answer\"\nexit 3\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
fn config_for(executable: std::path::PathBuf) -> Config {
    Config {
        cli: CliConfig {
            executable: Some(executable),
            ..CliConfig::default()
        },
        ..Config::default()
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_login_runs_interactively_in_focused_terminal() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = config_for(fake_azd(dir.path()));
    let host = Arc::new(TerminalHost::new());
    let registry = default_registry(&config, Arc::clone(&host), PipelineOptions::default());

    if let Err(e) = registry.invoke(LOGIN_COMMAND_ID).await {
        assert!(pty_unavailable(&e), "unexpected error: {}", e);
        return;
    }

    let terminal = host.focused().await.expect("login terminal should be focused");
    assert_eq!(terminal.title(), "Azure Dev CLI");
    assert_eq!(terminal.command().last().map(String::as_str), Some("login"));

    terminal.send_input(b"y\n").await.unwrap();
    let output = collect_output(&terminal, Duration::from_secs(10)).await;

    assert!(output.contains("args: login"), "output was: {:?}", output);
    assert!(output.contains("answer: y"), "output was: {:?}", output);
    assert_eq!(terminal.wait().await, 3);
}

#[cfg(unix)]
#[tokio::test]
async fn test_pipeline_config_passes_flags() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = config_for(fake_azd(dir.path()));
    let host = Arc::new(TerminalHost::new());
    let options = PipelineOptions {
        principal_name: Some("ci-sp".to_string()),
        ..PipelineOptions::default()
    };
    let registry = default_registry(&config, Arc::clone(&host), options);

    if let Err(e) = registry.invoke(PIPELINE_CONFIG_COMMAND_ID).await {
        assert!(pty_unavailable(&e), "unexpected error: {}", e);
        return;
    }

    let terminal = host.focused().await.unwrap();
    terminal.send_input(b"\n").await.unwrap();
    let output = collect_output(&terminal, Duration::from_secs(10)).await;
    assert!(
        output.contains(
            "args: pipeline config --principal-name ci-sp --remote-name origin --principal-role Contributor"
        ),
        "output was: {:?}",
        output
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_each_login_gets_a_new_terminal() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = config_for(fake_azd(dir.path()));
    let host = Arc::new(TerminalHost::new());
    let registry = default_registry(&config, Arc::clone(&host), PipelineOptions::default());

    if registry.invoke(LOGIN_COMMAND_ID).await.is_err() {
        return;
    }
    let first = host.focused().await.unwrap();
    registry.invoke(LOGIN_COMMAND_ID).await.unwrap();
    let second = host.focused().await.unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(host.count().await, 2);

    host.close(first.id()).await.unwrap();
    host.close(second.id()).await.unwrap();
    assert_eq!(host.count().await, 0);
}

#[tokio::test]
async fn test_missing_cli_fails_without_terminal() {
    let config = Config {
        cli: CliConfig {
            program: "azd-missing-for-tests-xyz".to_string(),
            executable: None,
            global_args: Vec::new(),
        },
        ..Config::default()
    };
    let host = Arc::new(TerminalHost::new());
    let registry = default_registry(&config, Arc::clone(&host), PipelineOptions::default());

    let err = registry.invoke(LOGIN_COMMAND_ID).await.unwrap_err();
    assert!(matches!(err, Error::CliNotFound { .. }));
    assert_eq!(host.count().await, 0);
}
