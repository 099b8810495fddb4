//! Exit status of the built binaries.

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Kills the child if a test fails before it exits on its own.
struct ChildGuard(Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

#[test]
fn test_service_exits_nonzero_without_credentials() {
    let output = Command::new(env!("CARGO_BIN_EXE_api-sed-aggregator"))
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_KEY")
        .env_remove("SED_AGGREGATOR_CONFIG")
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run service binary");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_service_rejects_blank_credentials() {
    let output = Command::new(env!("CARGO_BIN_EXE_api-sed-aggregator"))
        .env("SUPABASE_URL", "   ")
        .env("SUPABASE_KEY", "")
        .env_remove("SED_AGGREGATOR_CONFIG")
        .output()
        .expect("failed to run service binary");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_service_rejects_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service.toml");
    std::fs::write(&path, "[timeouts]\ndrain_secs = 0\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_api-sed-aggregator"))
        .arg("--config")
        .arg(&path)
        .env("SUPABASE_URL", "https://example.supabase.co")
        .env("SUPABASE_KEY", "test-key")
        .env_remove("SED_AGGREGATOR_DRAIN_TIMEOUT_SECS")
        .output()
        .expect("failed to run service binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("drain"), "stderr: {stderr}");
}

#[test]
fn test_uploader_requires_date_with_device() {
    let output = Command::new(env!("CARGO_BIN_EXE_sed-upload"))
        .args(["--device-id", "device-a"])
        .output()
        .expect("failed to run uploader binary");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_uploader_rejects_malformed_date() {
    let output = Command::new(env!("CARGO_BIN_EXE_sed-upload"))
        .args(["--device-id", "device-a", "--date", "2025-13-40"])
        .output()
        .expect("failed to run uploader binary");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_uploader_with_nothing_to_do_succeeds() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sed-upload"))
        .arg("--base-dir")
        .arg(dir.path())
        .args(["--upload-url", "http://127.0.0.1:9/upload/analysis/sed-summary"])
        .output()
        .expect("failed to run uploader binary");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Nothing to upload"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_service_serves_on_8010_and_exits_zero_on_sigterm() {
    let child = Command::new(env!("CARGO_BIN_EXE_api-sed-aggregator"))
        .env("SUPABASE_URL", "https://example.supabase.co")
        .env("SUPABASE_KEY", "test-key")
        .env_remove("SED_AGGREGATOR_CONFIG")
        .env_remove("SED_AGGREGATOR_DRAIN_TIMEOUT_SECS")
        .env("RUST_LOG", "error")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start service binary");
    let mut child = ChildGuard(child);

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        if let Ok(res) = client.get("http://127.0.0.1:8010/health").send().await {
            assert_eq!(res.status(), reqwest::StatusCode::OK);
            break;
        }
        assert!(
            child.0.try_wait().unwrap().is_none(),
            "service exited before serving"
        );
        assert!(Instant::now() < deadline, "service never answered on :8010");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let status = Command::new("kill")
        .args(["-TERM", &child.0.id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(15);
    let exit = loop {
        if let Some(exit) = child.0.try_wait().unwrap() {
            break exit;
        }
        assert!(Instant::now() < deadline, "service did not stop after SIGTERM");
        tokio::time::sleep(Duration::from_millis(50)).await;
    };
    assert_eq!(exit.code(), Some(0));
}
