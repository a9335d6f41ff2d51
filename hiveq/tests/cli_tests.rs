use anyhow::Result;
use assert_cmd::Command;
use hiveq_core::infrastructure::adapters::thrift::fake_server::{Script, spawn_server};
use predicates::prelude::*;
use std::net::TcpListener;
use std::path::PathBuf;
use tempfile::TempDir;

/// Scratch directory holding a config file, with the binaries run from it.
struct HiveqTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl HiveqTestEnv {
    fn new(config: &str) -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        std::fs::write(root.join("config.yaml"), config)?;
        Ok(Self { _tmp: tmp, root })
    }

    fn hiveq(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hiveq"));
        cmd.current_dir(&self.root);
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("HIVEQ_PASSWORD");
        cmd
    }

    fn driver_download(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hive-driver-download"));
        cmd.current_dir(&self.root);
        cmd
    }
}

/// A localhost port with nothing listening on it.
fn closed_port() -> Result<u16> {
    Ok(TcpListener::bind("127.0.0.1:0")?.local_addr()?.port())
}

const TAGGED: &str = r#"
InputQuery1:
  host: 127.0.0.1
  port: 1
  username: alice
  database: default
  auth: NOSASL
InputQuery2:
  hive_jdbc_url: "jdbc:hive2://127.0.0.1:1/default"
  username: bob
  password: secret
"#;

#[test]
fn test_missing_config_file_fails() -> Result<()> {
    let env = HiveqTestEnv::new("")?;
    env.hiveq()
        .args(["--config", "absent.yaml", "--query", "SELECT 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.yaml"));
    Ok(())
}

#[test]
fn test_unknown_tag_lists_available_tags() -> Result<()> {
    let env = HiveqTestEnv::new(TAGGED)?;
    env.hiveq()
        .args(["-t", "Nope", "--query", "SELECT 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InputQuery1, InputQuery2"));
    Ok(())
}

#[test]
fn test_missing_jdbc_driver_class_is_reported() -> Result<()> {
    let env = HiveqTestEnv::new(TAGGED)?;
    env.hiveq()
        .args(["-t", "InputQuery2", "--query", "SELECT 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hive_driver_class"));
    Ok(())
}

#[test]
fn test_empty_stdin_without_query_fails() -> Result<()> {
    let env = HiveqTestEnv::new(TAGGED)?;
    env.hiveq()
        .args(["-t", "InputQuery1"])
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No query provided"));
    Ok(())
}

#[test]
fn test_missing_query_file_fails() -> Result<()> {
    let env = HiveqTestEnv::new(TAGGED)?;
    env.hiveq()
        .args(["-t", "InputQuery1", "-f", "nowhere.sql"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere.sql"));
    Ok(())
}

#[test]
fn test_unreachable_server_fails_without_output() -> Result<()> {
    let port = closed_port()?;
    let env = HiveqTestEnv::new(&format!(
        "host: 127.0.0.1\nport: {}\nusername: u\ndatabase: default\nauth: NOSASL\n\
         connect_timeout_secs: 2\nquery: SELECT 1\n",
        port
    ))?;

    env.hiveq()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect"));
    assert!(!env.root.join("output.csv").exists());
    Ok(())
}

/// Flat NOSASL profile pointing at a local fake HiveServer2.
fn fake_profile(port: u16) -> String {
    format!(
        "host: 127.0.0.1\nport: {}\nusername: u\ndatabase: default\nauth: NOSASL\n",
        port
    )
}

#[test]
fn test_select_one_writes_output_csv() -> Result<()> {
    let (port, _calls) = spawn_server(Script::SelectOne, false)?;
    let env = HiveqTestEnv::new(&fake_profile(port))?;

    env.hiveq()
        .args(["--query", "SELECT 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 rows to 'output.csv'"));
    assert_eq!(std::fs::read_to_string(env.root.join("output.csv"))?, "_c0\n1\n");
    Ok(())
}

#[test]
fn test_query_file_flag_names_the_csv() -> Result<()> {
    let (port, _calls) = spawn_server(Script::SelectOne, false)?;
    let env = HiveqTestEnv::new(&fake_profile(port))?;
    std::fs::create_dir_all(env.root.join("queries"))?;
    std::fs::write(env.root.join("queries/report.sql"), "SELECT 1\n")?;

    env.hiveq()
        .args(["--query-file", "queries/report.sql"])
        .assert()
        .success();
    assert_eq!(
        std::fs::read_to_string(env.root.join("queries/report.csv"))?,
        "_c0\n1\n"
    );
    assert!(!env.root.join("output.csv").exists());
    Ok(())
}

#[cfg(not(feature = "jdbc"))]
#[test]
fn test_jdbc_profile_without_feature_explains_rebuild() -> Result<()> {
    let env = HiveqTestEnv::new(
        "hive_jdbc_url: jdbc:hive2://127.0.0.1:1/default\n\
         hive_driver_class: org.apache.hive.jdbc.HiveDriver\n\
         username: u\npassword: p\ncheck_java: false\nquery: SELECT 1\n",
    )?;
    env.hiveq()
        .assert()
        .failure()
        .stderr(predicate::str::contains("no JDBC support"));
    Ok(())
}

#[test]
fn test_driver_download_exit_option() -> Result<()> {
    let env = HiveqTestEnv::new("")?;
    env.driver_download()
        .write_stdin("3\n")
        .assert()
        .success();
    assert!(!env.root.join("drivers").exists());
    Ok(())
}

#[test]
fn test_driver_download_manual_instructions() -> Result<()> {
    let env = HiveqTestEnv::new("")?;
    env.driver_download()
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("hive-jdbc-3.1.2-standalone.jar"));
    Ok(())
}

#[test]
fn test_driver_download_invalid_choice() -> Result<()> {
    let env = HiveqTestEnv::new("")?;
    env.driver_download()
        .write_stdin("7\n")
        .assert()
        .failure();
    Ok(())
}
