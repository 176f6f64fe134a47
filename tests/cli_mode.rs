//! Integration tests for the sheetable binary against a CSV-backed table.

use std::path::PathBuf;
use std::process::Command;

const USERS: &str = "alice,alice@example.com\nbob,\ncarol,carol@example.com\n";

const CONFIG: &str = r#"
table_id = "users"

[scheme]
A = "username"
B = "email"
"#;

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Fixture {
        let dir = std::env::temp_dir().join(format!(
            "sheetable_cli_{}_{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tables.toml"), CONFIG).unwrap();
        std::fs::write(dir.join("users.csv"), USERS).unwrap();
        Fixture { dir }
    }

    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_sheetable"))
            .arg("--config")
            .arg(self.dir.join("tables.toml"))
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute sheetable");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        (stdout, stderr, exit_code)
    }

    fn csv(&self) -> String {
        std::fs::read_to_string(self.dir.join("users.csv")).unwrap()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

#[test]
fn test_count() {
    let fx = Fixture::new("count");
    let (stdout, _, code) = fx.run(&["count"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_read_all_rows() {
    let fx = Fixture::new("read_all");
    let (stdout, _, code) = fx.run(&["read"]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"email":"alice@example.com","username":"alice","__row":1}"#,
            r#"{"email":"","username":"bob","__row":2}"#,
            r#"{"email":"carol@example.com","username":"carol","__row":3}"#,
        ]
    );
}

#[test]
fn test_read_with_filter_limit_and_offset() {
    let fx = Fixture::new("read_filter");
    let (stdout, _, code) = fx.run(&["read", "--where", "username=bob"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), r#"{"email":"","username":"bob","__row":2}"#);

    let (stdout, _, code) = fx.run(&["read", "--offset", "1", "--limit", "1"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), r#"{"email":"","username":"bob","__row":2}"#);

    let (stdout, _, code) = fx.run(&["read", "--limit", "0"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
}

#[test]
fn test_update_sets_only_matching_rows() {
    let fx = Fixture::new("update");
    let (stdout, _, code) = fx.run(&[
        "update",
        "--where",
        "username=bob",
        "--set",
        "email=bob@example.com",
    ]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "updated");

    let (stdout, _, _) = fx.run(&["read", "--where", "email=bob@example.com"]);
    assert_eq!(
        stdout.trim(),
        r#"{"email":"bob@example.com","username":"bob","__row":2}"#
    );
    assert!(fx.csv().contains("carol,carol@example.com"));
}

#[test]
fn test_update_every_row_is_written_to_file() {
    let fx = Fixture::new("update_all");
    let (stdout, _, code) = fx.run(&["update", "--set", "email=reset@example.com"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "updated");
    assert_eq!(
        fx.csv(),
        "alice,reset@example.com\nbob,reset@example.com\ncarol,reset@example.com\n"
    );
}

#[test]
fn test_delete_requires_filter_or_all() {
    let fx = Fixture::new("delete_guard");
    let (_, stderr, code) = fx.run(&["delete"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("--all"));
    assert_eq!(fx.csv(), USERS);
}

#[test]
fn test_delete_matching_rows() {
    let fx = Fixture::new("delete");
    let (stdout, _, code) = fx.run(&["delete", "--where", "username=alice"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "deleted");

    let (stdout, _, _) = fx.run(&["count"]);
    assert_eq!(stdout.trim(), "2");
    let (stdout, _, _) = fx.run(&["read", "--limit", "1"]);
    assert_eq!(stdout.trim(), r#"{"email":"","username":"bob","__row":1}"#);
}

#[test]
fn test_delete_all() {
    let fx = Fixture::new("delete_all");
    let (_, _, code) = fx.run(&["delete", "--all"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = fx.run(&["count"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_create_appends_row() {
    let fx = Fixture::new("create");
    let (stdout, _, code) = fx.run(&[
        "create",
        "--set",
        "username=dave",
        "--set",
        "email=dave@example.com",
    ]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "created");

    let (stdout, _, _) = fx.run(&["read", "--where", "username=dave"]);
    assert_eq!(
        stdout.trim(),
        r#"{"email":"dave@example.com","username":"dave","__row":4}"#
    );
}

#[test]
fn test_sheets_lists_default_sheet() {
    let fx = Fixture::new("sheets");
    let (stdout, _, code) = fx.run(&["sheets"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), r#"{"id":0,"title":"users"}"#);
}

#[test]
fn test_missing_config_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_sheetable"))
        .args(["--config", "/nonexistent/sheetable/tables.toml", "count"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}
