use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn scratch_token_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("travelbook-cli-{}", uuid::Uuid::new_v4()))
        .join("token")
}

fn cmd() -> Command {
    cmd_with_token(&scratch_token_path())
}

fn cmd_with_token(token: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("travelbook"));
    cmd.env("TRAVELBOOK_TOKEN_PATH", token)
        .env_remove("TRAVELBOOK_CATALOG")
        .env_remove("TRAVELBOOK_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn top_level_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Search and book flights, trains and buses from the terminal",
        ))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("shell"))
        .stdout(predicate::str::contains("Examples:"));
}

#[test]
fn top_level_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("travelbook 0.3.0"));
}

#[test]
fn search_help_shows_filters() {
    cmd()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--type <TYPE>"))
        .stdout(predicate::str::contains("-f, --from <CITY>"))
        .stdout(predicate::str::contains("-t, --to <CITY>"))
        .stdout(predicate::str::contains("-d, --date <YYYY-MM-DD>"))
        .stdout(predicate::str::contains("--passengers <N>"))
        .stdout(predicate::str::contains("--max-price <PRICE>"))
        .stdout(predicate::str::contains("--min-seats <N>"))
        .stdout(predicate::str::contains("--catalog <PATH>"))
        .stdout(predicate::str::contains("[default: 1]"))
        .stdout(predicate::str::contains("By route:"));
}

#[test]
fn search_without_filters_lists_everything() {
    cmd()
        .args(["search", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FL001"))
        .stdout(predicate::str::contains("TR002"))
        .stdout(predicate::str::contains("BS003"));
}

#[test]
fn search_compact_line_format() {
    cmd()
        .args(["search", "--type", "flight", "-f", "New York", "--compact"])
        .assert()
        .success()
        .stdout(
            "FL001 | flight | new-york>los-angeles | 2024-09-15 08:30 | 5h 30m | 12 seats | $299.00\n",
        );
}

#[test]
fn search_table_output() {
    cmd()
        .args(["search", "-t", "denver"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TR002"))
        .stdout(predicate::str::contains("Amtrak"))
        .stdout(predicate::str::contains("FL001").not());
}

#[test]
fn search_no_match_message() {
    cmd()
        .args(["search", "-t", "chicago"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No travel options found."));
}

#[test]
fn search_json_is_array_in_catalog_order() {
    let output = cmd()
        .args(["search", "-t", "los-angeles", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let ids: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["FL001", "BS003"]);
    assert_eq!(parsed[0]["availableSeats"], 12);
}

#[test]
fn search_top_truncates() {
    let output = cmd().args(["search", "--top", "1", "--json"]).assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}

#[test]
fn blank_type_and_date_are_ignored() {
    cmd()
        .args(["search", "--type", "", "-d", "", "-f", "", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FL001"))
        .stdout(predicate::str::contains("TR002"))
        .stdout(predicate::str::contains("BS003"));
}

#[test]
fn invalid_date_format() {
    cmd()
        .args(["search", "-d", "15-09-2024"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn invalid_travel_type() {
    cmd()
        .args(["search", "--type", "boat"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid travel type"));
}

#[test]
fn too_many_passengers_in_search() {
    cmd()
        .args(["search", "--passengers", "5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exceeds maximum of 4"));
}

#[test]
fn json_mode_error_is_structured() {
    let output = cmd()
        .args(["search", "-d", "yesterday", "--json"])
        .assert()
        .failure();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON error");
    assert_eq!(parsed["error"]["kind"], "invalid_date");
    assert!(parsed["error"]["message"]
        .as_str()
        .unwrap()
        .contains("YYYY-MM-DD"));
}

#[test]
fn book_prints_confirmed_booking() {
    let output = cmd()
        .args(["book", "TR002", "-p", "Ada Lovelace:36", "-p", "Bob:40", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let booking: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(booking["travelId"], "TR002");
    assert_eq!(booking["passengers"], 2);
    assert_eq!(booking["totalPrice"], 178.0);
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["passengerDetails"][0]["name"], "Ada Lovelace");
    assert!(booking["id"].as_str().unwrap().starts_with("BK"));
}

#[test]
fn book_table_output() {
    cmd()
        .args(["book", "FL001", "-p", "Ada:36"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Booking confirmed: BK"))
        .stdout(predicate::str::contains("$299.00"));
}

#[test]
fn book_over_capacity_fails() {
    cmd()
        .args(["book", "BS003", "-p", "A:20", "-p", "B:21", "-p", "C:22", "-p", "D:23"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not enough seats"));
}

#[test]
fn book_with_empty_name_fails() {
    cmd()
        .args(["book", "FL001", "-p", " :30"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("incomplete details"));
}

#[test]
fn book_passenger_count_mismatch_fails() {
    cmd()
        .args(["book", "FL001", "-p", "Ada:36", "--passengers", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected 2 passengers, got 1"));
}

#[test]
fn book_without_passengers_fails() {
    cmd()
        .args(["book", "FL001"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--passenger"));
}

#[test]
fn book_unknown_travel_fails() {
    cmd()
        .args(["book", "ZZ999", "-p", "Ada:36", "--json"])
        .assert()
        .code(6)
        .stdout(predicate::str::contains("no_such_travel"));
}

#[test]
fn shell_books_and_cancels_in_one_session() {
    cmd()
        .arg("shell")
        .write_stdin("search type=train\nbook TR002 \"Ada Lovelace:36\"\nbookings\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 travel options"))
        .stdout(predicate::str::contains("Booking confirmed: BK"))
        .stdout(predicate::str::contains("| TR002 | chicago>denver |"));
}

#[test]
fn catalog_file_replaces_builtin_options() {
    let path = std::env::temp_dir().join(format!("travelbook-catalog-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"[{"id": "BS100", "type": "bus", "source": "austin", "destination": "dallas",
             "date": "2030-01-02", "time": "06:05", "duration": "3h", "price": 25,
             "availableSeats": 40}]"#,
    )
    .unwrap();

    cmd()
        .args(["search", "--compact", "--catalog"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("BS100"))
        .stdout(predicate::str::contains("FL001").not());
}

#[test]
fn bad_catalog_file_fails() {
    let path = std::env::temp_dir().join(format!("travelbook-catalog-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, "not json").unwrap();

    cmd()
        .args(["search", "--catalog"])
        .arg(&path)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("invalid catalog"));
}

#[test]
fn login_requires_fields() {
    cmd()
        .args(["login", "--email", "ada@example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("please fill in all fields"));
}

#[test]
fn register_rejects_short_password() {
    cmd()
        .args([
            "register",
            "--username",
            "ada",
            "--email",
            "ada@example.com",
            "--password",
            "abc",
            "--password-confirm",
            "abc",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least 6 characters"));
}

#[test]
fn invalid_api_url_env_does_not_affect_offline_commands() {
    cmd()
        .env("TRAVELBOOK_API_URL", "ftp://example.com")
        .args(["search", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FL001"));
}

#[test]
fn invalid_api_url_env_is_config_error_for_login() {
    cmd()
        .env("TRAVELBOOK_API_URL", "ftp://example.com")
        .args(["login", "--email", "ada@example.com", "--password", "s3cret!"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("TRAVELBOOK_API_URL"));
}

#[test]
fn logout_clears_token_even_without_a_client() {
    let token = scratch_token_path();
    std::fs::create_dir_all(token.parent().unwrap()).unwrap();
    std::fs::write(&token, "tok-cli").unwrap();

    cmd_with_token(&token)
        .env("TRAVELBOOK_API_URL", "ftp://example.com")
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    assert!(!token.exists());
}
