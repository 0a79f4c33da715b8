use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tally(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("HOME", home)
        .env_remove("TALLY_AUTH_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

fn init(home: &TempDir) {
    let data_dir = home.path().join("data");
    tally(home.path())
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized Tally"));
}

#[test]
fn commands_before_init_fail() {
    let home = TempDir::new().unwrap();
    tally(home.path())
        .args(["accounts", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tally init"));
}

#[test]
fn init_writes_settings_with_secret() {
    let home = TempDir::new().unwrap();
    init(&home);
    let settings = std::fs::read_to_string(home.path().join(".config/tally/settings.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&settings).unwrap();
    assert!(json["auth_secret"].as_str().unwrap().len() >= 32);
    assert!(home.path().join("data/tally.db").exists());
}

#[test]
fn account_and_transaction_flow() {
    let home = TempDir::new().unwrap();
    init(&home);

    tally(home.path())
        .args(["accounts", "add", "Checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added account: Checking"));
    tally(home.path())
        .args(["categories", "add", "Food"])
        .assert()
        .success();

    tally(home.path())
        .args([
            "transactions", "add", "--account", "checking", "--payee", "Grocer", "--amount",
            "-12.34", "--date", "2024-03-10", "--category", "Food",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grocer"));

    tally(home.path())
        .args(["transactions", "list", "--from", "2024-03-01", "--to", "2024-03-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grocer"))
        .stdout(predicate::str::contains("1 transaction(s)"));

    // Another user sees nothing.
    tally(home.path())
        .args(["--user", "bob", "transactions", "list", "--from", "2024-03-01", "--to", "2024-03-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 transaction(s)"));
}

#[test]
fn unknown_account_is_an_error() {
    let home = TempDir::new().unwrap();
    init(&home);
    tally(home.path())
        .args(["transactions", "add", "--account", "Nope", "--payee", "X", "--amount", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown account: Nope"));
}

#[test]
fn import_with_mapping_then_duplicate() {
    let home = TempDir::new().unwrap();
    init(&home);
    tally(home.path()).args(["accounts", "add", "Checking"]).assert().success();

    let csv = home.path().join("bank.csv");
    std::fs::write(
        &csv,
        "Posted,Description,Value\n\
         2024-03-01 09:00:00,Employer,2500.00\n\
         2024-03-02 12:30:00,Grocer,-45.10\n",
    )
    .unwrap();
    let csv = csv.to_str().unwrap();

    tally(home.path())
        .args(["import", csv, "--preview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Description"))
        .stdout(predicate::str::contains("2 data row(s)"));

    let args = [
        "import", csv, "--account", "Checking", "--amount-column", "2", "--date-column", "0",
        "--payee-column", "1",
    ];
    tally(home.path())
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 imported into Checking"));
    tally(home.path())
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
}

#[test]
fn import_map_flags_and_incomplete_mapping() {
    let home = TempDir::new().unwrap();
    init(&home);
    tally(home.path()).args(["accounts", "add", "Checking"]).assert().success();
    let csv = home.path().join("bank.csv");
    std::fs::write(&csv, "Amount,Date,Payee\n-5,2024-03-01,Kiosk\n").unwrap();
    let csv = csv.to_str().unwrap();

    tally(home.path())
        .args(["import", csv, "--account", "Checking", "--map", "0=amount", "--map", "1=date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("(2/3)"))
        .stderr(predicate::str::contains("payee"));

    tally(home.path())
        .args([
            "import", csv, "--account", "Checking", "--map", "0=amount", "--map", "1=date", "--map",
            "2=payee", "--date-format", "%Y-%m-%d",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 imported"));
}

#[test]
fn import_rejects_bad_date_format() {
    let home = TempDir::new().unwrap();
    init(&home);
    tally(home.path()).args(["accounts", "add", "Checking"]).assert().success();
    let csv = home.path().join("bank.csv");
    std::fs::write(&csv, "Date,Payee,Amount\n03/01/2024,Employer,10\n").unwrap();

    tally(home.path())
        .args([
            "import", csv.to_str().unwrap(), "--account", "Checking", "--amount-column", "2",
            "--date-column", "0", "--payee-column", "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("row 1"));
}

#[test]
fn summary_prints_totals() {
    let home = TempDir::new().unwrap();
    init(&home);
    tally(home.path()).args(["accounts", "add", "Checking"]).assert().success();
    tally(home.path())
        .args([
            "transactions", "add", "--account", "Checking", "--payee", "Employer", "--amount",
            "100", "--date", "2024-03-05",
        ])
        .assert()
        .success();

    tally(home.path())
        .args(["summary", "--from", "2024-03-01", "--to", "2024-03-07"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Income"))
        .stdout(predicate::str::contains("$100.00"))
        .stdout(predicate::str::contains("+100%"));
}

#[test]
fn summary_rejects_inverted_range() {
    let home = TempDir::new().unwrap();
    init(&home);
    tally(home.path())
        .args(["summary", "--from", "2024-03-07", "--to", "2024-03-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be after"));
}

#[test]
fn token_requires_secret() {
    let home = TempDir::new().unwrap();
    tally(home.path())
        .arg("token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TALLY_AUTH_SECRET"));

    tally(home.path())
        .arg("token")
        .env("TALLY_AUTH_SECRET", "s3cret")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[\w-]+\.[\w-]+\.[\w-]+\n$").unwrap());
}

#[test]
fn demo_is_idempotent() {
    let home = TempDir::new().unwrap();
    init(&home);
    tally(home.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data loaded"));
    tally(home.path())
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("already loaded"));
    tally(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Accounts:      2"));
}

#[test]
fn backup_writes_copy() {
    let home = TempDir::new().unwrap();
    init(&home);
    let out = home.path().join("copy.db");
    tally(home.path())
        .args(["backup", "--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup saved"));
    assert!(out.exists());
}
