//! End-to-end tests for the `bondfolio` binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RUB_BOND: &str = r#"{
    "securities": {
        "columns": ["SECID", "BOARDID", "SECNAME", "FACEVALUE", "FACEUNIT", "LOTSIZE",
                    "COUPONVALUE", "COUPONPERCENT", "COUPONPERIOD", "NEXTCOUPON", "MATDATE",
                    "ISIN", "STATUS"],
        "data": [["SU26238RMFS4", "TQOB", "OFZ 26238", 1000, "SUR", 1,
                  35.4, 7.1, 182, "2025-06-04", "2026-12-02", "RU000A1038V6", "A"]]
    },
    "marketdata": {
        "columns": ["SECID", "LAST", "YIELD", "DURATION"],
        "data": [["SU26238RMFS4", 95.0, 16.2, 640]]
    },
    "marketdata_yields": {
        "columns": ["SECID", "EFFECTIVEYIELD"],
        "data": [["SU26238RMFS4", 16.9]]
    }
}"#;

const USD_BOND: &str = r#"{
    "securities": {
        "columns": ["SECID", "BOARDID", "SECNAME", "FACEVALUE", "FACEUNIT", "LOTSIZE",
                    "COUPONVALUE", "COUPONPERCENT", "COUPONPERIOD", "NEXTCOUPON", "MATDATE",
                    "ISIN", "STATUS"],
        "data": [["RU000A105SG2", "TQCB", "Metinvest 01", 100, "USD", 1,
                  2.25, 4.5, 182, "2025-03-10", "2027-09-06", "RU000A105SG2", "A"]]
    },
    "marketdata": {
        "columns": ["SECID", "LAST", "YIELD", "DURATION"],
        "data": [["RU000A105SG2", 98.5, 5.3, 900]]
    }
}"#;

const CURRENCIES: &str = r#"{
    "marketdata": {
        "columns": ["SECID", "TRADEDATE", "LASTVALUE"],
        "data": [["USDFIX", "2025-01-14", 90.0], ["CNYFIX", "2025-01-14", 12.5]]
    }
}"#;

/// Temp workspace with an ISS directory, a portfolio and an isolated config.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let iss = dir.path().join("iss");
        std::fs::create_dir(&iss).unwrap();
        std::fs::write(iss.join("RU000A1038V6.json"), RUB_BOND).unwrap();
        std::fs::write(iss.join("RU000A105SG2.json"), USD_BOND).unwrap();
        std::fs::write(iss.join("currencies.json"), CURRENCIES).unwrap();
        std::fs::write(
            dir.path().join("portfolio.csv"),
            "isin,lots\nRU000A1038V6,10\nRU000A105SG2,5\n",
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("bondfolio").unwrap();
        cmd.env("BONDFOLIO_CONFIG_DIR", self.path("config"))
            .env("BONDFOLIO_STORE", self.path("bonds.redb"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn import(&self) {
        self.cmd()
            .args(["import", "--dir"])
            .arg(self.path("iss"))
            .arg("--portfolio")
            .arg(self.path("portfolio.csv"))
            .assert()
            .success();
    }

    fn report_json(&self, extra: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .args(["--format", "json", "report", "--as-of", "2025-01-15", "--portfolio"])
            .arg(self.path("portfolio.csv"))
            .args(extra)
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn write(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_help() {
    Command::cargo_bin("bondfolio")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_import_json() {
    let ws = Workspace::new();
    let output = ws
        .cmd()
        .args(["--format", "json", "import", "--dir"])
        .arg(ws.path("iss"))
        .arg("--portfolio")
        .arg(ws.path("portfolio.csv"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fetched"], 2);
    assert_eq!(json["missing"], 0);
    assert_eq!(json["cached_instruments"], 2);
    assert_eq!(json["currencies"], serde_json::json!(["CNY", "USD"]));
}

#[test]
fn test_import_reports_missing_documents() {
    let ws = Workspace::new();
    write(
        &ws.path("portfolio.csv"),
        "isin,lots\nRU000A1038V6,10\nRU000A0ZZZZ9,1\n",
    );

    ws.cmd()
        .args(["--format", "minimal", "import", "--dir"])
        .arg(ws.path("iss"))
        .arg("--portfolio")
        .arg(ws.path("portfolio.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1"))
        .stderr(predicate::str::contains("RU000A0ZZZZ9"));
}

#[test]
fn test_report_full() {
    let ws = Workspace::new();
    ws.import();

    let json = ws.report_json(&[]);
    assert_eq!(json["as_of"], "2025-01-15");
    assert_eq!(json["base_currency"], "RUB");
    assert_eq!(json["holdings"].as_array().unwrap().len(), 2);
    assert_eq!(json["currency_metrics"].as_array().unwrap().len(), 2);
    assert!(json["total_value_base"].as_f64().unwrap() > 0.0);
    assert_eq!(json["benchmarks"], serde_json::json!([]));

    let calendar = json["calendar"].as_array().unwrap();
    assert_eq!(calendar[0]["month"], "2025-01-01");
}

#[test]
fn test_report_shares_sum_to_one() {
    let ws = Workspace::new();
    ws.import();

    let metrics = ws.report_json(&["--metrics-only"]);
    let total: f64 = metrics
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["total_share"].as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_report_calendar_only() {
    let ws = Workspace::new();
    ws.import();

    let calendar = ws.report_json(&["--calendar-only"]);
    let months = calendar.as_array().unwrap();
    assert!(!months.is_empty());
    let june = months
        .iter()
        .find(|m| m["month"] == "2025-06-01")
        .unwrap();
    // Ten lots of the ruble bond pay 35.4 each
    assert!((june["amount"].as_f64().unwrap() - 354.0).abs() < 1e-6);
}

#[test]
fn test_report_in_usd_crosses_ruble_fixing() {
    let ws = Workspace::new();
    ws.import();

    let json = ws.report_json(&["--base-currency", "usd"]);
    assert_eq!(json["base_currency"], "USD");
    assert_eq!(json["currency_metrics"].as_array().unwrap().len(), 2);

    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert!(!diagnostics
        .iter()
        .any(|d| d["kind"] == "unresolved_currency"));

    let holdings = json["holdings"].as_array().unwrap();
    let in_currency = |code: &str| {
        holdings
            .iter()
            .find(|h| h["instrument"]["face_currency"] == code)
            .unwrap()
    };
    let rub = in_currency("RUB");
    let usd = in_currency("USD");
    assert!((rub["fx_rate_to_base"].as_f64().unwrap() - 1.0 / 90.0).abs() < 1e-12);
    assert_eq!(usd["fx_rate_to_base"], 1.0);
}

#[test]
fn test_report_modes_conflict() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["report", "--calendar-only", "--metrics-only", "--portfolio"])
        .arg(ws.path("portfolio.csv"))
        .assert()
        .failure();
}

#[test]
fn test_report_table() {
    let ws = Workspace::new();
    ws.import();

    ws.cmd()
        .args(["report", "--as-of", "2025-01-15", "--portfolio"])
        .arg(ws.path("portfolio.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Currency Metrics"))
        .stdout(predicate::str::contains("Coupon Calendar (RUB)"))
        .stdout(predicate::str::contains("2025-06"));
}

#[test]
fn test_report_with_curves() {
    let ws = Workspace::new();
    ws.import();
    write(
        &ws.path("curves.csv"),
        "currency,period,value\nRUB,1,17.0\nRUB,5,15.0\nUSD,1,4.0\nUSD,5,4.4\n",
    );

    let curves = ws.path("curves.csv");
    let json = ws.report_json(&["--curves", curves.to_str().unwrap()]);
    assert_eq!(json["benchmarks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_report_bad_lot_count() {
    let ws = Workspace::new();
    write(&ws.path("portfolio.csv"), "isin,lots\nRU000A1038V6,ten\n");

    ws.cmd()
        .args(["report", "--portfolio"])
        .arg(ws.path("portfolio.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_report_invalid_date() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["report", "--as-of", "15/01/2025", "--portfolio"])
        .arg(ws.path("portfolio.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date format"));
}

#[test]
fn test_inspect() {
    let ws = Workspace::new();
    ws.import();

    let output = ws
        .cmd()
        .args(["--format", "json", "inspect", "RU000A1038V6", "--as-of", "2025-01-15"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let row: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(row["face_currency"], "RUB");
    assert!(row.get("maturity_date").is_some());
}

#[test]
fn test_inspect_not_cached() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["inspect", "RU000A0ZZZZ9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the store"));
}

#[test]
fn test_config_roundtrip() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "currency", "USD"])
        .assert()
        .success();
    ws.cmd()
        .args(["--format", "minimal", "config", "get", "base_currency"])
        .assert()
        .success()
        .stdout("USD\n");

    ws.cmd()
        .args(["config", "reset", "base_currency"])
        .assert()
        .success();
    ws.cmd()
        .args(["--format", "minimal", "config", "get", "base_currency"])
        .assert()
        .success()
        .stdout("RUB\n");
}

#[test]
fn test_config_rejects_bad_values() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "precision", "42"])
        .assert()
        .failure();
    ws.cmd()
        .args(["config", "set", "day_count", "ACT/360"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_configured_base_currency_applies_to_report() {
    let ws = Workspace::new();
    ws.import();
    ws.cmd()
        .args(["config", "set", "base_currency", "USD"])
        .assert()
        .success();

    let json = ws.report_json(&[]);
    assert_eq!(json["base_currency"], "USD");
}
