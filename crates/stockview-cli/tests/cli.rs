use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const SALES_TEXT: &str = "LAPORAN PENJUALAN
Tanggal  Customer  Faktur  Kode Produk  Qty  Harga  Total
01/10/2025  MW SHOPEE  JL-050222  BN02-12H  1  44900  44900
Halaman 1 dari 1
";

const STOCK_TEXT: &str = "DAFTAR SALDO STOCK
Kode  Nama  Kategori  Satuan  Gudang  Qty
BN02-12H  BENG BENG  SNACK  BOX  GD01  24
";

/// Isolated workspace: a config file pointing at a private data directory.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = serde_json::json!({
            "storage": { "data_dir": dir.path().join("data") }
        });
        fs::write(dir.path().join("config.json"), config.to_string()).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("stockview").unwrap();
        cmd.env("XDG_CONFIG_HOME", self.dir.path())
            .env_remove("SV_DATA_DIR")
            .env_remove("KV_REST_API_URL")
            .env_remove("KV_REST_API_TOKEN")
            .env_remove("GEMINI_API_KEY")
            .arg("--config")
            .arg(self.path("config.json"));
        cmd
    }
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("stockview")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_convert_stock_text() {
    let ws = Workspace::new();
    let input = ws.write("saldo.txt", STOCK_TEXT);

    let output = ws.cmd().args(["convert", arg(&input)]).output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output.stdout);
    assert_eq!(json["type"], "stock");
    assert_eq!(json["count"], 1);
    assert_eq!(json["fileName"], "saldo.txt");
    assert_eq!(json["rows"][0]["kode_produk"], "BN02-12H");
    assert_eq!(json["rows"][0]["qty"], 24);
}

#[test]
fn test_convert_unrecognised_document_fails() {
    let ws = Workspace::new();
    let input = ws.write("notes.txt", "hello world\nnothing to see here\n");

    ws.cmd()
        .args(["convert", arg(&input)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sales or stock report"));
}

#[test]
fn test_convert_recognised_without_rows_succeeds() {
    let ws = Workspace::new();
    let input = ws.write("empty.txt", "DAFTAR SALDO STOCK\nGUDANG  QTY\n");

    let output = ws.cmd().args(["convert", arg(&input)]).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output.stdout);
    assert_eq!(json["type"], "stock");
    assert_eq!(json["count"], 0);
}

#[test]
fn test_sync_then_summary() {
    let ws = Workspace::new();
    let stock = ws.write("saldo.txt", STOCK_TEXT);
    let sales = ws.write("jual.txt", SALES_TEXT);

    ws.cmd()
        .args(["convert", arg(&stock), "--sync"])
        .assert()
        .success();
    ws.cmd()
        .args(["convert", arg(&sales), "--sync"])
        .assert()
        .success();
    assert!(ws.path("data").join("stock.json").exists());
    assert!(ws.path("data").join("sales.json").exists());

    let output = ws.cmd().arg("summary").output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output.stdout);
    assert_eq!(json["totals"]["stockQty"], 24);
    assert_eq!(json["totals"]["monthlySalesQty"], 1);
    assert_eq!(json["products"][0]["kode_produk"], "BN02-12H");
    assert_eq!(json["products"][0]["totalSales"], 1);
    assert_eq!(json["products"][0]["remaining"], 23);
    assert_eq!(json["salesTrend"][0]["date"], "2025-10-01");
}

#[test]
fn test_import_json_is_strict() {
    let ws = Workspace::new();
    let input = ws.write("stock.json", r#"[{"kode_produk": "A1", "qty": 3}]"#);

    ws.cmd()
        .args(["import", "stock", arg(&input)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stock record 0"));
    assert!(!ws.path("data").join("stock.json").exists());
}

#[test]
fn test_import_csv_then_text_summary() {
    let ws = Workspace::new();
    let input = ws.write(
        "stock.csv",
        "SKU,Product Name,Category,Warehouse,Saldo\nA1,Teh Botol,MINUMAN,GD01,4\n,No Code,MINUMAN,GD01,9\n",
    );

    ws.cmd()
        .args(["import", "stock", arg(&input)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 stock rows"));

    ws.cmd()
        .args(["summary", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stock on hand:       4"))
        .stdout(predicate::str::contains("Low stock"))
        .stdout(predicate::str::contains("MINUMAN"));
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let ws = Workspace::new();
    let input = ws.write("stock.csv", "kode,qty\nA1,4\n");

    ws.cmd()
        .args(["import", "stock", arg(&input), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 valid stock rows"));
    assert!(!ws.path("data").join("stock.json").exists());
}

#[test]
fn test_batch_reports_failures() {
    let ws = Workspace::new();
    ws.write("a_saldo.txt", STOCK_TEXT);
    ws.write("b_notes.txt", "hello world\n");
    let pattern = ws.path("*.txt");

    ws.cmd()
        .args(["batch", arg(&pattern), "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"))
        .stdout(predicate::str::contains("b_notes.txt"));

    ws.cmd()
        .args(["batch", arg(&pattern)])
        .assert()
        .failure();
}

#[test]
fn test_ask_prints_prompt_without_key() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["ask", "--print-prompt", "Apa", "yang", "paling", "laku?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stock records available."))
        .stdout(predicate::str::contains("User question: Apa yang paling laku?"));
}

#[test]
fn test_ask_requires_api_key() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["ask", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_config_set_and_get() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "reconciliation.low_stock_threshold", "3"])
        .assert()
        .success();

    ws.cmd()
        .args(["config", "get", "reconciliation.low_stock_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));

    ws.cmd()
        .args(["config", "get", "reconciliation.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let ws = Workspace::new();
    let target = ws.path("fresh/config.json");

    ws.cmd()
        .args(["config", "init", "--output", arg(&target)])
        .assert()
        .success();
    assert!(target.exists());

    ws.cmd()
        .args(["config", "init", "--output", arg(&target)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}
