use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "mfgsim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn minimal_plan() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("plans/minimal.json")
}

fn run_mfgsim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mfgsim"))
        .args(args)
        .output()
        .expect("run mfgsim")
}

fn summary_line(stdout: &str) -> String {
    stdout
        .lines()
        .find(|line| line.starts_with("summary "))
        .expect("summary line")
        .to_string()
}

#[test]
fn mfgsim_writes_usage_table_for_minimal_plan() {
    let dir = unique_temp_dir("usage");
    let out_json = dir.join("usage.json");
    let plan = minimal_plan();

    let output = run_mfgsim(&[
        "--plan",
        plan.to_str().unwrap(),
        "--output",
        out_json.to_str().unwrap(),
        "--check",
    ]);
    assert!(
        output.status.success(),
        "mfgsim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        summary_line(&stdout),
        "summary makespan=12 lateness=0 unfinished_products=0 clashes=0 in_flight=0 end=1000"
    );
    assert!(stdout.lines().any(|l| l == "violations 0"));

    let raw = fs::read_to_string(&out_json).expect("read usage.json");
    let v: Value = serde_json::from_str(&raw).expect("parse usage.json");
    let rows = v.as_array().expect("usage.json must be a JSON array");
    assert_eq!(rows.len(), 4);
    let last = &rows[3];
    assert_eq!(last["product_index"], 1);
    assert_eq!(last["activity"], 1);
    assert_eq!(last["processed"], true);
    assert_eq!(last["resources"], serde_json::json!(["Mixer#0"]));
    assert_eq!(last["start"], 6);
    assert_eq!(last["finish"], 12);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mfgsim_short_horizon_reports_unfinished() {
    let dir = unique_temp_dir("horizon");
    let out_json = dir.join("usage.json");
    let plan = minimal_plan();

    let output = run_mfgsim(&[
        "--plan",
        plan.to_str().unwrap(),
        "--until",
        "10",
        "--output",
        out_json.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        summary_line(&stdout),
        "summary makespan=6 lateness=0 unfinished_products=1 clashes=0 in_flight=1 end=10"
    );

    let v: Value =
        serde_json::from_str(&fs::read_to_string(&out_json).expect("read")).expect("parse");
    let last = &v.as_array().expect("array")[3];
    assert_eq!(last["processed"], false);
    assert!(last["resources"].is_null());
    assert!(last["start"].is_null());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mfgsim_counts_clashes_by_code() {
    let dir = unique_temp_dir("clash");
    let plan = write_file(
        &dir,
        "plan.json",
        r#"
{
    "schema_version": 1,
    "factory": { "resource_names": ["A"], "capacity": [1] },
    "products": [
        { "id": 3, "activities": [ { "id": 0, "processing_time": 5, "needs": [1] } ] }
    ],
    "product_ids": [3, 3],
    "deadlines": [10, 10],
    "earliest_start": [
        { "product_index": 0, "activity_id": 0, "earliest_start": 0 },
        { "product_index": 1, "activity_id": 0, "earliest_start": 2 }
    ]
}
        "#,
    );

    let output = run_mfgsim(&["--plan", plan.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "clash AVAILABILITY 1"), "{stdout}");
    assert!(summary_line(&stdout).contains("unfinished_products=1 clashes=1"));

    // 重试后第二个实例在 t=5 开始
    let output = run_mfgsim(&[
        "--plan",
        plan.to_str().unwrap(),
        "--retry-delay",
        "3",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        summary_line(&stdout).starts_with("summary makespan=10 lateness=0 unfinished_products=0"),
        "{stdout}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mfgsim_rejects_malformed_plan() {
    let dir = unique_temp_dir("malformed");
    let plan = write_file(
        &dir,
        "plan.json",
        r#"
{
    "schema_version": 1,
    "factory": { "resource_names": ["A", "B"], "capacity": [1, 1] },
    "products": [
        { "id": 0, "activities": [ { "id": 0, "processing_time": 5, "needs": [1] } ] }
    ],
    "product_ids": [0],
    "deadlines": [10]
}
        "#,
    );

    let output = run_mfgsim(&["--plan", plan.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("needs vector has 1 entries"), "{stderr}");

    let missing = dir.join("missing.json");
    let output = run_mfgsim(&["--plan", missing.to_str().unwrap()]);
    assert!(!output.status.success());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mfgsim_output_is_deterministic() {
    let dir = unique_temp_dir("determinism");
    let plan = minimal_plan();
    let a = dir.join("a.json");
    let b = dir.join("b.json");

    for out in [&a, &b] {
        let output = run_mfgsim(&[
            "--plan",
            plan.to_str().unwrap(),
            "--acquire",
            "deferred",
            "--output",
            out.to_str().unwrap(),
        ]);
        assert!(output.status.success());
    }
    assert_eq!(
        fs::read_to_string(&a).expect("read a"),
        fs::read_to_string(&b).expect("read b")
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mfgsim_writes_viz_json_with_meta_first() {
    let dir = unique_temp_dir("viz");
    let out_json = dir.join("viz.json");
    let plan = minimal_plan();

    let output = run_mfgsim(&[
        "--plan",
        plan.to_str().unwrap(),
        "--viz-json",
        out_json.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let raw = fs::read_to_string(&out_json).expect("read viz.json");
    let v: Value = serde_json::from_str(&raw).expect("parse viz.json");
    let arr = v.as_array().expect("viz.json must be a JSON array");
    assert_eq!(arr[0]["kind"], "meta");
    assert!(arr.iter().any(|e| e["kind"] == "start"));

    let _ = fs::remove_dir_all(&dir);
}
