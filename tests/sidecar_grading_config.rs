use serde_json::json;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn fixture_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar(config: Option<&Path>) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradecalcd");
    let mut cmd = Command::new(exe);
    match config {
        Some(p) => {
            cmd.env("GRADECALC_CONFIG", p);
        }
        None => {
            cmd.env_remove("GRADECALC_CONFIG");
        }
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradecalcd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response");
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false), "{}", value);
    value
        .pointer("/error/code")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn load_batch() -> serde_json::Value {
    let text = fs::read_to_string(fixture_path("fixtures/batch/cse-2024.json")).expect("read fixture");
    serde_json::from_str(&text).expect("parse fixture")
}

#[test]
fn grade_compute_matches_thresholds_over_ipc() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(None);

    let exact = request_ok(&mut stdin, &mut reader, "1", "grade.compute", json!({ "percentage": 90 }));
    assert_eq!(exact.get("letter").and_then(|v| v.as_str()), Some("A+"));
    assert_eq!(exact.get("label").and_then(|v| v.as_str()), Some("A+ (10)"));

    let below = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "grade.compute",
        json!({ "percentage": 89.999 }),
    );
    assert_eq!(below.get("letter").and_then(|v| v.as_str()), Some("A"));

    let raw = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "grade.compute",
        json!({ "rawScore": 22, "maxScore": 50 }),
    );
    assert_eq!(raw.get("percentage").and_then(|v| v.as_f64()), Some(44.0));
    assert_eq!(raw.get("letter").and_then(|v| v.as_str()), Some("F"));

    let empty = request_ok(&mut stdin, &mut reader, "4", "gpa.weighted", json!({ "entries": [] }));
    assert!(empty.get("value").map(|v| v.is_null()).unwrap_or(false));
    assert_eq!(empty.get("display").and_then(|v| v.as_str()), Some("N/A"));

    let nine = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "gpa.weighted",
        json!({ "entries": [{ "points": 10, "weight": 1 }, { "points": 8, "weight": 1 }] }),
    );
    assert_eq!(nine.get("value").and_then(|v| v.as_f64()), Some(9.0));
    assert_eq!(nine.get("display").and_then(|v| v.as_str()), Some("9.00"));

    let cohort = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "cohort.aggregate",
        json!({ "percentages": [] }),
    );
    assert_eq!(cohort.pointer("/statistics/sampleSize").and_then(|v| v.as_u64()), Some(0));
    assert!(cohort.pointer("/statistics/average").map(|v| v.is_null()).unwrap_or(false));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn config_set_swaps_scale_and_policy() {
    let batch = load_batch();
    let records = batch.get("records").cloned().expect("records");
    let students = batch.get("students").cloned().expect("students");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(None);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "config.set",
        json!({ "gradeTable": [{ "letter": "P", "points": 1, "minPercentage": 40 }] }),
    );
    assert_eq!(code, "bad_grade_table");

    let sheet = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.batchCgpa",
        json!({ "students": students, "records": records }),
    );
    assert_eq!(sheet.pointer("/rows/0/cgpa").and_then(|v| v.as_f64()), Some(9.07));
    assert!(sheet.pointer("/rows/4/cgpa").map(|v| v.is_null()).unwrap_or(false));

    let cfg = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "config.set",
        json!({ "cgpaPolicy": "creditWeighted" }),
    );
    assert_eq!(cfg.get("cgpaPolicy").and_then(|v| v.as_str()), Some("creditWeighted"));

    let sheet = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "reports.batchCgpa",
        json!({ "students": students, "records": records }),
    );
    assert_eq!(sheet.pointer("/rows/0/cgpa").and_then(|v| v.as_f64()), Some(9.09));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "config.set",
        json!({
            "gradeTable": [
                { "letter": "P", "points": 1, "minPercentage": 40 },
                { "letter": "F", "points": 0, "minPercentage": 0 }
            ]
        }),
    );
    let g = request_ok(&mut stdin, &mut reader, "6", "grade.compute", json!({ "percentage": 41 }));
    assert_eq!(g.get("label").and_then(|v| v.as_str()), Some("P (1)"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn startup_config_file_is_applied() {
    let dir = temp_dir("gradecalcd-config");
    let cfg_path = dir.join("gradecalc.json");
    fs::write(
        &cfg_path,
        serde_json::to_string(&json!({ "cgpaPolicy": "creditWeighted" })).expect("json"),
    )
    .expect("write config");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(Some(&cfg_path));
    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health.get("cgpaPolicy").and_then(|v| v.as_str()), Some("creditWeighted"));
    drop(stdin);
    let _ = child.wait();

    let broken = dir.join("broken.json");
    fs::write(&broken, "{ nope").expect("write broken config");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(Some(&broken));
    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health.get("cgpaPolicy").and_then(|v| v.as_str()), Some("twoStage"));
    drop(stdin);
    let _ = child.wait();
}

#[test]
fn csv_export_over_ipc_matches_sheet() {
    let batch = load_batch();
    let records = batch.get("records").cloned().expect("records");
    let students = batch.get("students").cloned().expect("students");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(None);
    let out = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "export.csv",
        json!({
            "report": "studentGrades",
            "student": students[1],
            "records": records,
            "semester": 2
        }),
    );
    assert_eq!(out.get("filename").and_then(|v| v.as_str()), Some("my_grades.csv"));
    assert_eq!(
        out.get("csv").and_then(|v| v.as_str()),
        Some("Course,Semester,Score,Max Score,Percentage,Grade,Grade Points\nOperating Systems,2,22,50,44.00,F,3\n")
    );

    let cgpa = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "export.csv",
        json!({
            "report": "batchCgpa",
            "students": students,
            "records": records,
            "branch": "CSE",
            "batchYear": 2024
        }),
    );
    assert_eq!(
        cgpa.get("filename").and_then(|v| v.as_str()),
        Some("batch_cgpa_CSE_2024.csv")
    );
    let text = cgpa.get("csv").and_then(|v| v.as_str()).unwrap_or("");
    assert!(text.ends_with("CSE24005,Esha Rao,N/A\n"), "{}", text);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "export.csv",
        json!({ "report": "pdf", "records": records }),
    );
    assert_eq!(code, "bad_params");

    drop(stdin);
    let _ = child.wait();
}
