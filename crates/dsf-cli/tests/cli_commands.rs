use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const WORKSPACES: &str = r#"
{
  "workspaces": {
    "cold": { "spectra": [ { "x": [0.0, 1.0, 2.0, 3.0], "y": [2.0, 2.0, 2.0, 2.0] } ] },
    "hot":  { "spectra": [ { "x": [0.0, 1.0, 2.0, 3.0], "y": [4.0, 4.0, 4.0, 4.0] } ] },
    "hist": {
      "spectra": [
        { "x": [0.0, 1.0, 2.0, 3.0, 4.0], "y": [1.0, 2.0, 3.0, 4.0], "e": [1.0, 1.0, 1.0, 1.0] }
      ]
    }
  }
}
"#;

fn dsfinterp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dsfinterp"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("dsfinterp should run")
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent directory should be created");
    }
    fs::write(path, content).expect("file should be written");
}

fn parse_stdout(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn y_values(evaluation: &Value) -> Vec<f64> {
    evaluation["y"]
        .as_array()
        .expect("y array")
        .iter()
        .map(|value| value.as_f64().expect("number"))
        .collect()
}

#[test]
fn functions_command_lists_dsf_interp() {
    let output = dsfinterp(&["functions"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "DSFinterp1DFit\tQENS"
    );
}

#[test]
fn evaluate_command_interpolates_and_scans_on_one_instance() {
    let temp = TempDir::new().expect("tempdir should be created");
    write_file(&temp.path().join("data/workspaces.json"), WORKSPACES);
    let job_path = temp.path().join("job.json");
    write_file(
        &job_path,
        r#"
        {
          "workspaces": "data/workspaces.json",
          "attributes": {
            "Workspaces": "cold, hot",
            "ParameterValues": "100 300",
            "LocalRegression": false
          },
          "parameters": { "Intensity": 2.0, "TargetParameter": 200.0 },
          "x": [0.0, 1.0, 2.0, 3.0],
          "scan": [ { "TargetParameter": 250.0 }, { "TargetParameter": 400.0 } ]
        }
        "#,
    );
    let report_path = temp.path().join("out/report.json");

    let output = dsfinterp(&[
        "evaluate",
        "--job",
        job_path.to_str().expect("utf-8 path"),
        "--output",
        report_path.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "evaluate should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("report should exist"))
            .expect("report should be JSON");
    assert_eq!(report["function"], "DSFinterp1DFit");
    let evaluations = report["evaluations"].as_array().expect("evaluations");
    assert_eq!(evaluations.len(), 3);

    for (evaluation, expected) in evaluations.iter().zip([6.0, 7.0, 0.0]) {
        for value in y_values(evaluation) {
            assert!((value - expected).abs() < 1.0e-9, "{value} != {expected}");
        }
    }
    assert_eq!(evaluations[1]["parameters"]["TargetParameter"], 250.0);
}

#[test]
fn evaluate_command_reports_configuration_errors_with_exit_codes() {
    let temp = TempDir::new().expect("tempdir should be created");
    let workspaces_path = temp.path().join("workspaces.json");
    write_file(&workspaces_path, WORKSPACES);

    let cases = [
        (r#""RegressionType": "cubic""#, 7, "FIT.REGRESSION_TYPE"),
        (r#""RegressionWindow": 2"#, 8, "FIT.REGRESSION_WINDOW"),
        (r#""WorkspaceIndex": 3"#, 5, "FIT.WORKSPACE_INDEX"),
    ];
    for (attribute, exit_code, marker) in cases {
        let job_path = temp.path().join("job.json");
        write_file(
            &job_path,
            &format!(
                r#"{{
                  "attributes": {{ "Workspaces": "cold hot", "ParameterValues": "0 1", {attribute} }},
                  "parameters": {{ "TargetParameter": 0.5 }},
                  "x": [0.0, 1.0, 2.0, 3.0]
                }}"#
            ),
        );

        let output = dsfinterp(&[
            "evaluate",
            "--job",
            job_path.to_str().expect("utf-8 path"),
            "--workspaces",
            workspaces_path.to_str().expect("utf-8 path"),
        ]);
        assert_eq!(output.status.code(), Some(exit_code), "case {attribute}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains(&format!("FATAL EXIT CODE: {exit_code}")),
            "stderr: {stderr}"
        );
        assert!(stderr.contains(marker), "stderr: {stderr}");
    }
}

#[test]
fn evaluate_without_workspace_document_is_a_usage_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let job_path = temp.path().join("job.json");
    write_file(&job_path, r#"{ "x": [0.0, 1.0] }"#);

    let output = dsfinterp(&["evaluate", "--job", job_path.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT.CLI_USAGE"));
}

#[test]
fn rebin_command_writes_workspace_document() {
    let temp = TempDir::new().expect("tempdir should be created");
    let workspaces_path = temp.path().join("workspaces.json");
    write_file(&workspaces_path, WORKSPACES);

    let output = dsfinterp(&[
        "rebin",
        "--workspaces",
        workspaces_path.to_str().expect("utf-8 path"),
        "--input",
        "hist",
        "--params",
        "0,2,4",
        "--output-workspace",
        "coarse",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let document = parse_stdout(&output);
    let spectrum = &document["workspaces"]["coarse"]["spectra"][0];
    assert_eq!(spectrum["x"], serde_json::json!([0.0, 2.0, 4.0]));
    assert_eq!(spectrum["y"], serde_json::json!([3.0, 7.0]));
    assert!(document.get("bin_width").is_none());
}

#[test]
fn rebin_at_x_command_reports_rounded_width() {
    let temp = TempDir::new().expect("tempdir should be created");
    let workspaces_path = temp.path().join("workspaces.json");
    write_file(&workspaces_path, WORKSPACES);

    let output = dsfinterp(&[
        "rebin-at-x",
        "--workspaces",
        workspaces_path.to_str().expect("utf-8 path"),
        "--input",
        "hist",
        "--x-value",
        "2.5",
        "--rounding",
        "10^n",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let document = parse_stdout(&output);
    let width = document["bin_width"].as_f64().expect("bin width");
    assert!((width - 1.0).abs() < 1.0e-12);
    let y = &document["workspaces"]["hist_rebinned"]["spectra"][0]["y"];
    assert_eq!(y.as_array().map(Vec::len), Some(4));
}

#[test]
fn invalid_rebin_params_are_usage_errors() {
    let output = dsfinterp(&[
        "rebin",
        "--workspaces",
        "missing.json",
        "--input",
        "hist",
        "--params",
        "0,1",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT.CLI_USAGE"));
}
