//! Integration tests for the `xmlkit` binary.
//!
//! Each test runs the built executable on files in a temporary directory
//! (or on stdin) and checks exit status, stdout and stderr.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const MISMATCHED: &str = "<root>\n  <a></b>\n</root>\n";

fn xmlkit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_xmlkit"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test input");
    path
}

fn run(args: &[&str]) -> Output {
    xmlkit().args(args).output().expect("Failed to run xmlkit")
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = xmlkit()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run xmlkit");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for xmlkit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

#[test]
fn status_of_well_formed_file() {
    let temp = TempDir::new().unwrap();
    let input = write_file(&temp, "good.xml", "<root><a/></root>");

    let output = run(&["status", path_arg(&input)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "Document contains no parsing errors");
}

#[test]
fn status_of_malformed_file_fails_with_location() {
    let temp = TempDir::new().unwrap();
    let input = write_file(&temp, "bad.xml", MISMATCHED);

    let output = run(&["status", path_arg(&input)]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("XML Parsing Error"));

    let err = stderr(&output);
    assert!(err.contains("Error [X-2-3]: Mismatched XML End Tag"));
    assert!(err.contains("✖ Expected: </a>"));
    assert!(err.contains("ℹ At line 2, column"));
    assert!(err.contains("is not well-formed"));
}

#[test]
fn status_reads_stdin() {
    let output = run_with_stdin(&["status", "-"], "<root>text</root>");
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "Document contains no parsing errors");

    let output = run_with_stdin(&["status", "-"], MISMATCHED);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("X-2-3"));
}

#[test]
fn status_uses_parse_error_property_from_config() {
    let temp = TempDir::new().unwrap();
    let config = write_file(
        &temp,
        "xmlkit.toml",
        "[parser]\nerror-reporting = \"parse-error-property\"\n",
    );
    let input = write_file(&temp, "bad.xml", MISMATCHED);

    let output = run(&["--config", path_arg(&config), "status", path_arg(&input)]);
    assert!(!output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "Mismatched end tag: expected </a>, found </b>"
    );
}

#[test]
fn invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = write_file(&temp, "xmlkit.toml", "[xmlize]\nindnet = 2\n");

    let output = run(&["-c", path_arg(&config), "create", "-r", "root"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to load configuration"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn create_prints_namespaced_document() {
    let output = run(&["create", "-n", "urn:example", "-r", "ex:test"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        r#"<ex:test xmlns:ex="urn:example"/>"#
    );
}

#[test]
fn text_and_strip_tags() {
    let temp = TempDir::new().unwrap();
    let input = write_file(
        &temp,
        "text.xml",
        "<root>This t<elem>ext has </elem>no CDATA in<elem/> it</root>",
    );

    let output = run(&["text", "--normalize", path_arg(&input)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "This text has no CDATA in it");

    let output = run_with_stdin(&["strip-tags", "-"], "<p>a <b>bold</b> move</p>");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a bold move");
}

#[test]
fn xmlize_layout_from_config_and_pretty_flag() {
    let temp = TempDir::new().unwrap();
    let config = write_file(&temp, "xmlkit.toml", "[xmlize]\nindent = 2\n");
    let input = write_file(&temp, "value.json", r#"{"a": [1, 2]}"#);

    let output = run(&["-c", path_arg(&config), "xmlize", "-t", "r", path_arg(&input)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "<r>\n  <a>1</a>\n  <a>2</a>\n</r>");

    let output = run(&[
        "-c",
        path_arg(&config),
        "xmlize",
        "-t",
        "r",
        "--pretty",
        path_arg(&input),
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "<r>\n   <a>1</a>\n   <a>2</a>\n</r>"
    );
}

#[test]
fn xmlize_rejects_invalid_json() {
    let output = run_with_stdin(&["xmlize", "-"], "{not json");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("- is not valid JSON"));
}
