use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_climeta")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn json_output(assert: assert_cmd::assert::Assert) -> serde_json::Value {
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    serde_json::from_str(&output).unwrap()
}

// -- file mode --

#[test]
fn simple_fixture_compiles() {
    let assert = cmd()
        .args(["-t", "Tester"])
        .arg(fixture_path("simple.go"))
        .assert()
        .success();

    let got = json_output(assert);
    let want = serde_json::json!({
        "name": "simple",
        "package": "simple",
        "type": "Tester",
        "help": "simple is a simple test.",
        "description": "Tester is a test.",
        "inputs": [
            {
                "field_name": "String",
                "tag": "",
                "doc": "String command input.",
                "type": "string"
            }
        ]
    });
    assert_eq!(got, want);
}

#[test]
fn tagged_fixture_filters_fields() {
    let assert = cmd()
        .args(["-t", "Copier"])
        .arg(fixture_path("tagged.go"))
        .assert()
        .success();

    let got = json_output(assert);
    assert_eq!(got["name"], "file-copy");
    assert_eq!(
        got["help"],
        "file-copy copies files from one place to another."
    );
    assert_eq!(got["description"], "Copier copies files.");

    let names: Vec<&str> = got["inputs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["field_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["Source", "Destinations", "Verbose", "Retries", "Broken"]
    );
    assert_eq!(got["inputs"][1]["tag"], "arg:[1:]");
    assert_eq!(got["inputs"][1]["type"], "[]string");
    assert_eq!(got["inputs"][3]["tag"], "flag:retries;default:3");
}

#[test]
fn malformed_directives_are_diagnosed_not_fatal() {
    cmd()
        .args(["-t", "Copier"])
        .arg(fixture_path("tagged.go"))
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring malformed directive"))
        .stderr(predicate::str::contains("Broken"));
}

#[test]
fn quiet_suppresses_diagnostics() {
    cmd()
        .env_remove("RUST_LOG")
        .args(["-q", "-t", "Copier"])
        .arg(fixture_path("tagged.go"))
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn custom_tag_key() {
    let assert = cmd()
        .args(["-t", "Copier", "-k", "json"])
        .arg(fixture_path("tagged.go"))
        .assert()
        .success();

    let got = json_output(assert);
    assert_eq!(got["inputs"][0]["tag"], "");
    assert_eq!(got["inputs"][1]["tag"], "dest");
}

#[test]
fn writes_output_file() {
    let dir = TempDir::new().unwrap();
    let out_path = dir.path().join("tester.txt");

    cmd()
        .args(["-t", "Tester", "-f", "text"])
        .args(["-o", out_path.to_str().unwrap()])
        .arg(fixture_path("simple.go"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let output = std::fs::read_to_string(out_path).unwrap();
    assert!(output.starts_with("simple (simple.Tester)\n"));
    assert!(output.contains("  String string\n    String command input.\n"));
}

#[test]
fn output_directory_names_file_after_command() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-t", "Copier", "-f", "text"])
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("tagged.go"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("file-copy.txt")).unwrap();
    assert!(output.starts_with("file-copy (fileCopy.Copier)\n"));

    cmd()
        .args(["-t", "Tester"])
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("simple.go"))
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("simple.json")).unwrap())
            .unwrap();
    assert_eq!(json["name"], "simple");
}

#[test]
fn text_format_shows_bindings() {
    cmd()
        .args(["-t", "Copier", "-f", "text"])
        .arg(fixture_path("tagged.go"))
        .assert()
        .success()
        .stdout(predicate::str::contains("    args: [1:]\n"))
        .stdout(predicate::str::contains("    flag: -v, --verbose\n"))
        .stdout(predicate::str::contains("    default: 3\n"));
}

// -- failures --

#[test]
fn type_not_found_fails() {
    cmd()
        .args(["-t", "Missing"])
        .arg(fixture_path("simple.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("type not found: Missing"));
}

#[test]
fn non_struct_type_fails() {
    cmd()
        .args(["-t", "Mode"])
        .arg(fixture_path("tagged.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("type not found: Mode"));
}

#[test]
fn unparsable_source_fails() {
    cmd()
        .args(["-t", "Broken"])
        .arg(fixture_path("broken.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"))
        .stderr(predicate::str::contains("unterminated struct"));
}

#[test]
fn missing_file_fails() {
    cmd()
        .args(["-t", "Tester"])
        .arg(fixture_path("does-not-exist.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn invalid_format_fails() {
    cmd()
        .args(["-t", "Tester", "-f", "xml"])
        .arg(fixture_path("simple.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn type_is_required() {
    cmd()
        .arg(fixture_path("simple.go"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--type"));
}

// -- stdin mode --

#[test]
fn stdin_mode() {
    let input = "// Package greet says hello.\npackage greet\n\n// Greeter greets.\ntype Greeter struct {\n\tName string `cli:\"arg:0\"`\n}\n";

    let assert = cmd()
        .args(["-t", "Greeter"])
        .write_stdin(input)
        .assert()
        .success();

    let got = json_output(assert);
    assert_eq!(got["help"], "greet says hello.");
    assert_eq!(got["inputs"][0]["tag"], "arg:0");
}

#[test]
fn stdin_continued_declarations() {
    let input = "package greet\n\nconst usage = \"say \" +\n\t\"hello\"\n\ntype Greeter struct{ Name string `cli:\"arg:0;flag:name,n\"` }\n";

    let assert = cmd()
        .args(["-t", "Greeter"])
        .write_stdin(input)
        .assert()
        .success();

    let got = json_output(assert);
    assert_eq!(got["inputs"][0]["tag"], "arg:0;flag:name,n");
}

#[test]
fn unexported_type_fails() {
    cmd()
        .args(["-t", "greeter"])
        .write_stdin("package greet\n\ntype greeter struct {\n\tName string\n}\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("type not found: greeter"));
}

#[test]
fn stdin_mode_reports_stdin_name() {
    cmd()
        .args(["-t", "Nope"])
        .write_stdin("package p\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<stdin>"));
}
