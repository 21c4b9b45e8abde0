//! Runs the built binary against files on disk.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const MESSY: &str = include_str!("../lang-examples/messy.prox");

fn proxpl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_proxpl-lsp"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run proxpl-lsp")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_symbols_command() {
    let output = proxpl(&["symbols", "lang-examples/shapes.prox"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.starts_with("1:1     class Shape\n"));
}

#[test]
fn test_symbols_json_command() {
    let output = proxpl(&["symbols", "--json", "lang-examples/shapes.prox"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[2]["name"], "main");
}

#[test]
fn test_definition_command() {
    let text = fs::read_to_string("lang-examples/shapes.prox").unwrap();
    let offset = text.find("Shape()").unwrap().to_string();

    let output = proxpl(&["definition", "lang-examples/shapes.prox", &offset]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1:1     class Shape\n");
}

#[test]
fn test_definition_command_bad_offset() {
    let output = proxpl(&["definition", "lang-examples/shapes.prox", "100000"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("outside the document"));
}

#[test]
fn test_missing_file() {
    let output = proxpl(&["symbols", "lang-examples/missing.prox"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot access"));
}

#[test]
fn test_format_check_then_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("messy.prox");
    fs::write(&file, MESSY).unwrap();

    let check = proxpl(&["format", "--check", path_str(&file)]);
    assert!(!check.status.success());
    assert_eq!(fs::read_to_string(&file).unwrap(), MESSY);

    let rewrite = proxpl(&["format", path_str(&file)]);
    assert!(rewrite.status.success());
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "func greet(name) {\n    print(\"hi \" + name);\n\n    return name;\n}\n"
    );

    let recheck = proxpl(&["format", "--check", path_str(&file)]);
    assert!(recheck.status.success());
}
