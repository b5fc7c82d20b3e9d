//! Tool management through the binary

use std::path::Path;
use std::process::{Command, Output};

fn querygate(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_querygate"))
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn add_list_show_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("tools.yaml");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, format!("store:\n  path: {}\n", store.display())).unwrap();

    let defs = dir.path().join("tools.json");
    std::fs::write(
        &defs,
        r#"[
            {"name": "weather", "type": "API", "url": "http://localhost:1/w", "method": "GET",
             "description": "Current weather", "input_schema": {"city": {"type": "string", "required": true}}},
            {"name": "orders", "type": "SQL", "url": "http://localhost:1/q", "method": "POST",
             "description": "Order lookup", "input_schema": {"id": {"type": "int", "required": true}}}
        ]"#,
    )
    .unwrap();

    let added = querygate(&config, &["tools", "add", defs.to_str().unwrap()]);
    assert!(added.status.success(), "{}", String::from_utf8_lossy(&added.stderr));
    assert!(store.exists());

    let listed = stdout(&querygate(&config, &["tools", "list"]));
    assert!(listed.contains("weather"));
    assert!(listed.contains("orders"));

    let sql_only = stdout(&querygate(&config, &["tools", "list", "--type", "SQL"]));
    assert!(sql_only.contains("orders"));
    assert!(!sql_only.contains("weather"));

    let shown = stdout(&querygate(&config, &["tools", "show", "weather"]));
    assert!(shown.contains("http://localhost:1/w"));

    let usage = querygate(&config, &["route", "weather"]);
    assert!(usage.status.success());
    assert!(stdout(&usage).contains("city"));

    let deleted = querygate(&config, &["tools", "delete", "weather"]);
    assert!(deleted.status.success());
    let missing = querygate(&config, &["tools", "delete", "weather"]);
    assert!(!missing.status.success());
}

#[test]
fn invalid_definition_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(
        &config,
        format!("store:\n  path: {}\n", dir.path().join("tools.yaml").display()),
    )
    .unwrap();
    let defs = dir.path().join("bad.yaml");
    std::fs::write(&defs, "name: broken\ntype: FTP\n").unwrap();

    let output = querygate(&config, &["tools", "add", defs.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid tool definition"));
}
