//! `--json` switches tracing output to structured JSON lines.

use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn json_flag_produces_parseable_log_lines() {
    let td = tempdir().unwrap();
    let library = td.path().join("library");
    let db = td.path().join("catalog.db3");
    let cfg = td.path().join("config.xml");
    fs::write(
        &cfg,
        format!(
            "<config>\n  <library_root>{}</library_root>\n  <database>{}</database>\n</config>",
            library.display(),
            db.display()
        ),
    )
    .unwrap();

    let me = assert_cmd::cargo::cargo_bin!("shutter_move");
    let out = Command::new(me)
        .env("SHUTTER_MOVE_CONFIG", &cfg)
        .arg("--json")
        .output()
        .expect("spawn binary");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    // An empty catalog still logs the pass summary; that line must be JSON.
    let stdout = String::from_utf8_lossy(&out.stdout);
    let json_line = stdout
        .lines()
        .find(|l| l.trim_start().starts_with('{'))
        .unwrap_or_else(|| panic!("no JSON log line in output: {stdout}"));
    let value: serde_json::Value = serde_json::from_str(json_line).expect("valid JSON log line");
    assert!(value.get("level").is_some());
    assert!(value.get("fields").is_some());
}
