use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_northstar-docgen"))
}

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test_fixtures/northstar")
}

/// Copy the fixture project (minus invalid/) into a fresh temp dir
fn fixture_project() -> TempDir {
    let temp_dir = TempDir::new().expect("temp dir");
    for entry in walkdir::WalkDir::new(fixture_root()) {
        let entry = entry.expect("walk fixtures");
        let relative = entry.path().strip_prefix(fixture_root()).expect("relative");
        if relative.starts_with("invalid") {
            continue;
        }
        let target = temp_dir.path().join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).expect("mkdir");
        } else {
            std::fs::copy(entry.path(), &target).expect("copy");
        }
    }
    temp_dir
}

/// Golden test: verify exact output for a known input
#[test]
fn e2e_info_golden_output() {
    let temp_dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(temp_dir.path().join("components/Chip")).expect("mkdir");
    std::fs::write(
        temp_dir.path().join("components/Chip/Chip.tsx"),
        r#"export interface ChipProps {
  /** Chip label. */
  label: string;
}

/** A Chip shows a compact label. */
const Chip = ({ label }: ChipProps) => <span>{label}</span>;

export default Chip;
"#,
    )
    .expect("write");

    let output = bin()
        .args([
            "--root",
            temp_dir.path().to_string_lossy().as_ref(),
            "info",
            "components/Chip/Chip.tsx",
            "--compact",
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(
        stdout,
        concat!(
            r#"{"dirname":"Chip","filename":"Chip.tsx","filenameWithoutExt":"Chip","#,
            r#""isParent":true,"isChild":false,"parentDisplayName":null,"#,
            r#""repoPath":"components/Chip/Chip.tsx","type":"component","#,
            r#""displayName":"Chip","docblock":{"description":"A Chip shows a compact label.","tags":[]},"#,
            r#""props":[{"name":"label","description":"Chip label.","tags":[],"#,
            r#""types":[{"keyword":"string"}],"required":true}]}"#,
            "\n"
        )
    );
}

#[test]
fn e2e_info_fails_for_file_without_default_export() {
    let output = bin()
        .args([
            "--root",
            fixture_root().to_string_lossy().as_ref(),
            "info",
            "invalid/NoDefaultExport.tsx",
        ])
        .output()
        .expect("run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("doesn't have a default export"), "{stderr}");
}

#[test]
fn e2e_generate_creates_info_files() {
    let temp_dir = fixture_project();

    let status = bin()
        .args([
            "--root",
            temp_dir.path().to_string_lossy().as_ref(),
            "generate",
        ])
        .status()
        .expect("run northstar-docgen");

    assert!(status.success());
    let out_dir = temp_dir.path().join("componentInfo");
    assert!(out_dir.join("Box.info.json").exists());
    assert!(out_dir.join("Button.info.json").exists());
    assert!(out_dir.join("ToolbarMenuRadioGroupWrapper.info.json").exists());

    let menu = std::fs::read_to_string(out_dir.join("componentMenu.json")).expect("menu");
    let menu: serde_json::Value = serde_json::from_str(&menu).expect("json");
    let names: Vec<_> = menu
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["displayName"].as_str().expect("name").to_string())
        .collect();
    assert_eq!(names, vec!["Box", "Button"]);
}

#[test]
fn e2e_generate_is_deterministic_for_same_inputs() {
    let temp_dir = fixture_project();
    let root = temp_dir.path().to_string_lossy().to_string();
    let button = temp_dir.path().join("componentInfo/Button.info.json");

    let status1 = bin()
        .args(["--root", root.as_str(), "generate", "src/components"])
        .status()
        .expect("run (1)");
    assert!(status1.success());
    let first = std::fs::read_to_string(&button).expect("read first");

    // Remove outputs and re-run
    std::fs::remove_dir_all(temp_dir.path().join("componentInfo")).expect("rm componentInfo");

    let status2 = bin()
        .args(["--root", root.as_str(), "generate", "src/components"])
        .status()
        .expect("run (2)");
    assert!(status2.success());
    let second = std::fs::read_to_string(&button).expect("read second");

    assert_eq!(first, second);
}

#[test]
fn e2e_generate_reports_errors() {
    let output = bin()
        .args([
            "--root",
            fixture_root().to_string_lossy().as_ref(),
            "generate",
            "invalid",
            "--dry-run",
        ])
        .output()
        .expect("run");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // NoComponent.tsx is skipped, the other two fail
    assert!(
        stdout.contains("Generated: 0, Unchanged: 0, Skipped: 1, Errors: 2"),
        "{stdout}"
    );
}
