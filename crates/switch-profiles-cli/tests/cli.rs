use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const LEAF: &str = r#"package switchprofile

var Leaf = wiringapi.SwitchProfile{
	ObjectMeta: kmetav1.ObjectMeta{
		Name: "leaf-model",
	},
	Spec: wiringapi.SwitchProfileSpec{
		DisplayName: "Leaf Model",
		Ports: map[string]wiringapi.SwitchProfilePort{
			"M1":   {NOSName: "Management0", Management: true},
			"E1/1": {NOSName: "Ethernet0", Profile: "SFP28-25G"},
		},
		PortProfiles: map[string]wiringapi.SwitchProfilePortProfile{
			"SFP28-25G": {
				Speed: &wiringapi.SwitchProfilePortProfileSpeed{
					Default:   "25G",
					Supported: []string{"10G", "25G"},
				},
			},
		},
	},
}
"#;

/// A working directory laid out like the repository the tool runs in.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("switch_profiles")).unwrap();
    fs::create_dir_all(dir.path().join("src/frontend/switch_profiles")).unwrap();
    fs::write(dir.path().join("switch_profiles/leaf01.go"), LEAF).unwrap();
    dir
}

fn run(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_convert-profiles"))
        .args(args)
        .current_dir(cwd)
        .env_remove("SWITCH_PROFILES_INPUT_DIR")
        .env_remove("SWITCH_PROFILES_OUTPUT_DIR")
        .env_remove("SWITCH_PROFILES_PATTERN")
        .output()
        .unwrap()
}

#[test]
fn test_no_arguments_converts_with_defaults() {
    let dir = project();

    let output = run(dir.path(), &[]);

    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "Converted switch_profiles/leaf01.go to src/frontend/switch_profiles/leaf01.json\n"
    );
    let json =
        fs::read_to_string(dir.path().join("src/frontend/switch_profiles/leaf01.json")).unwrap();
    assert!(json.contains("\"Name\": \"leaf-model\""));
}

#[test]
fn test_parse_failure_exits_non_zero() {
    let dir = project();
    fs::write(dir.path().join("switch_profiles/zzz.go"), "not go at all").unwrap();

    let output = run(dir.path(), &["convert"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("zzz.go"), "{}", stderr);
    assert!(stderr.contains("expected package clause"), "{}", stderr);
    // leaf01.go sorts first and its output is kept
    let out = dir.path().join("src/frontend/switch_profiles");
    assert!(out.join("leaf01.json").exists());
    assert!(!out.join("zzz.json").exists());
}

#[test]
fn test_check_does_not_write() {
    let dir = project();

    let output = run(dir.path(), &["check"]);

    assert!(output.status.success(), "{:?}", output);
    assert!(!dir
        .path()
        .join("src/frontend/switch_profiles/leaf01.json")
        .exists());
}

#[test]
fn test_list_json() {
    let dir = project();

    let output = run(dir.path(), &["list", "--json"]);

    assert!(output.status.success(), "{:?}", output);
    let models: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        models,
        serde_json::json!([{"model": "leaf-model", "name": "Leaf Model"}])
    );
}

#[test]
fn test_flags_override_directories() {
    let dir = project();
    fs::create_dir(dir.path().join("elsewhere")).unwrap();

    let output = run(dir.path(), &["--output-dir", "elsewhere"]);

    assert!(output.status.success(), "{:?}", output);
    assert!(dir.path().join("elsewhere/leaf01.json").exists());
}
