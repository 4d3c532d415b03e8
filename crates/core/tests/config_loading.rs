use std::fs;
use std::path::PathBuf;

use backtrace_core::config::{
    load_config, ConfigError, DecoderConfig, ADDR2LINE_ENV, DEFAULT_ADDR2LINE,
};
use tempfile::tempdir;

#[test]
fn defaults_match_esp_panic_output() {
    let cfg = DecoderConfig::default();
    assert_eq!(cfg.backtrace_prefix, "Backtrace:");
    assert_eq!(cfg.stack_memory_prefix, "Stack memory:");
    assert_eq!(cfg.sentinel, "0xa5a5a5a5");
    assert_eq!(cfg.unknown_marker, "?? ??");
    assert!(!cfg.report_unresolved);
    assert_eq!(cfg.images_for("board"), vec![PathBuf::from("build-board/firmware.elf")]);
}

#[test]
fn yaml_config_fills_missing_fields_with_defaults() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("decode.yaml");
    fs::write(
        &path,
        "extra_images:\n  - /opt/esp-rom-elfs/esp32c6_rev0_rom.elf\nbuild_dir_template: \"out/{target}\"\n",
    )
    .unwrap();
    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.sentinel, "0xa5a5a5a5");
    assert_eq!(
        cfg.images_for("c6"),
        vec![
            PathBuf::from("out/c6/firmware.elf"),
            PathBuf::from("/opt/esp-rom-elfs/esp32c6_rev0_rom.elf"),
        ]
    );
}

#[test]
fn json_config_is_parsed() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("decode.json");
    fs::write(&path, r#"{"addr2line": "/usr/bin/xtensa-esp32-elf-addr2line", "report_unresolved": true}"#)
        .unwrap();
    let cfg = load_config(&path).unwrap();
    assert!(cfg.report_unresolved);
    assert_eq!(
        cfg.addr2line_path(Some("/explicit/addr2line")),
        PathBuf::from("/explicit/addr2line")
    );
}

#[test]
fn empty_yaml_file_is_default_config() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("empty.yml");
    fs::write(&path, "\n").unwrap();
    assert_eq!(load_config(&path).unwrap(), DecoderConfig::default());
}

#[test]
fn malformed_json_reports_path() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("bad.json");
    fs::write(&path, "not-json").unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Json { .. }));
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load_config(std::path::Path::new("does/not/exist.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn explicit_override_beats_config_tool_path() {
    let cfg = DecoderConfig { addr2line: Some("from-config".into()), ..DecoderConfig::default() };
    assert_eq!(cfg.addr2line_path(Some("from-cli")), PathBuf::from("from-cli"));
}

// The only test in this binary that touches ADDR2LINE_BIN; every other lookup
// passes an explicit override.
#[test]
fn tool_path_precedence_env_then_config_then_default() {
    let configured =
        DecoderConfig { addr2line: Some("from-config".into()), ..DecoderConfig::default() };
    let bare = DecoderConfig::default();

    std::env::set_var(ADDR2LINE_ENV, "from-env");
    assert_eq!(configured.addr2line_path(None), PathBuf::from("from-env"));
    assert_eq!(bare.addr2line_path(None), PathBuf::from("from-env"));
    assert_eq!(configured.addr2line_path(Some("from-cli")), PathBuf::from("from-cli"));

    std::env::remove_var(ADDR2LINE_ENV);
    assert_eq!(configured.addr2line_path(None), PathBuf::from("from-config"));
    assert_eq!(bare.addr2line_path(None), PathBuf::from(DEFAULT_ADDR2LINE));
}
