use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker printed by addr2line when no debug information covers an address.
pub const DEFAULT_UNKNOWN_MARKER: &str = "?? ??";

/// Stack fill pattern written by the firmware into unused stack memory.
pub const DEFAULT_SENTINEL: &str = "0xa5a5a5a5";

/// Cross toolchain addr2line used when nothing else is configured.
pub const DEFAULT_ADDR2LINE: &str = "riscv32-esp-elf-addr2line";

/// Environment variable overriding the addr2line executable.
pub const ADDR2LINE_ENV: &str = "ADDR2LINE_BIN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read decoder config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse decoder config JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse decoder config YAML at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Serializable decoder configuration.
///
/// Every field has a default matching the ESP-IDF panic output, so an empty
/// file (or no file at all) yields a working decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Prefix of a single-line backtrace (`Backtrace: 0x4200:0x3fc ...`).
    pub backtrace_prefix: String,
    /// Prefix that starts a multi-line stack memory dump.
    pub stack_memory_prefix: String,
    /// Token skipped without resolution.
    pub sentinel: String,
    /// Substring in resolver output meaning "no location found".
    pub unknown_marker: String,
    /// Optional explicit addr2line path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addr2line: Option<String>,
    /// Directory holding the firmware build; `{target}` is substituted.
    pub build_dir_template: String,
    /// Images searched after the target firmware, e.g. ROM ELF files.
    pub extra_images: Vec<String>,
    /// Print `<address>: ?? ??` for addresses no image could resolve.
    pub report_unresolved: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            backtrace_prefix: "Backtrace:".to_string(),
            stack_memory_prefix: "Stack memory:".to_string(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            unknown_marker: DEFAULT_UNKNOWN_MARKER.to_string(),
            addr2line: None,
            build_dir_template: "build-{target}".to_string(),
            extra_images: Vec::new(),
            report_unresolved: false,
        }
    }
}

impl DecoderConfig {
    /// Firmware image produced by the build for `target`.
    pub fn firmware_image(&self, target: &str) -> PathBuf {
        PathBuf::from(self.build_dir_template.replace("{target}", target)).join("firmware.elf")
    }

    /// Candidate images for `target`, in resolution priority order.
    pub fn images_for(&self, target: &str) -> Vec<PathBuf> {
        let mut images = vec![self.firmware_image(target)];
        images.extend(self.extra_images.iter().map(PathBuf::from));
        images
    }

    /// Pick the addr2line executable: explicit override, then `ADDR2LINE_BIN`,
    /// then the config file, then the default cross toolchain name.
    pub fn addr2line_path(&self, override_path: Option<&str>) -> PathBuf {
        if let Some(p) = override_path {
            return PathBuf::from(p);
        }
        if let Some(env) = std::env::var_os(ADDR2LINE_ENV) {
            if !env.is_empty() {
                return PathBuf::from(env);
            }
        }
        PathBuf::from(self.addr2line.as_deref().unwrap_or(DEFAULT_ADDR2LINE))
    }
}

/// Load a decoder config from a `.json`, `.yaml` or `.yml` file.
///
/// Any other extension is parsed as YAML, which also accepts JSON documents.
pub fn load_config(path: &Path) -> Result<DecoderConfig, ConfigError> {
    let body = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if ext == "json" {
        serde_json::from_str(&body)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
    } else if body.trim().is_empty() {
        Ok(DecoderConfig::default())
    } else {
        serde_yaml::from_str(&body)
            .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })
    }
}
