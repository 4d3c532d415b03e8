use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::services::resolution::{ResolveError, SymbolResolver};

/// Flags: print addresses, expand inlines, pretty-print, function names,
/// demangle, then the executable to read.
pub const ADDR2LINE_FLAGS: &str = "-aipfCe";

/// Resolver that shells out to a (cross) binutils `addr2line` once per lookup.
pub struct Addr2LineTool {
    path: PathBuf,
}

impl Addr2LineTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SymbolResolver for Addr2LineTool {
    fn resolve(&self, image: &Path, address: &str) -> Result<Option<String>, ResolveError> {
        if !image.is_file() {
            return Err(ResolveError::MissingImage(image.to_path_buf()));
        }

        log::debug!("{} {} {} {}", self.path.display(), ADDR2LINE_FLAGS, image.display(), address);
        let output = Command::new(&self.path)
            .arg(ADDR2LINE_FLAGS)
            .arg(image)
            .arg(address)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    ResolveError::MissingTool(format!("{}: {e}", self.path.display()))
                }
                _ => ResolveError::Tool(format!("failed to spawn {}: {e}", self.path.display())),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ResolveError::Tool(format!(
                "{} exited with {}: {}",
                self.path.display(),
                output.status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            log::debug!("{} stderr: {}", self.path.display(), stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if stdout.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(stdout))
        }
    }

    fn name(&self) -> &'static str {
        "addr2line"
    }
}
