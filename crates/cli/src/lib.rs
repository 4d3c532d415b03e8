pub mod commands;

use std::path::Path;

use anyhow::{Context, Result};
use backtrace_core::config::{load_config, DecoderConfig};

/// Load the decoder config from `path`, or fall back to the built-in defaults.
pub fn load_decoder_config(path: Option<&str>) -> Result<DecoderConfig> {
    match path {
        Some(p) => {
            let config = load_config(Path::new(p))
                .with_context(|| format!("Failed to load decoder config {p}"))?;
            Ok(config)
        }
        None => Ok(DecoderConfig::default()),
    }
}
