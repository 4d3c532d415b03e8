use anyhow::Result;
use serde::Serialize;

use backtrace_core::services::resolution::default_resolver_registry;

use crate::load_decoder_config;

#[derive(Debug, Serialize)]
pub struct ResolverInfo {
    pub name: String,
    pub description: String,
}

/// List symbol resolvers compiled into this binary.
pub fn list_resolvers_command(
    config: Option<&str>,
    addr2line: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_decoder_config(config)?;
    let tool = config.addr2line_path(addr2line);
    let registry = default_resolver_registry(tool.clone());
    let entries: Vec<ResolverInfo> = registry
        .names()
        .into_iter()
        .map(|name| {
            let description = match name.as_str() {
                "addr2line" => format!("External addr2line tool ({})", tool.display()),
                "dwarf" => "In-process DWARF reader (no toolchain required)".to_string(),
                other => format!("Resolver '{}'", other),
            };
            ResolverInfo { name, description }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Resolvers: (none)");
        return Ok(());
    }

    println!("Resolvers:");
    for entry in entries {
        println!("- {}: {}", entry.name, entry.description);
    }

    Ok(())
}
