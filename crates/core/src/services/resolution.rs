use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures that abort a decode session.
///
/// An address that simply has no debug info is not an error; it surfaces as
/// `Resolution::Unresolved`.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Image not found at {0}")]
    MissingImage(PathBuf),
    #[error("Symbolizer not found: {0}")]
    MissingTool(String),
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),
    #[error("Symbolizer error: {0}")]
    Tool(String),
    /// Requested resolver is not compiled in; carries the registered names.
    #[error("Unknown resolver '{name}'. Available: {}", .available.join(", "))]
    UnknownResolver { name: String, available: Vec<String> },
}

/// Capability that maps one address in one image to location text.
///
/// `Ok(None)` means the image produced no output at all. `Ok(Some(text))` is
/// the raw output, which may still carry the unknown-location marker.
pub trait SymbolResolver {
    fn resolve(&self, image: &Path, address: &str) -> Result<Option<String>, ResolveError>;
    fn name(&self) -> &'static str;
}

/// Outcome of searching every candidate image for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Trimmed output of the first image that knew the address.
    Resolved(String),
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressOutcome {
    pub resolution: Resolution,
    /// Number of resolver calls made; never more than the number of images.
    pub attempts: usize,
}

/// Try `images` in priority order and stop at the first output without `marker`.
pub fn resolve_address(
    resolver: &dyn SymbolResolver,
    images: &[PathBuf],
    address: &str,
    marker: &str,
) -> Result<AddressOutcome, ResolveError> {
    let mut attempts = 0;
    for image in images {
        attempts += 1;
        let Some(output) = resolver.resolve(image, address)? else {
            continue;
        };
        if !output.contains(marker) {
            return Ok(AddressOutcome {
                resolution: Resolution::Resolved(output.trim().to_string()),
                attempts,
            });
        }
        log::debug!("{address} unknown in {}", image.display());
    }
    Ok(AddressOutcome { resolution: Resolution::Unresolved, attempts })
}

/// Symbol resolvers compiled into this build, keyed by `SymbolResolver::name`.
///
/// The CLI `--resolver` option picks one of these for the whole session.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Box<dyn SymbolResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self { resolvers: HashMap::new() }
    }

    /// Add `resolver`, replacing any earlier one with the same name.
    pub fn register<R: SymbolResolver + 'static>(&mut self, resolver: R) -> &mut Self {
        self.resolvers.insert(resolver.name().to_string(), Box::new(resolver));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn SymbolResolver> {
        self.resolvers.get(name).map(|r| &**r)
    }

    /// Resolver for a session, or `UnknownResolver` listing what is available.
    pub fn select(&self, name: &str) -> Result<&dyn SymbolResolver, ResolveError> {
        self.get(name).ok_or_else(|| ResolveError::UnknownResolver {
            name: name.to_string(),
            available: self.names(),
        })
    }

    /// Registered resolver names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.resolvers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Registry populated with the external addr2line tool and, when built with
/// `dwarf-backend`, the in-process DWARF reader.
pub fn default_resolver_registry(addr2line_path: PathBuf) -> ResolverRegistry {
    let mut registry = ResolverRegistry::new();
    registry.register(crate::services::backends::Addr2LineTool::new(addr2line_path));
    #[cfg(feature = "dwarf-backend")]
    {
        registry.register(crate::services::backends::DwarfResolver::new());
    }
    registry
}
