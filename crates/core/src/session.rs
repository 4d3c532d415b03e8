//! Interactive resolver loop.
//!
//! One iteration prints the instructions and the `? ` prompt, reads a line,
//! builds the address batch and resolves each address against the candidate
//! images. The loop ends at end of stream on the prompt; a resolver failure
//! aborts it.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::DecoderConfig;
use crate::input::read_batch;
use crate::services::resolution::{resolve_address, Resolution, SymbolResolver};

pub const INSTRUCTIONS: &str =
    "\"Backtrace:\" or \"Stack memory:\". CTRL-D to finish multiline paste";
pub const PROMPT: &str = "? ";
pub const LOOP_MARKER: &str = "loop";

/// Counters accumulated over a session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub batches: usize,
    pub addresses: usize,
    pub sentinels_skipped: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Total resolver calls across all addresses.
    pub attempts: usize,
}

pub struct Session<'a> {
    pub target: String,
    pub config: &'a DecoderConfig,
    pub images: Vec<PathBuf>,
    pub resolver: &'a dyn SymbolResolver,
}

impl<'a> Session<'a> {
    /// Session over the images configured for `target`.
    pub fn new(
        target: impl Into<String>,
        config: &'a DecoderConfig,
        resolver: &'a dyn SymbolResolver,
    ) -> Self {
        let target = target.into();
        let images = config.images_for(&target);
        Self { target, config, images, resolver }
    }

    /// Replace the candidate images (highest priority first).
    pub fn with_images(mut self, images: Vec<PathBuf>) -> Self {
        self.images = images;
        self
    }

    /// Prompt, read and decode batches until `input` hits end of stream.
    ///
    /// Returns the accumulated counters, or the first resolver failure with the
    /// offending address as context. Output already written stays written.
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<SessionStats> {
        log::info!(
            "decoding for {} with {} ({} images)",
            self.target,
            self.resolver.name(),
            self.images.len()
        );
        writeln!(output, "{}", self.target)?;

        let mut stats = SessionStats::default();
        let mut line = String::new();
        loop {
            writeln!(output, "{INSTRUCTIONS}")?;
            write!(output, "{PROMPT}")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line).context("Failed to read input line")? == 0 {
                break;
            }
            let first = line.trim_end_matches(&['\r', '\n'][..]);
            let addresses =
                read_batch(first, input, self.config).context("Failed to read stack memory")?;
            self.decode_batch(&addresses, output, &mut stats)?;
            writeln!(output, "{LOOP_MARKER}")?;
            stats.batches += 1;
        }

        log::debug!("session finished: {stats:?}");
        Ok(stats)
    }

    /// Resolve one batch in input order, writing each resolved location.
    pub fn decode_batch<W: Write>(
        &self,
        addresses: &[String],
        output: &mut W,
        stats: &mut SessionStats,
    ) -> Result<()> {
        for address in addresses {
            stats.addresses += 1;
            if *address == self.config.sentinel {
                stats.sentinels_skipped += 1;
                continue;
            }

            let outcome = resolve_address(
                self.resolver,
                &self.images,
                address,
                &self.config.unknown_marker,
            )
            .with_context(|| format!("Failed to resolve {address}"))?;
            stats.attempts += outcome.attempts;

            match outcome.resolution {
                Resolution::Resolved(text) => {
                    stats.resolved += 1;
                    writeln!(output, "{text}")?;
                }
                Resolution::Unresolved => {
                    stats.unresolved += 1;
                    if self.config.report_unresolved {
                        writeln!(output, "{address}: {}", self.config.unknown_marker)?;
                    }
                }
            }
        }
        Ok(())
    }
}
