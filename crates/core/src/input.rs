//! Address extraction from pasted panic output.
//!
//! Two shapes are recognized:
//! - `Backtrace: 0x400810a4:0x3ffb0a10 0x400812b0:0x3ffb0a30 ...` on one line,
//!   where each token is `pc:sp` and only the `pc` half is kept.
//! - `Stack memory:` followed by hexdump lines such as
//!   `3ffb0000: 0xa5a5a5a5 0x400810a4 ...`, read until end of stream.
//!
//! Anything else produces an empty batch.

use std::io::{self, BufRead};

use crate::config::DecoderConfig;

/// How a prompt line was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Single-line backtrace; carries the text after the prefix.
    Backtrace(&'a str),
    /// Start of a multi-line stack memory dump.
    StackMemory,
    /// Neither prefix matched; the line yields no addresses.
    Other,
}

/// Match `line` against the configured prefixes. Prefixes must start the
/// line; leading whitespace makes it `Other`.
pub fn classify_line<'a>(line: &'a str, config: &DecoderConfig) -> LineKind<'a> {
    if let Some(rest) = line.strip_prefix(config.backtrace_prefix.as_str()) {
        LineKind::Backtrace(rest)
    } else if line.starts_with(config.stack_memory_prefix.as_str()) {
        LineKind::StackMemory
    } else {
        LineKind::Other
    }
}

/// Split a backtrace remainder into program counters, dropping the `:sp` suffix.
pub fn backtrace_addresses(rest: &str) -> Vec<String> {
    rest.split_whitespace()
        .map(|token| token.split(':').next().unwrap_or(token).to_string())
        .collect()
}

/// Collect the words of every dump line's second colon-delimited field.
///
/// Blank lines and lines without a `:` contribute nothing.
pub fn stack_memory_addresses<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut addresses = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        if let Some(field) = line.split(':').nth(1) {
            addresses.extend(field.split_whitespace().map(str::to_string));
        }
    }
    addresses
}

/// Build the address batch for one prompt line.
///
/// For a stack memory dump the remaining input is consumed up to end of stream.
pub fn read_batch<R: BufRead>(
    first_line: &str,
    reader: &mut R,
    config: &DecoderConfig,
) -> io::Result<Vec<String>> {
    match classify_line(first_line, config) {
        LineKind::Backtrace(rest) => Ok(backtrace_addresses(rest)),
        LineKind::StackMemory => {
            let mut lines = Vec::new();
            for line in reader.lines() {
                lines.push(line?);
            }
            Ok(stack_memory_addresses(lines))
        }
        LineKind::Other => Ok(Vec::new()),
    }
}

