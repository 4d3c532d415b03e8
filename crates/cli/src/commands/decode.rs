use std::io::{self, BufRead, Write};

use anyhow::Result;
use backtrace_core::services::resolution::default_resolver_registry;
use backtrace_core::session::{Session, SessionStats};

use crate::load_decoder_config;

/// Options collected from the command line for a decode session.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub target: String,
    pub config: Option<String>,
    pub addr2line: Option<String>,
    pub resolver: String,
    pub report_unresolved: bool,
}

/// Run the interactive decoder on stdin/stdout until end of input.
pub fn decode_command(opts: &DecodeOptions) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();
    decode_with_io(opts, &mut input, &mut output)?;
    Ok(())
}

/// Same as `decode_command` over arbitrary streams.
pub fn decode_with_io<R: BufRead, W: Write>(
    opts: &DecodeOptions,
    input: &mut R,
    output: &mut W,
) -> Result<SessionStats> {
    let mut config = load_decoder_config(opts.config.as_deref())?;
    if opts.report_unresolved {
        config.report_unresolved = true;
    }

    let registry = default_resolver_registry(config.addr2line_path(opts.addr2line.as_deref()));
    let resolver = registry.select(&opts.resolver)?;

    let session = Session::new(opts.target.clone(), &config, resolver);
    log::debug!("candidate images: {:?}", session.images);
    session.run(input, output)
}
