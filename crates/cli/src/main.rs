use anyhow::Result;
use clap::Parser;
use decode_backtrace::commands::{decode_command, list_resolvers_command, DecodeOptions};

/// Translate pasted "Backtrace:" / "Stack memory:" panic output into
/// file:line (function) locations.
///
/// Enter the backtrace at the "? " prompt. CTRL-C to exit.
#[derive(Parser, Debug)]
#[command(
    name = "decode-backtrace",
    version,
    about = "Decode firmware backtraces into source locations",
    long_about = None
)]
struct Cli {
    /// Board/target name; images are searched in `build-<TARGET>/firmware.elf`
    /// followed by any `extra_images` from the config.
    #[arg(required_unless_present = "list_resolvers")]
    target: Option<String>,

    /// Decoder config file (.json, .yaml or .yml).
    #[arg(long)]
    config: Option<String>,

    /// Path to the addr2line executable (overrides ADDR2LINE_BIN and the config).
    #[arg(long)]
    addr2line: Option<String>,

    /// Symbol resolver to use.
    #[arg(long, default_value = "addr2line")]
    resolver: String,

    /// Print `<address>: ?? ??` for addresses no image could resolve.
    #[arg(long, default_value_t = false)]
    report_unresolved: bool,

    /// List available resolvers and exit.
    #[arg(long, default_value_t = false)]
    list_resolvers: bool,

    /// Emit JSON for --list-resolvers.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_resolvers {
        return list_resolvers_command(cli.config.as_deref(), cli.addr2line.as_deref(), cli.json);
    }

    let opts = DecodeOptions {
        target: cli.target.unwrap_or_default(),
        config: cli.config,
        addr2line: cli.addr2line,
        resolver: cli.resolver,
        report_unresolved: cli.report_unresolved,
    };
    decode_command(&opts)
}
