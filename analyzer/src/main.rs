use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use logtally_analyzer::{analyzer, input, Analyzer};
use logtally_shared::{log_system, logging, Config};

#[derive(Parser)]
#[command(name = "logtally")]
#[command(about = "Tally bundler user-agent fields from download logs")]
struct Cli {
    /// Verbose output (run summary on stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Print only unrecognized user agent lines
    #[arg(short, long)]
    unknown: bool,

    /// Config file path (default: auto-detect)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log files to process ('-' or nothing for stdin, .gz is decompressed)
    #[arg(value_name = "FILE")]
    paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    logging::init(&config.logging.level, cli.verbose || config.logging.verbose);

    let lines = input::read_inputs(&cli.paths)?;
    log_system!(info, "read {} lines from {} input(s)", lines.len(), cli.paths.len().max(1));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.unknown {
        // 未知の行だけを出力
        for line in analyzer::unknown_lines(lines) {
            writeln!(out, "{line}").context("Failed to write to stdout")?;
        }
        return out.flush().context("Failed to flush stdout");
    }

    let (report, stats) = Analyzer::analyze(lines, &mut io::stderr().lock())?;
    log_system!(info, "summary {}", stats.to_json()?);

    writeln!(out, "{}", report.to_pretty_json()?).context("Failed to write report")?;
    out.flush().context("Failed to flush stdout")
}
