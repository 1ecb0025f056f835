use anyhow::{Context, Result};
use std::io::Write;
use tracing_subscriber::EnvFilter;

use claude_usage_statusline::cli::{Args, Command};
use claude_usage_statusline::display::strip_ansi;
use claude_usage_statusline::install::{self, report};
use claude_usage_statusline::models::SessionInput;
use claude_usage_statusline::statusline::StatusLine;
use claude_usage_statusline::utils::{claude_dir, home_dir, read_stdin};

fn init_logging(debug: bool) {
    if !debug {
        return;
    }
    let filter = EnvFilter::try_from_env("CLAUDE_STATUSLINE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config_dir = claude_dir(args.claude_config_dir.as_deref());

    if let Some(Command::Install) = args.command {
        let source = std::env::current_exe().context("locate running executable")?;
        let home = home_dir().map(|h| h.to_string_lossy().into_owned());
        if let Err(err) = install::run_install(&config_dir, &source, home.as_deref()) {
            report::error(&format!("Error: {err:#}"));
            report::error("Setup failed!");
            std::process::exit(1);
        }
        return Ok(());
    }

    let stdin = read_stdin().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "failed to read stdin");
        Vec::new()
    });
    let input = SessionInput::from_slice(&stdin);

    let statusline = StatusLine::from_env(&config_dir);
    let lines = statusline.render(&input);

    let mut out = std::io::stdout().lock();
    for line in lines {
        let line = if args.no_color { strip_ansi(&line) } else { line };
        writeln!(out, "{line}")?;
    }
    Ok(())
}
