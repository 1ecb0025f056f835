use clap::builder::FalseyValueParser;

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Copy this binary into the Claude config dir and register it as the statusLine command
    Install,
}

/// Reads the Claude Code statusLine payload on stdin and prints the status line.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Claude config directory holding .credentials.json and settings.json. Defaults to ~/.claude
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Emit plain text without ANSI colors
    #[arg(long, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Debug mode: log pipeline details to stderr (filter via CLAUDE_STATUSLINE_LOG)
    #[arg(long, env = "CLAUDE_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}
