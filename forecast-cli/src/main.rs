use std::io;

use clap::Parser;

use forecast_cli::{Cli, app, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    let stdout = io::stdout();
    app::run(&cli, &mut stdout.lock())
}
