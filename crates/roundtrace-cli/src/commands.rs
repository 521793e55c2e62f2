use anyhow::Result;

use super::args::{Cli, Commands};
use super::handlers;
use crate::config::Config;
use crate::context::ExecutionContext;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let ctx = ExecutionContext::new(
        &config,
        cli.format,
        cli.window.map(Into::into),
        cli.preview_chars,
        cli.color,
    );

    match cli.command {
        Commands::Rounds { log } => handlers::rounds::handle(&log, &ctx),
        Commands::Tools { log, round } => handlers::tools::handle(&log, round, &ctx),
        Commands::Stats { log } => handlers::stats::handle(&log, &ctx),
        Commands::Images { log, round } => handlers::images::handle(&log, round, &ctx),
        Commands::Summary { log, round } => handlers::summary::handle(&log, round, &ctx),
        Commands::Issues { log } => handlers::issues::handle(&log, &ctx),
    }
}
