use clap::{Args, Parser, Subcommand};
use roundtrace_engine::CorrelationWindow;
use std::path::PathBuf;

use crate::config::{ColorMode, OutputFormat};

#[derive(Parser)]
#[command(name = "roundtrace")]
#[command(about = "Rebuild rounds and tool calls from AI coding assistant session logs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file (overrides ROUNDTRACE_CONFIG)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[arg(long, global = true, value_enum, help = "Correlate tool calls across the session or per round")]
    pub window: Option<WindowArg>,

    #[arg(long, global = true, help = "Maximum characters of prompt and output previews")]
    pub preview_chars: Option<usize>,

    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorMode>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Log decoder and correlation details to stderr (-vv for trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List the rounds of a session")]
    Rounds {
        #[command(flatten)]
        log: LogArgs,
    },

    #[command(about = "List tool invocations with status and latency")]
    Tools {
        #[command(flatten)]
        log: LogArgs,

        #[arg(long, help = "Only invocations called in this round")]
        round: Option<usize>,
    },

    #[command(about = "Token, cost and tool totals for the session and each round")]
    Stats {
        #[command(flatten)]
        log: LogArgs,
    },

    #[command(about = "List inline images of a round and resolve [Image #N] references")]
    Images {
        #[command(flatten)]
        log: LogArgs,

        #[arg(long)]
        round: usize,
    },

    #[command(about = "Print a round transcript (text) or its summary payload (json)")]
    Summary {
        #[command(flatten)]
        log: LogArgs,

        #[arg(long)]
        round: usize,
    },

    #[command(about = "Show records and blocks the decoder skipped")]
    Issues {
        #[command(flatten)]
        log: LogArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    #[arg(help = "Session log (JSON Lines or a JSON array)")]
    pub path: PathBuf,

    #[arg(long, help = "Project id (defaults to the log's parent directory name)")]
    pub project: Option<String>,

    #[arg(long, help = "Session id (defaults to the log's file stem)")]
    pub session: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowArg {
    Session,
    Round,
}

impl From<WindowArg> for CorrelationWindow {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Session => CorrelationWindow::Session,
            WindowArg::Round => CorrelationWindow::Round,
        }
    }
}
