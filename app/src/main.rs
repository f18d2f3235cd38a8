use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod cli;
mod mcp;

use crate::cli::{init_tracing_cli, init_tracing_server, run_quick_open, run_search};
use crate::mcp::run_server;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorChoice {
    /// Colour only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Base URI of the Hound server, e.g. http://localhost:6080
    #[arg(long = "base-uri")]
    pub base_uri: Option<String>,
    /// Path to a JSON config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search and print the results
    Search {
        #[command(flatten)]
        conn: ConnectionArgs,
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
        /// Search query (a Hound regular expression)
        query: String,
    },
    /// Read queries line by line from stdin, searching as you type
    Open {
        #[command(flatten)]
        conn: ConnectionArgs,
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },
    /// Run MCP server over stdio
    Server {
        #[command(flatten)]
        conn: ConnectionArgs,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "hq",
    about = "hound_open: quick-open code search against a Hound server",
    version,
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Command::Search { conn, color, query } => {
            init_tracing_cli();
            run_search(conn, color, query).await?;
        }
        Command::Open { conn, color } => {
            init_tracing_cli();
            run_quick_open(conn, color).await?;
        }
        Command::Server { conn } => {
            // For MCP server, never log to stdout; optionally log to a file
            // if HOUND_OPEN_LOG_PATH is set.
            init_tracing_server();
            run_server(conn).await?;
        }
    }

    Ok(())
}
