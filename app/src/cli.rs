use std::io::IsTerminal;
use std::sync::Arc;

use colored::Colorize;
use hound_open_core::{HoundConfig, HoundProvider, MatchRecord, register_provider};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{ColorChoice, ConnectionArgs};

/// Initialize tracing for CLI commands (search/open).
///
/// Logs go to stderr, and respect RUST_LOG or default to `info`.
pub fn init_tracing_cli() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing for MCP server.
///
/// - Never logs to stdout (to keep stdio clean for JSON-RPC).
/// - If `HOUND_OPEN_LOG_PATH` is set, append logs to that file.
/// - If not set or file cannot be opened, logging is effectively disabled.
pub fn init_tracing_server() {
    use std::fs::OpenOptions;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tracing_subscriber::{EnvFilter, fmt};

    let path = match std::env::var("HOUND_OPEN_LOG_PATH") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => return,
    };

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(_) => return,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

pub fn apply_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            if !std::io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

pub fn resolve_config(conn: ConnectionArgs) -> HoundConfig {
    match HoundConfig::resolve(conn.base_uri, conn.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}

fn open_provider(conn: ConnectionArgs) -> HoundProvider {
    let config = resolve_config(conn);
    debug!("search server: {}", config.base_uri);

    match register_provider(&config) {
        Ok(provider) => provider,
        Err(err) => {
            error!("Failed to set up search client: {err}");
            std::process::exit(1);
        }
    }
}

fn print_records(provider: &HoundProvider, records: &[MatchRecord]) {
    for record in records {
        let block = provider.component_for_item(record);
        println!("{}", block.to_terminal_text());
    }
}

pub async fn run_search(
    conn: ConnectionArgs,
    color: ColorChoice,
    query: String,
) -> Result<(), Box<dyn std::error::Error>> {
    apply_color(color);
    let provider = open_provider(conn);

    let records = match provider.execute_query(Some(&query)).await {
        Ok(records) => records,
        Err(err) => {
            error!("Search failed: {err}");
            std::process::exit(1);
        }
    };

    print_records(&provider, &records);
    Ok(())
}

/// Quick-open loop: every stdin line is the current query text. A search runs
/// once input has been quiet for the provider's debounce delay, and only the
/// newest response is printed.
pub async fn run_quick_open(
    conn: ConnectionArgs,
    color: ColorChoice,
) -> Result<(), Box<dyn std::error::Error>> {
    apply_color(color);
    let provider = Arc::new(open_provider(conn));
    let delay = provider.debounce_delay;

    info!(
        "{} ({}): {}",
        provider.display.title,
        provider.provider_type.as_str(),
        provider.display.prompt
    );

    let (tx, mut rx) = mpsc::unbounded_channel::<(String, Vec<MatchRecord>)>();

    let printer_provider = Arc::clone(&provider);
    let printer = task::spawn(async move {
        let mut shown: Option<Vec<MatchRecord>> = None;
        while let Some((query, records)) = rx.recv().await {
            if shown.as_ref() == Some(&records) {
                debug!("results for {query:?} unchanged; skipping redraw");
                continue;
            }
            println!("{} {}", ">".dimmed(), query.bold());
            if records.is_empty() {
                println!("No results");
            }
            print_records(&printer_provider, &records);
            shown = Some(records);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<String> = None;
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    loop {
        match pending.take() {
            Some(query) => {
                tokio::select! {
                    line = lines.next_line() => match line? {
                        Some(line) => {
                            debug!("debounced away {query:?}");
                            pending = Some(line);
                        }
                        None => {
                            in_flight.push(spawn_query(&provider, query, tx.clone()));
                            break;
                        }
                    },
                    _ = tokio::time::sleep(delay) => {
                        in_flight.push(spawn_query(&provider, query, tx.clone()));
                    }
                }
            }
            None => match lines.next_line().await? {
                Some(line) => pending = Some(line),
                None => break,
            },
        }
    }

    for handle in in_flight {
        if let Err(err) = handle.await {
            warn!("search task panicked: {err}");
        }
    }
    drop(tx);
    printer.await?;

    Ok(())
}

fn spawn_query(
    provider: &Arc<HoundProvider>,
    query: String,
    tx: mpsc::UnboundedSender<(String, Vec<MatchRecord>)>,
) -> JoinHandle<()> {
    let provider = Arc::clone(provider);
    task::spawn(async move {
        match provider.execute_latest(Some(&query)).await {
            Ok(Some(records)) => {
                let _ = tx.send((query, records));
            }
            Ok(None) => {}
            Err(err) => warn!("Search for {query:?} failed: {err}"),
        }
    })
}
