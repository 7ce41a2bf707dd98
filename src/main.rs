use bank_server::application::dispatcher::Dispatcher;
use bank_server::config::{
    DEFAULT_ACCOUNTS, DEFAULT_INITIAL_BALANCE, ServerConfig, default_parallelism,
};
use bank_server::domain::ports::MessageSourceBox;
use bank_server::infrastructure::lines::LineSource;
use bank_server::interfaces::csv::BalanceWriter;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Concurrent in-memory bank ledger server", long_about = None)]
struct Cli {
    /// Number of accounts in the ledger
    #[arg(long, env = "BANK_ACCOUNTS", default_value_t = DEFAULT_ACCOUNTS)]
    accounts: usize,

    /// Balance every account starts with
    #[arg(long, env = "BANK_INITIAL_BALANCE", default_value_t = DEFAULT_INITIAL_BALANCE)]
    initial_balance: i64,

    /// Maximum number of requests processed concurrently (default: available parallelism)
    #[arg(long, env = "BANK_MAX_IN_FLIGHT")]
    max_in_flight: Option<usize>,

    /// Delay between taking the two account locks of a transfer, in milliseconds.
    /// Test instrumentation only.
    #[arg(long, env = "BANK_TRANSFER_DELAY_MS", default_value_t = 0)]
    transfer_delay_ms: u64,

    /// Wait before retrying a failed receive, in milliseconds
    #[arg(long, env = "BANK_RECV_BACKOFF_MS", default_value_t = 1000)]
    recv_backoff_ms: u64,

    /// Unix datagram socket to receive requests on. Reads stdin lines if omitted.
    #[arg(long, env = "BANK_SOCKET")]
    socket: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "BANK_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig::new()
            .with_accounts(self.accounts)
            .with_initial_balance(self.initial_balance)
            .with_max_in_flight(self.max_in_flight.unwrap_or_else(default_parallelism))
            .with_transfer_delay(Duration::from_millis(self.transfer_delay_ms))
            .with_recv_backoff(Duration::from_millis(self.recv_backoff_ms))
    }
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).into_diagnostic()?,
    };
    // Logs go to stderr; stdout carries only the final balance report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
    Ok(())
}

#[cfg(unix)]
fn open_source(socket: Option<PathBuf>) -> Result<MessageSourceBox> {
    use bank_server::infrastructure::datagram::DatagramSource;

    match socket {
        Some(path) => {
            let source = DatagramSource::bind(&path).into_diagnostic()?;
            info!(socket = %source.path().display(), "listening for requests");
            Ok(Box::new(source))
        }
        None => Ok(stdin_source()),
    }
}

#[cfg(not(unix))]
fn open_source(socket: Option<PathBuf>) -> Result<MessageSourceBox> {
    if socket.is_some() {
        miette::bail!("--socket requires a Unix platform");
    }
    Ok(stdin_source())
}

fn stdin_source() -> MessageSourceBox {
    info!("reading requests from stdin");
    Box::new(LineSource::new(BufReader::new(tokio::io::stdin())))
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server keeps
/// running until the sentinel or end of input.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn serve(cli: Cli) -> Result<()> {
    let config = cli.server_config();
    let dispatcher = Dispatcher::from_config(&config).into_diagnostic()?;
    let mut source = open_source(cli.socket)?;

    info!(
        accounts = config.accounts,
        initial_balance = config.initial_balance,
        max_in_flight = config.max_in_flight,
        "bank server started"
    );

    tokio::select! {
        reason = dispatcher.run(source.as_mut()) => {
            info!(?reason, "stopped accepting requests");
        }
        () = interrupted() => {
            info!("interrupted, waiting for in-flight requests");
            dispatcher.drain().await;
        }
    }

    let balances = dispatcher.ledger().snapshot().await;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_balances(balances).into_diagnostic()?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    let result = runtime.block_on(serve(cli));
    // An interrupted stdin read is still parked on a blocking thread and
    // cannot be cancelled, so the runtime must not wait for it.
    runtime.shutdown_background();
    result
}
