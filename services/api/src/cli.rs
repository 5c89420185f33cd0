use crate::demo::{run_demo, run_saldo_report, DemoArgs, SaldoReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rent_ledger::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rent Ledger Service",
    about = "Run the rent ledger service or inspect tenancy ledgers from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with tenancy ledgers from exported data
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },
    /// Run a CLI demo covering the saldo and escalation workflows
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Reconstruct one tenancy's saldo from a transaction snapshot export
    Saldo(SaldoReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ledger {
            command: LedgerCommand::Saldo(args),
        } => run_saldo_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
