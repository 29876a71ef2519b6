use crate::demo::{print_transition_table, run_demo, DemoArgs, TransitionsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hireflow::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hireflow",
    about = "Run and inspect the candidate pipeline workflow service",
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
    /// Print the status transition table, optionally for a single role
    Transitions(TransitionsArgs),
    /// Walk a sample candidate through the full pipeline in-process
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// CSV roster (Name, Email, Phone, Skills, Source, Job Title) used to seed candidates
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Transitions(args) => print_transition_table(args),
        Command::Demo(args) => run_demo(args),
    }
}
