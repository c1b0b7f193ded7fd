use clap::{Parser, Subcommand};

mod commands;
mod cues;

#[derive(Parser)]
#[command(name = "intervalist", version, about = "Workout interval timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a timer live in the terminal
    Run(commands::run::RunArgs),
    /// Step a timer through its session instantly and print the timeline
    Simulate(commands::simulate::SimulateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("intervalist=info,intervalist_core=info")
            }),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
