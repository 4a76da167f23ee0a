//! Lendweb main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use lendweb_api::{start_server, AppState};
use lendweb_client::{HttpGateway, LocalGateway, LoanRecord, Presenter, Reply, Transition, ViewState};
use lendweb_config::{Config, ConfigError};
use lendweb_core::{InMemoryLedger, LenderChangeInput, LoanController, LoanInput};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "lendweb")]
#[command(version = "0.1.0")]
#[command(about = "Record and query vessel loans over HTTP", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the default configuration
    InitConfig,
    /// List all loans, sorted by key
    All,
    /// Show one loan
    Get { id: String },
    /// Record a loan
    Record {
        #[arg(long)]
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        longitude: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: String,
        #[arg(long)]
        timestamp: String,
        #[arg(long)]
        lender: String,
        #[arg(long)]
        vessel: String,
    },
    /// Change a loan's lender
    Lender { id: String, name: String },
}

fn load_config(path: PathBuf) -> anyhow::Result<Config> {
    match Config::load(path) {
        Ok(config) => Ok(config),
        Err(e @ ConfigError::FileNotFound { .. }) => {
            eprintln!("{}\nFalling back to default configuration.", e.to_details());
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!("{}", e.to_details())),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::InitConfig) = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = load_config(args.config)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, args.command.unwrap_or(Command::Serve)))
}

async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve | Command::InitConfig => serve(config).await,
        command => run_client(config, command).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let controller: Arc<dyn LoanController> = Arc::new(InMemoryLedger::from_config(&config.ledger));
    // The page fragments run in-process against the same ledger the routes use
    let presenter = Presenter::new(Arc::new(LocalGateway::new(controller.clone())));

    let state = AppState { controller, presenter, config };
    start_server(state).await.context("server failed")
}

async fn run_client(config: Config, command: Command) -> anyhow::Result<()> {
    let gateway = HttpGateway::new(&config.client).context("could not build HTTP client")?;
    log::info!(
        target: "lendweb::cli",
        "Talking to {} ({} protocol)",
        config.client.base_url,
        gateway.protocol()
    );
    let presenter = Presenter::new(Arc::new(gateway));
    let state = ViewState::default();

    let transition = match command {
        Command::All => presenter.query_all_loan(state).await,
        Command::Get { ref id } => presenter.query_loan(state, id).await,
        Command::Record { ref id, ref longitude, ref latitude, ref timestamp, ref lender, ref vessel } => {
            let input = LoanInput {
                id: id.clone(),
                longitude: longitude.clone(),
                latitude: latitude.clone(),
                timestamp: timestamp.clone(),
                lender: lender.clone(),
                vessel: vessel.clone(),
            };
            presenter.record_loan(state, &input).await
        }
        Command::Lender { ref id, ref name } => {
            let input = LenderChangeInput { id: id.clone(), name: name.clone() };
            presenter.change_lender(state, &input).await
        }
        Command::Serve | Command::InitConfig => return Ok(()),
    };

    let view = match transition {
        Transition::Applied(view) => view,
        Transition::Unchanged(_) => anyhow::bail!("request to {} failed", config.client.base_url),
    };

    match command {
        Command::All => {
            for record in &view.all_loan {
                println!("{}", format_record(record));
            }
        }
        Command::Get { id } => match view.query_loan {
            Some(Reply::Found(loan)) => println!("{}", serde_json::to_string_pretty(&loan)?),
            _ => println!("Could not locate loan {}", id),
        },
        Command::Record { .. } => {
            if let Some(confirmation) = view.create_loan {
                println!("Loan recorded: {}", confirmation);
            }
        }
        Command::Lender { .. } => {
            if view.banners.error_holder {
                println!("Error: no loan found");
            } else {
                println!("Lender changed");
            }
        }
        Command::Serve | Command::InitConfig => {}
    }

    Ok(())
}

fn format_record(record: &LoanRecord) -> String {
    let key = record.key.map(|k| k.to_string()).unwrap_or_else(|| "?".to_string());
    format!(
        "{:>4}  {:<12} {:<16} {:<12} {}",
        key,
        record.field("vessel"),
        record.field("location"),
        record.field("timestamp"),
        record.field("lender")
    )
}
