use std::path::PathBuf;

use carvault::{Config, Garage, StoreConfig, VehicleSource};
use carvault_core::VehicleId;
use carvault_core::timestamp::{self, TimestampMode};
use carvault_crypto::Crypto;
use carvault_store::{ExecutionContext, MemoryRowTable, RowTable, SnapshotStore, SqliteRowTable};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "carvault")]
#[command(about = "Encrypted store for vehicle status snapshots")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "carvault.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the stored vehicles with new snapshots
    Save {
        /// Status payload JSON; the bundled sample when omitted
        #[arg(long)]
        status: Option<PathBuf>,
        /// Attributes payload JSON; the bundled sample when omitted
        #[arg(long)]
        attributes: Option<PathBuf>,
        /// Number of vehicles to add
        #[arg(long, default_value_t = 1)]
        count: usize,
        /// Identity to store under; generated when omitted
        #[arg(long)]
        vehicle_id: Option<String>,
    },
    /// Print every stored vehicle
    Load,
    /// Remove every stored vehicle
    Clear,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    let codec = config.crypto.codec()?;

    match config.store {
        StoreConfig::Memory => {
            info!("Using in-memory snapshot store");
            run(MemoryRowTable::default(), codec, cli.command).await?;
        }
        StoreConfig::Sqlite { path } => {
            info!(path = ?path, "Using SQLite snapshot store");
            let table = SqliteRowTable::new(&path).await?;
            run(table, codec, cli.command).await?;
        }
    }

    Ok(())
}

async fn run<T, C>(table: T, crypto: C, command: Command) -> color_eyre::Result<()>
where
    T: RowTable,
    C: Crypto + 'static,
{
    let store = SnapshotStore::new(table, crypto, ExecutionContext::background());
    let mut garage = Garage::new(store);

    match command {
        Command::Save {
            status,
            attributes,
            count,
            vehicle_id,
        } => {
            let source = VehicleSource { status, attributes };
            for _ in 0..count {
                let identity = vehicle_id
                    .as_deref()
                    .map_or_else(VehicleId::generate, VehicleId::from);
                garage.add_vehicle(source.snapshot(identity)?);
            }

            let outcome = garage.save().await;
            print_message(&garage);
            outcome?;
        }
        Command::Load => {
            let outcome = garage.load().await;
            print_message(&garage);
            outcome?;

            for vehicle in garage.vehicles() {
                println!("vehicle:    {}", vehicle.identity());
                println!(
                    "saved at:   {}",
                    timestamp::format(vehicle.timestamp(), TimestampMode::Iso8601)?
                );
                println!("status:     {}", vehicle.status_text());
                println!("attributes: {}", vehicle.attributes_text());
                println!();
            }
        }
        Command::Clear => {
            let removed = garage.store().clear_all().await?;
            println!("Removed {removed} vehicles");
        }
    }

    Ok(())
}

fn print_message<T, C>(garage: &Garage<T, C>)
where
    T: RowTable,
    C: Crypto + 'static,
{
    if let Some(message) = garage.message() {
        println!("{message}");
    }
}
