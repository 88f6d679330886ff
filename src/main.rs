use clap::{Parser, Subcommand};
use dairy_payments::application::payments::PaymentService;
use dairy_payments::domain::ids::{FarmId, PaymentId};
use dairy_payments::domain::payment::PaymentPatch;
use dairy_payments::domain::ports::{
    FarmStoreBox, PaymentStoreBox, ProductionStoreBox, RateSourceBox,
};
use dairy_payments::infrastructure::in_memory::{
    InMemoryFarmStore, InMemoryPaymentStore, InMemoryProductionStore,
};
use dairy_payments::infrastructure::rates::{DEFAULT_RATE_URL, FixedRateSource, HttpRateSource};
use dairy_payments::interfaces::csv::farm_reader::FarmReader;
use dairy_payments::interfaces::csv::production_reader::ProductionReader;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "DAIRY_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Farms CSV to load before running the command
    #[arg(long, global = true)]
    farms: Option<PathBuf>,

    /// Daily production CSV to load before running the command
    #[arg(long, global = true)]
    productions: Option<PathBuf>,

    /// Fixed BRL->USD rate instead of querying the rate service
    #[arg(long, env = "DAIRY_FIXED_RATE", global = true)]
    fixed_rate: Option<Decimal>,

    /// Base URL of the exchange rate service
    #[arg(long, env = "DAIRY_RATE_URL", default_value = DEFAULT_RATE_URL, global = true)]
    rate_url: String,

    /// Emit logs as JSON
    #[arg(long, env = "DAIRY_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price per liter and payment for one month
    PriceMonth {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    /// Prices for every month of a year with a stored payment
    PriceYear {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        year: i32,
    },
    /// Compute and store the payment for one month
    CreatePayment {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
    /// Overwrite fields of a stored payment
    UpdatePayment {
        #[arg(long)]
        id: String,
        #[arg(long)]
        price_per_liter: Option<Decimal>,
        #[arg(long)]
        total_volume_liters: Option<Decimal>,
        #[arg(long)]
        total_payment: Option<Decimal>,
    },
    /// Remove a stored payment
    DeletePayment {
        #[arg(long)]
        id: String,
    },
    /// Daily production aggregated over one month
    ProductionSummary {
        #[arg(long)]
        farm: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
}

struct Stores {
    farms: FarmStoreBox,
    productions: ProductionStoreBox,
    payments: PaymentStoreBox,
}

fn in_memory_stores() -> Stores {
    Stores {
        farms: Box::new(InMemoryFarmStore::new()),
        productions: Box::new(InMemoryProductionStore::new()),
        payments: Box::new(InMemoryPaymentStore::new()),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    use dairy_payments::infrastructure::rocksdb::RocksDBStore;

    let Some(db_path) = db_path else {
        return Ok(in_memory_stores());
    };
    let store = RocksDBStore::open(&db_path).into_diagnostic()?;
    info!(path = %db_path.display(), "using RocksDB storage");
    Ok(Stores {
        farms: Box::new(store.clone()),
        productions: Box::new(store.clone()),
        payments: Box::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

async fn seed(stores: &Stores, farms: Option<PathBuf>, productions: Option<PathBuf>) -> Result<()> {
    if let Some(path) = farms {
        let reader = FarmReader::new(File::open(&path).into_diagnostic()?);
        let mut loaded = 0usize;
        for farm in reader.farms() {
            match farm {
                Ok(farm) => {
                    stores.farms.store(farm).await.into_diagnostic()?;
                    loaded += 1;
                }
                Err(e) => warn!(error = %e, "skipping farm row"),
            }
        }
        info!(path = %path.display(), loaded, "farms loaded");
    }

    if let Some(path) = productions {
        let reader = ProductionReader::new(File::open(&path).into_diagnostic()?);
        let mut loaded = 0usize;
        for record in reader.records() {
            match record {
                Ok(record) => {
                    stores.productions.store(record).await.into_diagnostic()?;
                    loaded += 1;
                }
                Err(e) => warn!(error = %e, "skipping production row"),
            }
        }
        info!(path = %path.display(), loaded, "production records loaded");
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn parse_farm(raw: &str) -> Result<FarmId> {
    raw.parse::<FarmId>().into_diagnostic()
}

fn parse_payment(raw: &str) -> Result<PaymentId> {
    raw.parse::<PaymentId>().into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let stores = open_stores(cli.db_path)?;
    seed(&stores, cli.farms, cli.productions).await?;

    let rates: RateSourceBox = match cli.fixed_rate {
        Some(rate) => Box::new(FixedRateSource::new(rate)),
        None => Box::new(HttpRateSource::new(cli.rate_url)),
    };
    let service = PaymentService::new(stores.farms, stores.productions, stores.payments, rates);

    match cli.command {
        Command::PriceMonth { farm, year, month } => {
            let lookup = service
                .price_by_farm_and_month(parse_farm(&farm)?, year, month)
                .await
                .into_diagnostic()?;
            print_json(&lookup)
        }
        Command::PriceYear { farm, year } => {
            let lookup = service
                .price_by_farm_and_year(parse_farm(&farm)?, year)
                .await
                .into_diagnostic()?;
            print_json(&lookup)
        }
        Command::CreatePayment { farm, year, month } => {
            let payment = service
                .create_payment(parse_farm(&farm)?, year, month)
                .await
                .into_diagnostic()?;
            print_json(&payment)
        }
        Command::UpdatePayment {
            id,
            price_per_liter,
            total_volume_liters,
            total_payment,
        } => {
            let patch = PaymentPatch {
                price_per_liter,
                total_volume_liters,
                total_payment,
            };
            let payment = service
                .update_payment(parse_payment(&id)?, patch)
                .await
                .into_diagnostic()?;
            print_json(&payment)
        }
        Command::DeletePayment { id } => {
            let id = parse_payment(&id)?;
            service.delete_payment(id).await.into_diagnostic()?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::ProductionSummary { farm, year, month } => {
            let lookup = service
                .production_summary(parse_farm(&farm)?, year, month)
                .await
                .into_diagnostic()?;
            print_json(&lookup)
        }
    }
}

