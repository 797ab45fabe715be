//! afftrack CLI
//!
//! Drives the ledger and request builder from a native host. State lives in
//! a JSON file standing in for local storage; there is no cookie jar or
//! session storage outside a browser.

use std::sync::Arc;

use afftrack::backend::{FileStorageArea, StorageBackends};
use afftrack::clock::SystemClock;
use afftrack::tracking::{ClickOptions, ConversionOptions};
use afftrack::{Config, Scope, Tracker};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info,afftrack=debug";

/// afftrack CLI
#[derive(Parser, Debug)]
#[command(name = "afftrack-cli")]
#[command(about = "CLI for the afftrack attribution core")]
#[command(version)]
struct Args {
    /// State file (local storage stand-in)
    #[arg(short, long, default_value = "./afftrack_state.json")]
    state: String,

    /// Tracking domain
    #[arg(short, long, default_value = "https://tracking.example.com")]
    domain: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a transaction id
    Record {
        /// Scope: o (offer) or a (advertiser)
        scope: Scope,

        /// Offer or advertiser id
        id: String,

        /// Transaction id to append
        transaction_id: String,
    },

    /// Print the latest transaction id
    Latest {
        scope: Scope,
        id: String,
    },

    /// Print every recorded transaction id, oldest first
    History {
        scope: Scope,
        id: String,
    },

    /// Show (or set) the witness flag
    Witness {
        #[arg(long)]
        mark: bool,
    },

    /// Build a click URL
    ClickUrl {
        #[arg(long)]
        affiliate_id: String,

        #[arg(long)]
        offer_id: String,
    },

    /// Record the click id from a click response body
    ClickResponse {
        #[arg(long)]
        offer_id: String,

        #[arg(long)]
        advertiser_id: Option<String>,

        /// JSON body, e.g. {"clickid":"..."}
        body: String,
    },

    /// Build a conversion URL
    ConversionUrl {
        #[arg(long)]
        offer_id: Option<String>,

        #[arg(long)]
        click_id: Option<String>,

        #[arg(long)]
        promo_code: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        sum: Option<String>,

        #[arg(long)]
        goal: Option<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let local = match FileStorageArea::open(&args.state) {
        Ok(area) => Arc::new(area),
        Err(e) => {
            tracing::error!("Failed to open state file {}: {}", args.state, e);
            std::process::exit(1);
        }
    };

    let config = Config::builder().tracking_domain(&args.domain).build();
    let backends = StorageBackends::new().with_local(local);
    let tracker = Tracker::new(config, backends, Arc::new(SystemClock));

    if let Err(e) = run(&tracker, args.command) {
        tracing::error!("{} ({})", e, e.code());
        std::process::exit(1);
    }
}

fn run(tracker: &Tracker, command: Commands) -> afftrack::Result<()> {
    let ledger = tracker.ledger();

    match command {
        Commands::Record {
            scope,
            id,
            transaction_id,
        } => {
            ledger.record_transaction(scope, &id, &transaction_id);
            println!("{}", ledger.latest_transaction(scope, &id));
        }
        Commands::Latest { scope, id } => {
            println!("{}", ledger.latest_transaction(scope, &id));
        }
        Commands::History { scope, id } => {
            for transaction_id in ledger.transactions(scope, &id) {
                println!("{}", transaction_id);
            }
        }
        Commands::Witness { mark } => {
            if mark {
                ledger.mark_witnessed();
            }
            println!("{}", ledger.witnessed());
        }
        Commands::ClickUrl {
            affiliate_id,
            offer_id,
        } => {
            let url = tracker.click_url(&ClickOptions::new(affiliate_id, offer_id))?;
            println!("{}", url);
        }
        Commands::ClickResponse {
            offer_id,
            advertiser_id,
            body,
        } => {
            let click_id =
                tracker.handle_click_response(&offer_id, advertiser_id.as_deref(), &body)?;
            println!("{}", click_id);
        }
        Commands::ConversionUrl {
            offer_id,
            click_id,
            promo_code,
            status,
            sum,
            goal,
        } => {
            let options = ConversionOptions {
                offer_id,
                click_id,
                promo_code,
                status,
                sum,
                goal,
                ..ConversionOptions::default()
            };
            println!("{}", tracker.conversion_url(&options)?);
        }
    }

    Ok(())
}
