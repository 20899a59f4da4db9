//! EcoFinds CLI - drive the cart ledger from the command line.
//!
//! Each invocation starts from the seed cart (the demo cart, or `--seed`),
//! applies one command through the simulated backend, and renders the result.
//!
//! # Usage
//!
//! ```bash
//! # Show the demo cart
//! ecofinds show
//!
//! # Change a quantity (waits out the simulated latency)
//! ecofinds update --id 2 --quantity 3
//!
//! # Remove a line, rendering JSON instead of log lines
//! ecofinds --json remove --id 1
//!
//! # Browse the catalog and add a product by id
//! ecofinds products --category kitchen --search wrap
//! ecofinds add --id 5 --quantity 2
//!
//! # Run concurrent edits and watch per-row pending states
//! ecofinds demo
//!
//! # Place an order for the demo cart
//! ecofinds checkout --email a@b.in --first-name Asha --last-name Rao \
//!     --address "12 MG Road" --city Bengaluru --state KA --zip-code 560001 \
//!     --card-number "4111 1111 1111 1111" --expiry-date 09/29 --cvv 123 \
//!     --name-on-card "Asha Rao"
//! ```
//!
//! Pricing and latency come from `CART_*` environment variables (see
//! `ecofinds_cart::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ecofinds_cart::Category;
use ecofinds_core::ProductId;
use secrecy::SecretString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ecofinds")]
#[command(author, version, about = "EcoFinds cart tools")]
struct Cli {
    /// JSON seed file with `{id, name, unit_price, quantity}` lines
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Render the cart as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Skip the simulated backend latency
    #[arg(long, global = true)]
    no_latency: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart and its totals
    Show,
    /// Change the quantity of a line
    Update {
        /// Product id of the line
        #[arg(short, long)]
        id: ProductId,

        /// New quantity (values below 1 are ignored)
        #[arg(short, long, allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product id of the line
        #[arg(short, long)]
        id: ProductId,
    },
    /// Add a catalog product, or increase its quantity if already in the cart
    Add {
        /// Catalog product id
        #[arg(short, long)]
        id: ProductId,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// List catalog products
    Products {
        /// Only show this category
        #[arg(short, long)]
        category: Option<Category>,

        /// Only show products whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Run concurrent edits against the cart and log every state change
    Demo,
    /// Validate checkout details and place an order
    Checkout(CheckoutArgs),
}

/// Checkout form fields.
#[derive(Args)]
struct CheckoutArgs {
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value = "")]
    state: String,
    #[arg(long, default_value = "")]
    zip_code: String,
    #[arg(long, default_value = "")]
    card_number: String,
    #[arg(long, default_value = "")]
    expiry_date: String,
    #[arg(long, default_value = "")]
    cvv: String,
    #[arg(long, default_value = "")]
    name_on_card: String,
}

/// Initialize tracing with `EnvFilter`.
///
/// Defaults to info level for our crates if `RUST_LOG` is not set.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ecofinds_cli=info,ecofinds_cart=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Products { category, search } = &cli.command {
        return commands::products::list(*category, search, cli.json);
    }

    let session = commands::Session::open(cli.seed.as_deref(), cli.no_latency, cli.json).await?;

    match cli.command {
        Commands::Show => commands::cart::show(&session).await?,
        Commands::Update { id, quantity } => commands::cart::update(&session, id, quantity).await?,
        Commands::Remove { id } => commands::cart::remove(&session, id).await?,
        Commands::Add { id, quantity } => commands::cart::add(&session, id, quantity).await?,
        Commands::Products { .. } => {}
        Commands::Demo => commands::cart::demo(&session).await?,
        Commands::Checkout(args) => commands::checkout::run(&session, args.into()).await?,
    }
    Ok(())
}

impl From<CheckoutArgs> for ecofinds_cart::CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            address: args.address,
            city: args.city,
            state: args.state,
            zip_code: args.zip_code,
            card_number: SecretString::from(args.card_number),
            expiry_date: args.expiry_date,
            cvv: SecretString::from(args.cvv),
            name_on_card: args.name_on_card,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["ecofinds", "update", "--id", "1", "--quantity", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Update { quantity: -1, .. })
        ));
    }

    #[test]
    fn test_products_category_is_parsed() {
        let cli = Cli::try_parse_from(["ecofinds", "products", "--category", "kitchen"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Products { category: Some(Category::Kitchen), .. })
        ));

        let cli = Cli::try_parse_from(["ecofinds", "products", "--category", "garden"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_checkout_args_keep_card_details_secret() {
        use secrecy::ExposeSecret;

        let cli = Cli::try_parse_from([
            "ecofinds",
            "checkout",
            "--card-number",
            "4111 1111 1111 1111",
            "--cvv",
            "123",
        ])
        .unwrap();
        let Commands::Checkout(args) = cli.command else {
            panic!("expected checkout");
        };

        let form = ecofinds_cart::CheckoutForm::from(args);
        assert_eq!(form.card_number.expose_secret(), "4111 1111 1111 1111");
        assert_eq!(form.cvv.expose_secret(), "123");
        assert!(!format!("{:?}", form.cvv).contains("123"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ecofinds", "show", "--json", "--no-latency"]);
        assert!(cli.is_ok_and(|c| c.json && c.no_latency));
    }
}
