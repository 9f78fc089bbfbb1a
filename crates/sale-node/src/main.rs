// sale-node/src/main.rs
use clap::{Parser, Subcommand};
use ledger_types::{Address, Amount};
use sale_node::{config::SaleConfig, store};
use token_sale::SaleLedger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sale-node")]
#[command(about = "Capped token-sale ledger harness", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Configuration file path
        #[arg(short, long, default_value = "./sale.toml")]
        config: String,
    },

    /// Run the deployment sequence and persist the wired ledger
    Deploy {
        /// Configuration file path
        #[arg(short, long, default_value = "./sale.toml")]
        config: String,

        /// Ledger state file
        #[arg(short, long, default_value = "./ledger.json")]
        state: String,
    },

    /// Whitelist funder addresses
    Whitelist {
        #[arg(short, long, default_value = "./ledger.json")]
        state: String,

        /// Calling address (owner or whitelister)
        #[arg(short, long)]
        from: String,

        /// Addresses to add
        addresses: Vec<String>,
    },

    /// Remove funder addresses from the whitelist
    Unwhitelist {
        #[arg(short, long, default_value = "./ledger.json")]
        state: String,

        #[arg(short, long)]
        from: String,

        /// Addresses to remove
        addresses: Vec<String>,
    },

    /// Send a payment to the crowdsale
    Contribute {
        #[arg(short, long, default_value = "./ledger.json")]
        state: String,

        /// Funder address
        #[arg(short, long)]
        from: String,

        /// Payment amount in base units
        #[arg(short, long)]
        value: u64,

        /// Timestamp of the payment (defaults to now)
        #[arg(short, long)]
        at: Option<u64>,
    },

    /// Close the crowdsale to further contributions
    Finalize {
        #[arg(short, long, default_value = "./ledger.json")]
        state: String,

        /// Calling address (must be the crowdsale owner)
        #[arg(short, long)]
        from: String,
    },

    /// Show the deployed ledger state
    Status {
        #[arg(short, long, default_value = "./ledger.json")]
        state: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={},token_sale={}", env!("CARGO_PKG_NAME"), log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init { config } => init(&config)?,
        Commands::Deploy { config, state } => deploy(&config, &state)?,
        Commands::Whitelist { state, from, addresses } => {
            update_whitelist(&state, &from, &addresses, true)?
        }
        Commands::Unwhitelist { state, from, addresses } => {
            update_whitelist(&state, &from, &addresses, false)?
        }
        Commands::Contribute { state, from, value, at } => contribute(&state, &from, value, at)?,
        Commands::Finalize { state, from } => finalize(&state, &from)?,
        Commands::Status { state } => status(&state)?,
    }

    Ok(())
}

fn init(config_path: &str) -> anyhow::Result<()> {
    let config = SaleConfig::default();
    config.to_file(config_path)?;
    tracing::info!("Default configuration written to {}", config_path);
    tracing::info!("Edit it to set deployer, beneficiary, rates and schedule");
    Ok(())
}

fn deploy(config_path: &str, state_path: &str) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from {}", config_path);
    let config = SaleConfig::from_file(config_path)?;
    let params = config.to_params()?;

    let ledger = SaleLedger::deploy(config.deployer, params)?;

    tracing::info!("Whitelist deployed at {}", ledger.whitelist_address());
    tracing::info!("Token deployed at     {}", ledger.token_address());
    tracing::info!("Crowdsale deployed at {}", ledger.crowdsale_address());

    store::save_ledger(state_path, &ledger)?;
    tracing::info!("Ledger state saved to {}", state_path);
    Ok(())
}

fn update_whitelist(
    state_path: &str,
    from: &str,
    addresses: &[String],
    add: bool,
) -> anyhow::Result<()> {
    let caller = Address::from_hex(from)?;
    let addrs = addresses
        .iter()
        .map(|s| Address::from_hex(s))
        .collect::<Result<Vec<_>, _>>()?;

    let mut ledger = store::load_ledger(state_path)?;
    if add {
        ledger.whitelist_mut().whitelist(caller, &addrs)?;
        tracing::info!("Whitelisted {} address(es)", addrs.len());
    } else {
        ledger.whitelist_mut().unwhitelist(caller, &addrs)?;
        tracing::info!("Unwhitelisted {} address(es)", addrs.len());
    }
    store::save_ledger(state_path, &ledger)?;
    Ok(())
}

fn contribute(state_path: &str, from: &str, value: u64, at: Option<u64>) -> anyhow::Result<()> {
    let funder = Address::from_hex(from)?;
    let now = at.unwrap_or_else(|| chrono::Utc::now().timestamp() as u64);

    let mut ledger = store::load_ledger(state_path)?;
    let minted = ledger.contribute(funder, Amount::from_u64(value), now)?;

    tracing::info!("Minted {} base units to {}", minted, funder);
    tracing::info!("Total raised: {}", ledger.crowdsale().wei_raised());
    store::save_ledger(state_path, &ledger)?;
    Ok(())
}

fn finalize(state_path: &str, from: &str) -> anyhow::Result<()> {
    let caller = Address::from_hex(from)?;

    let mut ledger = store::load_ledger(state_path)?;
    ledger.crowdsale_mut().finalize(caller)?;
    store::save_ledger(state_path, &ledger)?;
    Ok(())
}

fn status(state_path: &str) -> anyhow::Result<()> {
    let ledger = store::load_ledger(state_path)?;
    let token = ledger.token();
    let crowdsale = ledger.crowdsale();
    let whitelist = ledger.whitelist();

    println!("{} ({})", token.name(), token.symbol());
    println!("  token        {}", ledger.token_address());
    println!("  crowdsale    {}", ledger.crowdsale_address());
    println!("  whitelist    {}", ledger.whitelist_address());
    println!("  owner        {}", token.owner());
    println!("  cap          {}", token.cap());
    println!("  total supply {}", token.total_supply());
    println!("  minting done {}", token.minting_finished());
    println!("  rates        {}/{}/{}", crowdsale.rate_one(), crowdsale.rate_two(), crowdsale.rate_three());
    println!("  wei raised   {}", crowdsale.wei_raised());
    println!("  finalized    {}", crowdsale.is_finalized());
    println!("  whitelisted  {} address(es)", whitelist.member_count());
    Ok(())
}
