//! Command-line front end for the pricing-session contracts.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command ──▶ ControllerHandle ──▶ Controller task ──▶ ContractGateway ──▶ node
//!                                            │
//!                                            ▼
//!                                   watch<AppState> ──▶ view::render_* ──▶ stdout
//!
//!   AccountWatcher (dashboard --watch) ──▶ accounts_changed ──▶ full reload
//! ```
//!
//! Logs go to stderr; stdout only carries rendered views.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pricing_dapp::blockchain::PricingContracts;
use pricing_dapp::config::{load_config_with, AppConfig};
use pricing_dapp::lifecycle::signals::spawn_ctrl_c_handler;
use pricing_dapp::observability::{logging, metrics};
use pricing_dapp::session::parse_action;
use pricing_dapp::state::{ProductField, ProfileField, Route};
use pricing_dapp::view;
use pricing_dapp::{launch, App, AppError, AppState};

#[derive(Parser)]
#[command(name = "pricing-dapp")]
#[command(about = "Register, list and price products on the pricing-session contracts", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides config and environment)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Main contract address (overrides config and environment)
    #[arg(long)]
    main_contract: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sidebar, notice and the products view
    Dashboard {
        /// Keep re-rendering on state changes and follow account switches
        #[arg(long)]
        watch: bool,
        /// View under the sidebar: products or participants
        #[arg(long, default_value = "/products")]
        route: Route,
    },
    /// List products visible to the current account
    Products,
    /// List participants visible to the current account
    Participants,
    /// Register the current account as a participant
    Register {
        #[arg(long)]
        fullname: String,
        #[arg(long)]
        email: String,
    },
    /// Deploy a new pricing session (admin only)
    CreateProduct {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Select product <INDEX> and drive its session
    Session {
        index: usize,
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    Start,
    Stop,
    /// Submit your price
    Price { price: String },
    /// Close with the final price
    Close { price: String },
}

impl SessionAction {
    fn name_and_price(&self) -> (&'static str, Option<&str>) {
        match self {
            Self::Start => ("start", None),
            Self::Stop => ("stop", None),
            Self::Price { price } => ("pricing", Some(price.as_str())),
            Self::Close { price } => ("close", Some(price.as_str())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let rpc_url = cli.rpc_url.clone();
    let main_contract = cli.main_contract.clone();
    let config = load_config_with(cli.config.as_deref(), |config: &mut AppConfig| {
        if let Some(url) = rpc_url {
            config.provider.rpc_url = url;
        }
        if let Some(address) = main_contract {
            config.contracts.main_address = address;
        }
    })?;

    logging::init_logging(&config.observability);
    tracing::info!("pricing-dapp v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let app = launch(&config).await?;
    let result = run(&app, cli.command).await;
    app.stop().await;
    result
}

async fn run(app: &App<PricingContracts>, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let handle = app.handle();
    handle.bootstrap().await?;

    match command {
        Commands::Dashboard { watch, route } => {
            handle.navigate(route).await?;
            if watch {
                watch_dashboard(app).await;
            } else {
                print_state(app, view::render_app);
            }
        }
        Commands::Products => {
            handle.navigate(Route::Products).await?;
            print_state(app, view::render_products);
        }
        Commands::Participants => {
            handle.navigate(Route::Participants).await?;
            print_state(app, view::render_participants);
        }
        Commands::Register { fullname, email } => {
            handle.edit_profile(ProfileField::Fullname, fullname).await?;
            handle.edit_profile(ProfileField::Email, email).await?;
            let result = handle.register().await;
            print_state(app, view::render_app);
            let outcome = result?;
            tracing::info!(tx_hash = %outcome.tx_hash, "Registration mined");
        }
        Commands::CreateProduct {
            name,
            description,
            image,
        } => {
            handle.edit_new_product(ProductField::Name, name).await?;
            handle.edit_new_product(ProductField::Description, description).await?;
            handle.edit_new_product(ProductField::Image, image).await?;
            let result = handle.create_product().await;
            print_state(app, view::render_app);
            let address = result?;
            println!("\nSession deployed at {}", address);
        }
        Commands::Session { index, action } => {
            let (name, price) = action.name_and_price();
            let call = parse_action(name, price).map_err(AppError::InvalidInput)?;
            handle.select_product(index).await?;
            let result = handle.session_action(call).await;
            print_state(app, view::render_app);
            result?;
        }
    }
    Ok(())
}

fn print_state(app: &App<PricingContracts>, render: fn(&AppState) -> String) {
    let rendered = render(&app.subscribe().borrow());
    println!("{}", rendered);
}

/// Re-render on every published state until Ctrl-C.
async fn watch_dashboard(app: &App<PricingContracts>) {
    let mut state = app.subscribe();
    let mut shutdown = app.shutdown().subscribe();
    let watcher = app.watch_accounts();
    spawn_ctrl_c_handler(app.shutdown().clone());

    println!("{}", view::render_app(&state.borrow_and_update()));
    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let rendered = view::render_app(&state.borrow_and_update());
                println!("\n{}\n{}", "-".repeat(72), rendered);
            }
            _ = shutdown.recv() => break,
        }
    }

    if let Err(e) = watcher.await {
        tracing::error!(error = %e, "Account watcher task failed");
    }
}
