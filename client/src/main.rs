#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]
//! Command-line driver for the TatApps client data layer.
//!
//! # Examples
//! ```sh
//! TATAPPS_EMAIL=admin@tatapps.id TATAPPS_PASSWORD=secret \
//!   cargo run --bin tatapps-client -- --check /employees --check /settings/site --hydrate
//! ```

use std::ffi::OsString;
use std::io;

use clap::Parser;
use client::domain::GuardDecision;
use client::{AppContext, ClientSettings};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `tatapps-client` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tatapps-client",
    about = "Evaluate navigations and hydrate caches against a TatApps API",
    version
)]
struct CliArgs {
    /// Route path to run through the navigation guard. Repeatable.
    #[arg(long = "check", value_name = "path")]
    checks: Vec<String>,
    /// Load every entity cache and print collection sizes.
    #[arg(long)]
    hydrate: bool,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    // Flags belong to clap; settings come from the environment and files only.
    let settings = ClientSettings::load_from_iter([OsString::from("tatapps-client")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let credentials = settings.credentials().map_err(io::Error::other)?;
    let context = AppContext::from_settings(&settings).map_err(io::Error::other)?;

    let mut events = context.events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            warn!(?event, redirect = event.redirect_path(), "remote api raised auth event");
        }
    });

    if let Some(credentials) = credentials {
        let user = context
            .auth
            .login(&credentials)
            .await
            .map_err(|error| io::Error::other(format!("login failed: {error}")))?;
        info!(email = %credentials.email(), profile_loaded = user.is_some(), "logged in");
    }

    for path in &args.checks {
        match context.guard.evaluate(path).await {
            GuardDecision::Allow => println!("{path} allow"),
            GuardDecision::Redirect(target) => println!("{path} redirect {target}"),
        }
    }

    if args.hydrate {
        tokio::try_join!(
            context.hr.hydrate(),
            context.warehouses.hydrate(),
            context.inventory.hydrate(),
            context.site.fetch(),
        )
        .map_err(|error| io::Error::other(format!("hydrate failed: {error}")))?;

        let branding = context.site.branding();
        println!("site_title={}", branding.title);
        println!("divisions={}", context.hr.divisions().len());
        println!("positions={}", context.hr.positions().len());
        println!("employees={}", context.hr.employees().len());
        println!("warehouses={}", context.warehouses.warehouses().len());
        println!("inventory_items={}", context.inventory.items().len());
        println!("low_stock_items={}", context.inventory.low_stock_items().len());
        println!(
            "inventory_value={:.2}",
            context.inventory.total_inventory_value()
        );
    }

    Ok(())
}
