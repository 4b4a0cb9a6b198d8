use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    advisory::{advisory_groups, asthma_alert, hourly_outlook, ASTHMA_ALERT_TEXT},
    simulation::{project_day, InterventionControls},
    wallet::NEXT_REWARD_COINS,
    AqiSource, ChatSession, ClientSettings, DataOrigin, Dispatcher, EcoWallet, HttpAqiSource,
    LocationStore, ProfileStore,
};
use shared::domain::{Activity, Sender};
use storage::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "airguard", about = "Air quality dashboard in the terminal")]
struct Cli {
    /// Base URL of the AQI backend.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Location to show instead of the configured one.
    #[arg(long, short, global = true)]
    location: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Current reading, outlook and health advice.
    Aqi,
    /// Talk to the assistant. `/quit` leaves.
    Chat {
        /// Switch the dashboard location when a question names another city.
        #[arg(long)]
        follow: bool,
    },
    #[command(subcommand)]
    Wallet(WalletCommand),
    /// Project the day's AQI under emission controls.
    Simulate {
        #[arg(long, default_value_t = 80.0)]
        traffic: f64,
        #[arg(long, default_value_t = 70.0)]
        industry: f64,
        #[arg(long, default_value_t = 40.0)]
        stubble: f64,
    },
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    Show,
    /// Log a trip: walk, cycle or bus.
    Earn { activity: Activity },
    Redeem,
    History {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    ToggleAsthma,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli);

    match cli.command {
        Command::Aqi => show_aqi(&settings).await,
        Command::Chat { follow } => chat(&settings, follow).await,
        Command::Wallet(command) => wallet(&settings, command).await,
        Command::Simulate {
            traffic,
            industry,
            stubble,
        } => {
            let controls = InterventionControls::new(traffic, industry, stubble);
            simulate(&settings, controls).await
        }
        Command::Profile(command) => profile(&settings, command).await,
    }
}

fn resolve_settings(cli: &Cli) -> ClientSettings {
    let mut settings = ClientSettings::from_env();
    if let Some(api_url) = &cli.api_url {
        settings.api_url = api_url.trim_end_matches('/').to_string();
    }
    if let Some(database_url) = &cli.database_url {
        settings.database_url = database_url.clone();
    }
    if let Some(location) = &cli.location {
        settings.location = location.clone();
    }
    settings
}

fn source(settings: &ClientSettings) -> Result<Arc<dyn AqiSource>> {
    let source = HttpAqiSource::new(settings.api_url.clone(), settings.request_timeout)
        .context("failed to build AQI client")?;
    Ok(Arc::new(source))
}

async fn loaded_store(settings: &ClientSettings) -> Result<LocationStore> {
    let store = LocationStore::new(source(settings)?, settings.location.clone());
    store.load().await;
    Ok(store)
}

async fn show_aqi(settings: &ClientSettings) -> Result<()> {
    let store = loaded_store(settings).await?;
    let snapshot = store.snapshot();
    let reading = snapshot
        .reading
        .context("no reading after the initial load")?;
    let category = reading.category();

    println!("{}: AQI {} ({})", snapshot.location, reading.aqi, category.label());
    println!("  {}", category.description());
    if snapshot.origin == Some(DataOrigin::Fallback) {
        println!("  (backend unreachable, showing fallback values)");
    }
    println!(
        "  PM2.5 {}  PM10 {}  NO2 {}  SO2 {}  CO {}",
        reading.pm25, reading.pm10, reading.no2, reading.so2, reading.co
    );
    println!(
        "  sources: traffic {}%  industry {}%  stubble {}%  construction {}%",
        reading.sources.traffic,
        reading.sources.industry,
        reading.sources.stubble,
        reading.sources.construction
    );
    let outlook: Vec<String> = hourly_outlook(reading.aqi)
        .into_iter()
        .map(|(label, aqi)| format!("{label} {aqi}"))
        .collect();
    println!("  outlook: {}", outlook.join(" | "));

    let storage = Storage::new(&settings.database_url).await?;
    let profiles = ProfileStore::load(storage).await?;
    if asthma_alert(profiles.profile(), reading.aqi) {
        println!("\nCRITICAL ASTHMA ALERT: {ASTHMA_ALERT_TEXT}");
    }
    for group in advisory_groups() {
        println!("\n{}", group.title);
        for item in group.items {
            println!("  - {item}");
        }
    }
    Ok(())
}

async fn chat(settings: &ClientSettings, follow: bool) -> Result<()> {
    let source = source(settings)?;
    let store = LocationStore::new(source.clone(), settings.location.clone());
    store.load().await;
    let mut session = ChatSession::new(Dispatcher::new(source), &store.snapshot().location);
    if let Some(greeting) = session.turns().first() {
        println!("airguard> {}", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        let Some(reply) = session.send(line, &store.snapshot()).await else {
            continue;
        };
        println!("airguard> {}", reply.text);
        if follow {
            if let Some(target) = reply.target {
                store.adopt_reading(target);
            }
        }
    }

    let exchanged = session
        .turns()
        .iter()
        .filter(|turn| turn.sender == Sender::User)
        .count();
    tracing::debug!(exchanged, "chat closed");
    Ok(())
}

async fn wallet(settings: &ClientSettings, command: WalletCommand) -> Result<()> {
    let storage = Storage::new(&settings.database_url).await?;
    let mut wallet = EcoWallet::load(storage).await?;

    match command {
        WalletCommand::Show => {
            println!(
                "{} coins (worth ₹{:.2})",
                wallet.balance(),
                wallet.cash_value()
            );
            println!(
                "{:.0}% of the way to a free metro ride ({NEXT_REWARD_COINS} coins)",
                wallet.progress_to_next_reward() * 100.0
            );
        }
        WalletCommand::Earn { activity } => {
            let balance = wallet.earn(activity).await?;
            println!("+{} coins, balance {balance}", activity.reward());
        }
        WalletCommand::Redeem => {
            let redemption = wallet.redeem().await?;
            println!(
                "voucher {} issued, {} coins spent, balance {}",
                redemption.token, redemption.coins_spent, redemption.balance_after
            );
        }
        WalletCommand::History { limit } => {
            for entry in wallet.history(limit).await? {
                println!(
                    "{}  {}  -{} coins  balance {}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.token,
                    entry.coins_spent,
                    entry.balance_after
                );
            }
        }
    }
    Ok(())
}

async fn simulate(settings: &ClientSettings, controls: InterventionControls) -> Result<()> {
    let store = loaded_store(settings).await?;
    let snapshot = store.snapshot();
    println!(
        "{}: traffic {}%  industry {}%  stubble {}%",
        snapshot.location, controls.traffic, controls.industry, controls.stubble
    );
    for point in project_day(snapshot.reading.as_ref(), &controls) {
        println!(
            "{:>6}  baseline {:>4}  predicted {:>4}",
            point.label, point.baseline, point.predicted
        );
    }
    Ok(())
}

async fn profile(settings: &ClientSettings, command: ProfileCommand) -> Result<()> {
    let storage = Storage::new(&settings.database_url).await?;
    let mut profiles = ProfileStore::load(storage).await?;
    if let ProfileCommand::ToggleAsthma = command {
        profiles.toggle_asthma().await?;
    }
    let profile = profiles.profile();
    println!(
        "{}: asthma mode {}",
        profile.name,
        if profile.is_asthmatic { "on" } else { "off" }
    );
    Ok(())
}
