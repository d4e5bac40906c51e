use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cafetunes::genre::GENRES;
use cafetunes::{
    Config, Effect, Event, FoursquareClient, LatLng, Location, Session, SpotifyClient,
};

#[derive(Parser)]
#[command(name = "cafetunes")]
#[command(about = "Coffee shops near you, with a playlist to match")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find coffee shops around a place and pick playlists for a genre
    Discover {
        /// Address of the place
        #[arg(long)]
        address: String,

        /// Latitude of the place
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude of the place
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Display name of the place (defaults to the address)
        #[arg(long)]
        name: Option<String>,

        /// Genre to pick playlists from
        #[arg(long)]
        genre: String,

        /// How many playlists to pick
        #[arg(long, default_value_t = 1)]
        playlists: usize,

        /// Print effects as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// List the genre catalogue
    Genres,

    /// Show setup guide
    Setup,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Discover {
            address,
            lat,
            lng,
            name,
            genre,
            playlists,
            json,
        } => {
            let name = name.unwrap_or_else(|| address.clone());
            let location = Location::new(LatLng::new(lat, lng), address, name);
            discover(location, &genre, playlists, json).await?;
        }
        Commands::Genres => {
            list_genres();
        }
        Commands::Setup => {
            show_setup_guide();
        }
    }

    Ok(())
}

async fn discover(location: Location, genre: &str, playlists: usize, json: bool) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "Missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Run `cafetunes setup` to see how to configure credentials.".yellow()
        );
        std::process::exit(1);
    }

    let mut session = Session::new(
        SpotifyClient::new(&config),
        FoursquareClient::new(&config),
        &config.embed_theme,
    );

    session
        .authorize()
        .await
        .context("Failed to authorize with Spotify")?;

    let mut events = vec![
        Event::PlaceSelected(location),
        Event::GenreChosen(genre.to_string()),
        Event::SubmitMusic,
    ];
    events.extend(std::iter::repeat_n(Event::NewPlaylist, playlists.saturating_sub(1)));

    let spinner_style = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?;

    for event in events {
        let spinner = (!json && event == Event::SubmitMusic).then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(spinner_style.clone());
            pb.set_message("Brewing results...");
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let effects = session.handle(event).await?;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        for effect in &effects {
            if json {
                println!("{}", serde_json::to_string(effect)?);
            } else {
                print_effect(effect);
            }
        }

        if effects
            .iter()
            .any(|e| matches!(e, Effect::Notice { .. } | Effect::LoadFailed { .. }))
        {
            std::process::exit(1);
        }

        // Let a page refill finish before handing out the next playlist.
        session.rotator().settle().await;
    }

    Ok(())
}

fn print_effect(effect: &Effect) {
    match effect {
        Effect::Notice { title, text } => {
            println!("{} {}", format!("{}:", title).red().bold(), text);
        }
        Effect::MapTitle { text } => {
            println!("{}", text.cyan().bold());
            println!("{}", "=".repeat(50));
        }
        Effect::GenreSelected { genre } => {
            println!("Genre: {}", genre.green());
        }
        Effect::LoadFailed { reason } => {
            println!("{} {}", "Could not load results:".red(), reason);
        }
        Effect::RenderMap { center, zoom, shops } => {
            println!(
                "\n{}",
                format!("{} coffee shops around {} (zoom {})", shops.len(), center, zoom).cyan()
            );
            for (i, shop) in shops.iter().enumerate() {
                println!("{:2}. {}", i + 1, shop.name.green());
                if let Some(address) = &shop.address {
                    println!("     {}", address);
                }
                if let Some(phone) = &shop.phone {
                    println!("     {}", phone);
                }
                if let Some(website) = &shop.website {
                    println!("     {}", website.blue());
                }
            }
        }
        Effect::EmbedPlaylist { uri, src } => {
            println!("\n{} {}", "Playlist:".yellow().bold(), uri);
            println!("     {}", src);
        }
        // Layout-only effects have nothing to show in a terminal.
        Effect::ShowMusic
        | Effect::ShowResults
        | Effect::ScrollTo { .. }
        | Effect::ShowLoading
        | Effect::HideLoading
        | Effect::ClearMap => {}
    }
}

fn list_genres() {
    println!("{}", "Genres".cyan().bold());
    println!("{}", "=".repeat(50));

    for genre in GENRES {
        println!("  {:<18} {}", genre.id.green(), genre.name);
    }

    println!(
        "\n{}",
        "Any other Spotify category id is passed through as-is.".yellow()
    );
}

fn show_setup_guide() {
    println!("{}", "cafetunes Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Spotify API Setup".yellow());
    println!("   - Go to https://developer.spotify.com/dashboard/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");

    println!("\n{}", "2. Foursquare API Setup".yellow());
    println!("   - Go to https://foursquare.com/developers/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");

    println!("\n{}", "3. Configuration".yellow());
    println!("   - Create a .env file with:");
    println!("     SPOTIFY_CLIENT_ID=your_spotify_client_id");
    println!("     SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
    println!("     FOURSQUARE_CLIENT_ID=your_foursquare_client_id");
    println!("     FOURSQUARE_CLIENT_SECRET=your_foursquare_client_secret");
    println!("   - Optional:");
    println!("     SPOTIFY_TOKEN_PROXY_URL=https://proxy.hackeryou.com");
    println!("     SPOTIFY_PLAYLIST_LIMIT=10");
    println!("     SPOTIFY_EMBED_THEME=white");

    println!("\n{}", "4. Usage".yellow());
    println!("   - cafetunes genres");
    println!("   - cafetunes discover --address \"Toronto, ON\" \\");
    println!("       --lat 43.6532 --lng -79.3832 --genre jazz");
    println!("   - cafetunes discover ... --playlists 5   (rotate through playlists)");

    println!("\n{}", "Grab a coffee!".green());
}
