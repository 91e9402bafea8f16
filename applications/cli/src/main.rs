/// Cadence - headless audio player
use anyhow::{bail, Context};
use cadence_cli::{format::format_duration, CadenceConfig, Session};
use cadence_core::{RepeatMode, Theme};
use cadence_playback::Command;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence playlist manager and headless player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List playlists
    Playlists,
    /// Create an empty playlist
    Create { name: String },
    /// Rename a playlist
    Rename { old: String, new: String },
    /// Delete a playlist
    Delete { name: String },
    /// Make a playlist active
    Switch { name: String },
    /// Add audio files to the active playlist
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove a track (1-based position) from the active playlist
    Remove { position: usize },
    /// Remove every track from the active playlist
    Clear,
    /// List tracks of the active playlist
    List,
    /// Export a playlist as JSON
    Export {
        name: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a playlist exported earlier
    Import { file: PathBuf },
    /// Show or change settings
    Settings {
        #[arg(long, value_parser = parse_theme)]
        theme: Option<Theme>,
        #[arg(long, value_parser = parse_repeat)]
        repeat: Option<RepeatMode>,
        #[arg(long)]
        shuffle: Option<bool>,
        #[arg(long)]
        autoplay_next: Option<bool>,
        #[arg(long)]
        volume: Option<f32>,
    },
    /// Play through the active playlist without audio output
    Simulate {
        #[arg(long)]
        shuffle: bool,
        #[arg(long, value_parser = parse_repeat)]
        repeat: Option<RepeatMode>,
        /// Maximum number of tracks to visit
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CadenceConfig::load(cli.config.as_deref())?;
    config.validate()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut session = Session::open(&config)?;
    let outcome = run(&mut session, cli.command);
    session.close();
    outcome
}

fn run(session: &mut Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Playlists => print_playlists(session),
        Commands::Create { name } => {
            session.dispatch(Command::CreatePlaylist(name.clone()))?;
            println!("Created playlist \"{name}\"");
        }
        Commands::Rename { old, new } => {
            session.dispatch(Command::RenamePlaylist {
                from: old,
                to: new.clone(),
            })?;
            println!("Renamed to \"{new}\"");
        }
        Commands::Delete { name } => {
            session.dispatch(Command::DeletePlaylist(name.clone()))?;
            println!("Deleted playlist \"{name}\"");
        }
        Commands::Switch { name } => {
            session.dispatch(Command::SwitchPlaylist(name.clone()))?;
            println!("Active playlist: \"{name}\"");
        }
        Commands::Add { files } => {
            let report = session.add_paths(&files);
            println!(
                "Added {} track(s) to \"{}\"",
                report.added.len(),
                session.registry().active_name()
            );
            if !report.relinked.is_empty() {
                println!("Re-linked {} track(s)", report.relinked.len());
            }
        }
        Commands::Remove { position } => {
            if position == 0 || position > session.registry().active().len() {
                bail!("no track at position {position}");
            }
            session.dispatch(Command::Remove(position - 1))?;
            println!("Removed track {position}");
        }
        Commands::Clear => {
            session.dispatch(Command::Clear)?;
            println!("Cleared \"{}\"", session.registry().active_name());
        }
        Commands::List => print_tracks(session),
        Commands::Export { name, output } => {
            let bytes = session.export(&name)?;
            match output {
                Some(path) => {
                    fs::write(&path, &bytes)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported \"{name}\" to {}", path.display());
                }
                None => println!("{}", String::from_utf8_lossy(&bytes)),
            }
        }
        Commands::Import { file } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let name = session.import(&bytes)?;
            println!("Imported as \"{name}\"");
        }
        Commands::Settings {
            theme,
            repeat,
            shuffle,
            autoplay_next,
            volume,
        } => {
            if let Some(theme) = theme {
                session.set_theme(theme);
            }
            if let Some(mode) = repeat {
                session.dispatch(Command::SetRepeat(mode))?;
            }
            if let Some(enabled) = shuffle {
                session.controller_mut().set_shuffle(enabled);
                session.pump();
            }
            if let Some(enabled) = autoplay_next {
                session.dispatch(Command::SetAutoplayNext(enabled))?;
            }
            if let Some(level) = volume {
                session.dispatch(Command::SetVolume(level))?;
            }
            print_settings(session);
        }
        Commands::Simulate {
            shuffle,
            repeat,
            limit,
        } => {
            if shuffle && !session.controller().is_shuffled() {
                session.dispatch(Command::ToggleShuffle)?;
            }
            if let Some(mode) = repeat {
                session.dispatch(Command::SetRepeat(mode))?;
            }
            let visited = session.simulate(limit)?;
            let tracks = session.registry().active();
            for index in &visited {
                if let Some(track) = tracks.tracks.get(*index) {
                    println!("{:>3}. {} - {}", index + 1, track.artist, track.title);
                }
            }
            println!("Visited {} track(s)", visited.len());
        }
    }
    report_errors(session);
    Ok(())
}

fn print_playlists(session: &Session) {
    let registry = session.registry();
    for playlist in registry.iter() {
        let marker = if playlist.name == registry.active_name() {
            "*"
        } else {
            " "
        };
        println!("{marker} {} ({} tracks)", playlist.name, playlist.len());
    }
}

fn print_tracks(session: &Session) {
    let playlist = session.registry().active();
    if playlist.is_empty() {
        println!("\"{}\" is empty", playlist.name);
        return;
    }
    let current = session.controller().current_index();
    for (index, track) in playlist.tracks.iter().enumerate() {
        let marker = if current == Some(index) { ">" } else { " " };
        let playable = if track.has_source() { "" } else { "  (re-add file)" };
        println!(
            "{marker}{:>3}. {} - {}  [{}]{playable}",
            index + 1,
            track.artist,
            track.title,
            format_duration(track.duration_secs)
        );
    }
}

fn print_settings(session: &Session) {
    let settings = session.settings();
    println!("theme:         {}", settings.theme.as_str());
    println!("repeat:        {}", settings.repeat_mode);
    println!("shuffle:       {}", settings.shuffle);
    println!("autoplay next: {}", settings.autoplay_next);
    println!("volume:        {:.2}", settings.volume);
}

/// Print user-visible errors left by the last command
fn report_errors(session: &mut Session) {
    session.pump();
    for message in session.take_errors() {
        eprintln!("{message}");
    }
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::from_str(value).ok_or_else(|| format!("unknown theme '{value}' (auto, light, dark)"))
}

fn parse_repeat(value: &str) -> Result<RepeatMode, String> {
    RepeatMode::from_str(value)
        .ok_or_else(|| format!("unknown repeat mode '{value}' (none, all, one)"))
}
