//! `stargaze`: terminal client for a Stargaze server.
//!
//! # Usage
//!
//! ```text
//! stargaze view --sky climate-week
//! stargaze record --sky climate-week --action march --name Ada
//! stargaze stats --sky climate-week --url http://localhost:8420
//! ```

mod app;
mod client;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, DisableMouseCapture, EnableMouseCapture, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use stargaze_core::participation::NewParticipation;
use stargaze_field::{ReseedPolicy, refresh::DEFAULT_REFRESH_INTERVAL};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Target time per animation frame (~30 fps).
const FRAME: Duration = Duration::from_millis(33);

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "stargaze", about = "Watch and feed a Stargaze sky from the terminal")]
struct Args {
  /// Path to a TOML config file (url, sky, refresh_secs).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the stargaze server (default: http://localhost:8420).
  #[arg(long, env = "STARGAZE_URL", global = true)]
  url: Option<String>,

  /// Sky to work with.
  #[arg(long, env = "STARGAZE_SKY", global = true)]
  sky: Option<String>,

  /// Write logs to this file. Nothing is logged otherwise.
  #[arg(long, value_name = "FILE", global = true)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the animated sky.
  View {
    /// Seconds between refreshes.
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Keep stars in place across refreshes instead of regenerating.
    #[arg(long)]
    preserve: bool,
  },
  /// Record one participation and print the new totals.
  Record {
    /// Action key from the sky's registry.
    #[arg(long)]
    action: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    comment: Option<String>,
  },
  /// Print the sky's totals.
  Stats,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  sky:          String,
  #[serde(default)]
  refresh_secs: Option<u64>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_file_logging(path)?;
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8420".to_string()),
  };
  let sky = args
    .sky
    .or_else(|| (!file_cfg.sky.is_empty()).then(|| file_cfg.sky.clone()))
    .context("no sky given; pass --sky or set `sky` in the config file")?;

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::View { refresh_secs, preserve } => {
      let every = refresh_secs
        .or(file_cfg.refresh_secs)
        .map_or(DEFAULT_REFRESH_INTERVAL, Duration::from_secs);
      let policy = if preserve { ReseedPolicy::Preserve } else { ReseedPolicy::Regenerate };
      view(App::new(client, &sky, every, policy)).await
    }
    Command::Record { action, name, email, comment } => {
      let mut input = NewParticipation::new(&sky, action);
      input.name = name;
      input.email = email;
      input.comment = comment;
      let stats = client.record(&input).await?;
      println!("recorded · {} stars from {} actions", stats.total_stars, stats.total_actions);
      Ok(())
    }
    Command::Stats => {
      let stats = client.stats(&sky).await?;
      println!(
        "{}: {} stars from {} actions (updated {})",
        stats.sky_id,
        stats.total_stars,
        stats.total_actions,
        stats.updated_at.to_rfc3339(),
      );
      Ok(())
    }
  }
}

/// Send logs to `path`; the terminal belongs to the UI.
fn init_file_logging(path: &Path) -> Result<()> {
  let file = File::create(path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

async fn view(mut app: App) -> Result<()> {
  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let run_result = match Terminal::new(backend).context("creating terminal") {
    Ok(mut terminal) => {
      let result = run_event_loop(&mut terminal, &mut app).await;
      execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
      terminal.show_cursor().ok();
      result
    }
    Err(e) => {
      execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture).ok();
      Err(e)
    }
  };

  // Restore terminal regardless of result.
  disable_raw_mode().ok();

  app.shutdown().await;
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.sync();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(FRAME)? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) => {
        if !app.handle_key(key) {
          break;
        }
      }
      Some(Event::Mouse(mouse)) => app.handle_mouse(mouse),
      // The sky is resized on the next draw.
      _ => {}
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn config_file_fields_are_optional() {
    let cfg: ConfigFile = toml::from_str("sky = \"demo\"").unwrap();
    assert_eq!(cfg.sky, "demo");
    assert!(cfg.url.is_empty());
    assert_eq!(cfg.refresh_secs, None);
  }

  #[test]
  fn subcommands_parse_with_global_flags() {
    let args = Args::try_parse_from([
      "stargaze", "record", "--sky", "demo", "--action", "march", "--name", "Ada",
    ])
    .unwrap();
    assert_eq!(args.sky.as_deref(), Some("demo"));
    assert!(matches!(args.command, Command::Record { ref action, .. } if action == "march"));
  }
}
