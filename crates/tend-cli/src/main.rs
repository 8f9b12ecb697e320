//! `tend` — command-line client for the Tend habit tracker.
//!
//! # Usage
//!
//! ```
//! tend register ada@example.com
//! tend add Read --description "Twenty pages before bed" --category learning
//! tend done 7b1c…
//! tend list
//! tend show 7b1c… --month 2024-03
//! ```
//!
//! The server URL and the session token live in a small TOML config file
//! (`~/.config/tend/config.toml` by default); `register` and `login` write
//! it, `logout` clears the token.

mod client;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike as _, Local};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::{Deserialize, Serialize};
use tend_core::{habit::HabitDraft, tracker};
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tend", about = "Command-line client for the Tend habit tracker")]
struct Args {
  /// Path to the TOML config file (default: ~/.config/tend/config.toml).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the tend server (default: http://localhost:4000).
  #[arg(long, env = "TEND_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create an account and sign in (password read from stdin).
  Register { email: String },
  /// Sign in (password read from stdin).
  Login { email: String },
  /// Revoke the current session.
  Logout,
  /// Show the signed-in account.
  Whoami,
  /// List habits with streaks and completion rates.
  List,
  /// Create a habit.
  Add {
    title: String,
    #[arg(short, long)]
    description: String,
    #[arg(short, long, default_value = "daily")]
    frequency: String,
    #[arg(long, default_value = "general")]
    category: String,
    #[arg(long, default_value = "#10b981")]
    color: String,
  },
  /// Edit a habit; omitted flags keep their current value.
  Edit {
    id: Uuid,
    #[arg(long)]
    title: Option<String>,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(short, long)]
    frequency: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    color: Option<String>,
  },
  /// Mark a habit done (default: today).
  Done {
    id: Uuid,
    /// Day to mark, YYYY-MM-DD.
    #[arg(long)]
    date: Option<String>,
  },
  /// Unmark a completion (default: today).
  Undo {
    id: Uuid,
    /// Day to unmark, YYYY-MM-DD.
    #[arg(long)]
    date: Option<String>,
  },
  /// Show one habit with stats and a month calendar.
  Show {
    id: Uuid,
    /// Month to display, YYYY-MM (default: the current month).
    #[arg(long)]
    month: Option<String>,
  },
  /// Delete a habit and its completion history.
  Rm { id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the TOML config file: server URL plus the saved session token.
#[derive(Serialize, Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

fn config_path(args: &Args) -> Result<PathBuf> {
  if let Some(path) = &args.config {
    return Ok(path.clone());
  }
  let base = dirs::config_dir().context("no config directory on this platform")?;
  Ok(base.join("tend").join("config.toml"))
}

fn load_config(path: &Path) -> Result<ConfigFile> {
  if !path.exists() {
    return Ok(ConfigFile::default());
  }
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let raw = toml::to_string_pretty(config).context("serialising config")?;
  std::fs::write(path, raw)
    .with_context(|| format!("writing config file {}", path.display()))?;
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let path = config_path(&args)?;
  let mut file_cfg = load_config(&path)?;

  // CLI flags override the config file, which overrides defaults.
  let base_url = args
    .url
    .clone()
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:4000".to_string());
  let token = (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone());

  let client = ApiClient::new(ApiConfig { base_url: base_url.clone(), token })?;

  match args.command {
    Command::Register { email } => {
      let password = read_password()?;
      let session = client.register(&email, &password).await?;
      file_cfg.url = base_url;
      file_cfg.token = session.token;
      save_config(&path, &file_cfg)?;
      println!("Registered {} and signed in.", session.user.email);
    }

    Command::Login { email } => {
      let password = read_password()?;
      let session = client.login(&email, &password).await?;
      file_cfg.url = base_url;
      file_cfg.token = session.token;
      save_config(&path, &file_cfg)?;
      println!("Signed in as {}.", session.user.email);
    }

    Command::Logout => {
      client.signed_in()?;
      client.logout().await?;
      file_cfg.token = String::new();
      save_config(&path, &file_cfg)?;
      println!("Signed out.");
    }

    Command::Whoami => {
      client.signed_in()?;
      let user = client.me().await?;
      println!("{} ({})", user.email, user.id);
    }

    Command::List => {
      client.signed_in()?;
      let habits = client.list_habits().await?;
      if habits.is_empty() {
        println!("No habits yet. Create one with `tend add`.");
        return Ok(());
      }

      let today = Local::now().date_naive();
      let mut summaries = Vec::with_capacity(habits.len());
      for habit in habits {
        let days = client.completions(habit.id).await?;
        summaries.push(output::HabitSummary {
          today:  tracker::completed_on(&days, today),
          streak: tracker::current_streak(&days, today),
          rate:   tracker::completion_rate(
            &days,
            tracker::DEFAULT_RATE_WINDOW,
            today,
          )?,
          habit,
        });
      }
      println!("{}", output::habit_table(&summaries));
    }

    Command::Add { title, description, frequency, category, color } => {
      client.signed_in()?;
      let habit = client
        .create_habit(&HabitDraft {
          title,
          description,
          frequency,
          category,
          color,
        })
        .await?;
      println!("Created \"{}\" ({}).", habit.title, habit.id);
    }

    Command::Edit { id, title, description, frequency, category, color } => {
      client.signed_in()?;
      let current = client.get_habit(id).await?;
      let draft = HabitDraft {
        title:       title.unwrap_or(current.title),
        description: description.unwrap_or(current.description),
        frequency:   frequency
          .unwrap_or_else(|| current.frequency.as_str().to_string()),
        category:    category.unwrap_or(current.category),
        color:       color.unwrap_or_else(|| current.color.as_str().to_string()),
      };
      let habit = client.update_habit(id, &draft).await?;
      println!("Updated \"{}\".", habit.title);
    }

    Command::Done { id, date } => {
      client.signed_in()?;
      let date = date.unwrap_or_else(today_string);
      let days = client.add_completion(id, &date).await?;
      println!("Marked {date}. {} days on record.", days.len());
    }

    Command::Undo { id, date } => {
      client.signed_in()?;
      let date = date.unwrap_or_else(today_string);
      let days = client.remove_completion(id, &date).await?;
      println!("Unmarked {date}. {} days on record.", days.len());
    }

    Command::Show { id, month } => {
      client.signed_in()?;
      let habit = client.get_habit(id).await?;
      let days = client.completions(id).await?;
      let stats = client.stats(id).await?;

      let today = Local::now().date_naive();
      let (year, month) = match month {
        Some(raw) => parse_month(&raw)?,
        None => (today.year(), today.month()),
      };

      print!("{}", output::habit_details(&habit, &stats));
      println!();
      print!("{}", output::month_view(&days, year, month, today)?);
    }

    Command::Rm { id } => {
      client.signed_in()?;
      client.delete_habit(id).await?;
      println!("Deleted habit {id}.");
    }
  }

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Read a password from stdin. Plain line input; the terminal echoes.
fn read_password() -> Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

fn today_string() -> String {
  Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM` month argument.
fn parse_month(raw: &str) -> Result<(i32, u32)> {
  let (year, month) = raw
    .split_once('-')
    .with_context(|| format!("expected YYYY-MM, got {raw:?}"))?;
  let year = year.parse().with_context(|| format!("bad year in {raw:?}"))?;
  let month = month
    .parse()
    .with_context(|| format!("bad month in {raw:?}"))?;
  Ok((year, month))
}
