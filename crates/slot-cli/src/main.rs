//! `slots` CLI — compute bookable appointment slots from provider availability.
//!
//! Availability is read as a JSON array of storage rows
//! (`{provider_id, day_of_week, start_time, end_time, is_active}`) from a file
//! or stdin. Results are written to stdout as JSON; logs go to stderr.
//!
//! ## Usage
//!
//! ```sh
//! # Slots offered on a date (50-minute sessions by default)
//! slots generate -i availability.json --date 2026-03-16
//!
//! # Only sessions that fit entirely inside their window
//! slots generate -i availability.json --date 2026-03-16 --boundary fit-within-window
//!
//! # Next opening within the next 30 days, in a given zone
//! slots next -i availability.json --timezone Europe/Berlin
//!
//! # Which dates a date picker should enable
//! slots calendar -i availability.json --today 2026-03-16
//!
//! # Providers ordered by next availability
//! slots directory -i availability.json --from 2026-03-16T08:00:00Z
//!
//! # Calendar-feed occurrences of every active window
//! slots occurrences -i availability.json --timezone America/New_York --count 4
//!
//! # Load session length and horizons from a config file
//! slots --config scheduling.json generate -i availability.json --date 2026-03-16
//! ```

use std::fmt::Display;
use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use slot_engine::window::group_by_provider;
use slot_engine::{AvailabilityWindow, SchedulingConfig, SessionPolicy, SlotBoundary};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Compute bookable appointment slots from weekly provider availability"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scheduling config JSON (session length, slot boundary, horizons)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the session start times offered on a date
    Generate {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Session length in minutes (overrides config)
        #[arg(long)]
        duration: Option<u32>,
        /// start-before-end or fit-within-window (overrides config)
        #[arg(long)]
        boundary: Option<String>,
        /// Only consider windows of this provider
        #[arg(long)]
        provider: Option<String>,
        /// Drop slots at or before this instant (RFC 3339)
        #[arg(long)]
        after: Option<String>,
        /// IANA timezone for --after (host zone if omitted)
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Find the next opening within the horizon
    Next {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Scan start (RFC 3339); defaults to now
        #[arg(long)]
        from: Option<String>,
        /// Days to scan (overrides config)
        #[arg(long)]
        horizon: Option<u32>,
        /// IANA timezone (host zone if omitted)
        #[arg(long)]
        timezone: Option<String>,
        /// Consider every stepped slot, not only window openings
        #[arg(long)]
        every_slot: bool,
    },
    /// Check whether a date picker should enable a date
    Selectable {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Date to check (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Today's date (YYYY-MM-DD); defaults to the host's local date
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Days ahead the picker allows (overrides config)
        #[arg(long)]
        horizon: Option<u32>,
        /// Session length in minutes (overrides config)
        #[arg(long)]
        duration: Option<u32>,
        /// start-before-end or fit-within-window (overrides config)
        #[arg(long)]
        boundary: Option<String>,
    },
    /// List every selectable date within the picker horizon
    Calendar {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Today's date (YYYY-MM-DD); defaults to the host's local date
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Days ahead the picker allows (overrides config)
        #[arg(long)]
        horizon: Option<u32>,
        /// Session length in minutes (overrides config)
        #[arg(long)]
        duration: Option<u32>,
        /// start-before-end or fit-within-window (overrides config)
        #[arg(long)]
        boundary: Option<String>,
    },
    /// Rank providers by their next opening
    Directory {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Scan start (RFC 3339); defaults to now
        #[arg(long)]
        from: Option<String>,
        /// Days to scan (overrides config)
        #[arg(long)]
        horizon: Option<u32>,
        /// IANA timezone (host zone if omitted)
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Expand active windows into concrete calendar occurrences
    Occurrences {
        /// Availability JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// IANA timezone the windows are expressed in
        #[arg(long)]
        timezone: String,
        /// First date to consider (YYYY-MM-DD); defaults to the host's local date
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Occurrences per window
        #[arg(long, default_value_t = 4)]
        count: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "scheduling config loaded");

    let output = match cli.command {
        Commands::Generate {
            input,
            date,
            duration,
            boundary,
            provider,
            after,
            timezone,
        } => {
            let mut windows = read_windows(input.as_deref())?;
            if let Some(provider) = provider {
                windows.retain(|w| w.provider_id == provider);
            }
            let policy = session_policy(&config, duration, boundary.as_deref())?;

            match after {
                Some(after) => match parse_zone(timezone.as_deref())? {
                    Some(tz) => upcoming(&windows, date, &policy, &resolve_instant(&tz, Some(after.as_str()))?),
                    None => upcoming(&windows, date, &policy, &resolve_instant(&Local, Some(after.as_str()))?),
                },
                None => {
                    let slots: Vec<String> = slot_engine::generate_slots(&windows, date, &policy)
                        .iter()
                        .map(|t| t.to_string())
                        .collect();
                    json!({
                        "date": date,
                        "duration_minutes": policy.duration_minutes,
                        "slots": slots,
                    })
                }
            }
        }
        Commands::Next {
            input,
            from,
            horizon,
            timezone,
            every_slot,
        } => {
            let windows = read_windows(input.as_deref())?;
            let horizon = horizon.unwrap_or(config.next_available_horizon_days);
            let policy = every_slot.then_some(config.session);

            match parse_zone(timezone.as_deref())? {
                Some(tz) => next(&windows, &resolve_instant(&tz, from.as_deref())?, horizon, policy),
                None => next(&windows, &resolve_instant(&Local, from.as_deref())?, horizon, policy),
            }
        }
        Commands::Selectable {
            input,
            date,
            today,
            horizon,
            duration,
            boundary,
        } => {
            let windows = read_windows(input.as_deref())?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let horizon = horizon.unwrap_or(config.date_picker_horizon_days);
            let policy = session_policy(&config, duration, boundary.as_deref())?;

            json!({
                "date": date,
                "selectable": slot_engine::is_date_selectable(&windows, date, today, horizon, &policy),
            })
        }
        Commands::Calendar {
            input,
            today,
            horizon,
            duration,
            boundary,
        } => {
            let windows = read_windows(input.as_deref())?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let horizon = horizon.unwrap_or(config.date_picker_horizon_days);
            let policy = session_policy(&config, duration, boundary.as_deref())?;

            json!({
                "today": today,
                "horizon_days": horizon,
                "dates": slot_engine::selectable_dates(&windows, today, horizon, &policy),
            })
        }
        Commands::Directory {
            input,
            from,
            horizon,
            timezone,
        } => {
            let windows = read_windows(input.as_deref())?;
            let horizon = horizon.unwrap_or(config.next_available_horizon_days);

            match parse_zone(timezone.as_deref())? {
                Some(tz) => directory(windows, &resolve_instant(&tz, from.as_deref())?, horizon),
                None => directory(windows, &resolve_instant(&Local, from.as_deref())?, horizon),
            }
        }
        Commands::Occurrences {
            input,
            timezone,
            from,
            count,
        } => {
            let windows = read_windows(input.as_deref())?;
            let from = from.unwrap_or_else(|| Local::now().date_naive());

            let mut occurrences = Vec::new();
            for window in windows.iter().filter(|w| w.is_active) {
                occurrences.extend(
                    slot_engine::window_occurrences(window, from, &timezone, count)
                        .context("Failed to expand availability window")?,
                );
            }
            occurrences.sort_by_key(|o| o.start);
            serde_json::to_value(&occurrences)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Load the scheduling config file, or the defaults when none is given.
fn load_config(path: Option<&str>) -> Result<SchedulingConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            SchedulingConfig::from_json(&json)
                .with_context(|| format!("Invalid config file: {}", path))
        }
        None => Ok(SchedulingConfig::default()),
    }
}

/// Config session policy with command-line overrides applied.
fn session_policy(
    config: &SchedulingConfig,
    duration: Option<u32>,
    boundary: Option<&str>,
) -> Result<SessionPolicy> {
    let mut policy = config.session;
    if let Some(minutes) = duration {
        anyhow::ensure!(minutes > 0, "--duration must be at least one minute");
        policy.duration_minutes = minutes;
    }
    if let Some(raw) = boundary {
        policy.boundary = raw.parse::<SlotBoundary>()?;
    }
    Ok(policy)
}

/// `None` means the host's local zone.
fn parse_zone(timezone: Option<&str>) -> Result<Option<chrono_tz::Tz>> {
    timezone
        .map(|name| {
            name.parse::<chrono_tz::Tz>()
                .map_err(|_| anyhow::anyhow!("Unknown timezone: '{}'", name))
        })
        .transpose()
}

/// Parse an RFC 3339 instant into `tz`, or read the host clock when absent.
fn resolve_instant<Tz: TimeZone>(tz: &Tz, raw: Option<&str>) -> Result<DateTime<Tz>> {
    match raw {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid RFC 3339 instant: {}", raw))?
            .with_timezone(tz)),
        None => Ok(Utc::now().with_timezone(tz)),
    }
}

fn upcoming<Tz>(
    windows: &[AvailabilityWindow],
    date: NaiveDate,
    policy: &SessionPolicy,
    after: &DateTime<Tz>,
) -> Value
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = after.timezone();
    let slots: Vec<Value> = slot_engine::upcoming_slots(windows, date, policy, after)
        .into_iter()
        .map(|slot| {
            json!({
                "provider_id": slot.provider_id,
                "start_time": slot.start_time,
                "starts_at": slot.starts_at(&tz).map(|dt| dt.to_rfc3339()),
            })
        })
        .collect();

    json!({
        "date": date,
        "duration_minutes": policy.duration_minutes,
        "after": after.to_rfc3339(),
        "slots": slots,
    })
}

fn next<Tz>(
    windows: &[AvailabilityWindow],
    from: &DateTime<Tz>,
    horizon: u32,
    every_slot: Option<SessionPolicy>,
) -> Value
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match every_slot {
        Some(policy) => {
            let slot = slot_engine::find_next_slot(windows, from, horizon, &policy);
            json!({
                "from": from.to_rfc3339(),
                "horizon_days": horizon,
                "next_slot": slot,
            })
        }
        None => {
            let next = slot_engine::find_next_available(windows, from, horizon);
            json!({
                "from": from.to_rfc3339(),
                "horizon_days": horizon,
                "next_available": next.map(|dt| dt.to_rfc3339()),
            })
        }
    }
}

fn directory<Tz>(windows: Vec<AvailabilityWindow>, from: &DateTime<Tz>, horizon: u32) -> Value
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let grouped = group_by_provider(windows);
    let ranked = slot_engine::rank_by_next_available(
        grouped.iter().map(|(id, ws)| (id.as_str(), ws.as_slice())),
        from,
        horizon,
    );

    Value::Array(
        ranked
            .into_iter()
            .map(|row| {
                json!({
                    "provider_id": row.provider_id,
                    "next_available": row.next_available.map(|dt| dt.to_rfc3339()),
                })
            })
            .collect(),
    )
}

fn read_windows(path: Option<&str>) -> Result<Vec<AvailabilityWindow>> {
    let json = read_input(path)?;
    slot_engine::parse_windows_json(&json).context("Failed to parse availability JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
