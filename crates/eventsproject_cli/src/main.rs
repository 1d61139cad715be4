//! Command-line front end for the event services core.
//!
//! # Responsibility
//! - Map subcommands onto `EventService` operations over one SQLite file.
//! - Print results as JSON; keep all decision logic in `eventsproject_core`.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use eventsproject_core::db::open_db;
use eventsproject_core::{
    default_log_level, init_logging, sqlite_event_service, Event, EventRepository, EventId,
    Logistics, LoggingConfig, OrganizerFilter, Participant, ParticipantId, Role,
    SqliteEventRepository,
};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "eventsproject",
    about = "Manage participants, events and logistics",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// SQLite database file (created and migrated on first use).
    #[arg(long, global = true, default_value = "eventsproject.sqlite3")]
    db: PathBuf,
    /// Log level: trace, debug, info, warn or error.
    #[arg(long, global = true, default_value_t = default_log_level().to_string())]
    log_level: String,
    /// Directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a participant.
    AddParticipant {
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        first_name: String,
        /// ORGANIZER, SPEAKER or GUEST.
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },
    /// Create an event with zero cost.
    AddEvent {
        /// Unique description, also used to attach logistics.
        #[arg(long)]
        description: String,
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: NaiveDate,
        /// End date (YYYY-MM-DD). Defaults to the start date.
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Link one participant to an event.
    Assign {
        #[arg(long)]
        event_id: EventId,
        #[arg(long)]
        participant_id: ParticipantId,
    },
    /// Re-resolve and persist every participant already on an event.
    SyncParticipants {
        #[arg(long)]
        event_id: EventId,
    },
    /// Attach a logistics item to the event with the given description.
    AttachLogistics {
        /// Exact description of the owning event.
        #[arg(long)]
        event: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        unit_price: Decimal,
        #[arg(long)]
        quantity: u32,
        /// Mark the item as reserved (billed).
        #[arg(long, action = ArgAction::SetTrue)]
        reserved: bool,
    },
    /// List reserved logistics of events starting within a date range.
    Logistics {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Recompute cost of events run by the given participant.
    RecomputeCosts {
        #[arg(long, default_value = "Tounsi")]
        last_name: String,
        #[arg(long, default_value = "Ahmed")]
        first_name: String,
        #[arg(long, value_parser = parse_role, default_value = "ORGANIZER")]
        role: Role,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let log_dir = if log_dir.is_absolute() {
            log_dir.clone()
        } else {
            std::env::current_dir()
                .context("failed to resolve current directory")?
                .join(log_dir)
        };
        init_logging(&LoggingConfig {
            level: cli.log_level.clone(),
            log_dir,
            echo_to_stderr: true,
        })
        .map_err(|err| anyhow!(err))?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let service = sqlite_event_service(&conn)?;
    let events = SqliteEventRepository::try_new(&conn)?;
    let load_event = |id: EventId| -> Result<Event> {
        events
            .find_by_id(id)?
            .ok_or_else(|| anyhow!("event not found: {id}"))
    };

    match cli.command {
        Commands::AddParticipant {
            last_name,
            first_name,
            role,
        } => print_json(&service.add_participant(&Participant::new(last_name, first_name, role))?),
        Commands::AddEvent {
            description,
            start,
            end,
        } => print_json(&events.save(&Event::new(description, start, end.unwrap_or(start)))?),
        Commands::Assign {
            event_id,
            participant_id,
        } => print_json(&service.assign_participant(load_event(event_id)?, participant_id)?),
        Commands::SyncParticipants { event_id } => {
            print_json(&service.sync_event_participants(load_event(event_id)?)?)
        }
        Commands::AttachLogistics {
            event,
            description,
            unit_price,
            quantity,
            reserved,
        } => {
            let item = Logistics::new(description, reserved, unit_price, quantity);
            print_json(&service.attach_logistics(item, &event)?)
        }
        Commands::Logistics { from, to } => {
            print_json(&service.reserved_logistics_between(from, to)?)
        }
        Commands::RecomputeCosts {
            last_name,
            first_name,
            role,
        } => {
            let updated =
                service.recompute_costs(&OrganizerFilter::new(last_name, first_name, role))?;
            info!("event=cli_recompute module=cli status=ok events={}", updated.len());
            print_json(&updated)
        }
    }
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| format!("unknown role `{value}`; expected ORGANIZER|SPEAKER|GUEST"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
