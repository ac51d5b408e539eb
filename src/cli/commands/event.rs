//! `plantree event` command - Maintenance events

use chrono::{DateTime, Utc};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_time, parse_time, Listing, Session};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// Record maintenance on a slot; the unit comes from the ledger
    New {
        assembly: String,
        slot: String,

        /// Maintenance type id (must belong to the unit's part model)
        #[arg(long, short = 't')]
        mtype: String,

        /// Start of the work (default: now)
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,

        /// Record as planned work rather than an ad-hoc event
        #[arg(long)]
        scheduled: bool,
    },

    /// List recorded events
    List {
        /// Only events on this assembly
        #[arg(long)]
        assembly: Option<String>,

        /// Only events on this unit
        #[arg(long)]
        unit: Option<String>,
    },
}

pub fn run(cmd: EventCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        EventCommands::New {
            assembly,
            slot,
            mtype,
            at,
            scheduled,
        } => {
            let mut planner = session.planner()?;
            let (event, _) = planner.new_event_for_slot(&assembly, &slot, &mtype, at, !scheduled)?;

            if session.format == OutputFormat::Id || session.quiet {
                println!("{}", event.event_id);
                return Ok(());
            }
            println!(
                "{} Recorded {} on {} ({}/{})",
                style("✓").green(),
                style(&event.event_id).cyan(),
                style(&event.unit_id).cyan(),
                assembly,
                slot
            );
            if event.default_unit {
                println!(
                    "  {} slot has no assignment yet; used the first compatible unit",
                    style("!").yellow()
                );
            }
            Ok(())
        }
        EventCommands::List { assembly, unit } => {
            let project = session.load_project()?;
            let mut listing = Listing::new(&["ID", "Type", "Unit", "Assembly", "Slot", "Start", "Custom"]);
            let events = project.maintenance_events.iter().filter(|e| {
                assembly
                    .as_deref()
                    .map_or(true, |a| e.component_of_assembly.assembly_id == a)
                    && unit.as_deref().map_or(true, |u| e.unit_id == u)
            });
            for event in events {
                listing.row(vec![
                    event.id.clone(),
                    event.maintenance_type_id.clone(),
                    event.unit_id.clone(),
                    event.component_of_assembly.assembly_id.clone(),
                    event.component_of_assembly.slot_id().unwrap_or("").to_string(),
                    format_time(&event.date_time),
                    if event.custom { "yes".to_string() } else { String::new() },
                ]);
            }
            listing.print(session.format_or(OutputFormat::Tsv))
        }
    }
}
