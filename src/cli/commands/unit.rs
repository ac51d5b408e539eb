//! `plantree unit` command - Unit assignments and slot resolution

use chrono::{DateTime, Utc};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_time, parse_time, Listing, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::engine::catalog::find_unit;
use crate::engine::resolver::{
    assignment_history, default_unit_for_slot, locate_unit, resolve_unit_for_slot, slot_occupancy,
};
use crate::entities::project::Project;

#[derive(Subcommand, Debug)]
pub enum UnitCommands {
    /// Which unit occupies a slot (from the assignment ledger only)
    Resolve {
        assembly: String,
        slot: String,

        /// Point in time (default: now)
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },

    /// First compatible unit in the catalog, ignoring the ledger
    Default { assembly: String, slot: String },

    /// Assignment history of a slot, newest first
    History { assembly: String, slot: String },

    /// Every slot of an assembly with its current unit
    Occupancy {
        assembly: String,

        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },

    /// Put a unit into a slot
    Assign {
        assembly: String,
        slot: String,
        unit: String,

        /// When the unit was installed (default: now)
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,

        /// Mark the assignment as a manual correction
        #[arg(long)]
        custom: bool,
    },

    /// Where a unit is installed
    Locate {
        unit: String,

        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },
}

pub fn run(cmd: UnitCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        UnitCommands::Resolve { assembly, slot, at } => {
            let project = session.load_project()?;
            let at = at.unwrap_or_else(|| session.now());
            let unit_id = resolve_unit_for_slot(&project, &assembly, &slot, at)?;
            print_unit(&session, &project, unit_id);
            Ok(())
        }
        UnitCommands::Default { assembly, slot } => {
            let project = session.load_project()?;
            match default_unit_for_slot(&project, &assembly, &slot)? {
                Some(unit) => {
                    print_unit(&session, &project, &unit.id);
                    Ok(())
                }
                None => Err(miette::miette!(
                    "no unit in the catalog fits slot {} of {}",
                    slot,
                    assembly
                )),
            }
        }
        UnitCommands::History { assembly, slot } => run_history(&session, &assembly, &slot),
        UnitCommands::Occupancy { assembly, at } => run_occupancy(&session, &assembly, at),
        UnitCommands::Assign {
            assembly,
            slot,
            unit,
            at,
            custom,
        } => {
            let mut planner = session.planner()?;
            planner.assign_unit(&assembly, &slot, &unit, at, custom)?;
            if !session.quiet {
                println!(
                    "{} Assigned {} to {}/{}",
                    style("✓").green(),
                    style(&unit).cyan(),
                    assembly,
                    slot
                );
            }
            Ok(())
        }
        UnitCommands::Locate { unit, at } => {
            let project = session.load_project()?;
            let at = at.unwrap_or_else(|| session.now());
            match locate_unit(&project.assignments, &unit, at).and_then(|t| Some((t, t.slot_id()?))) {
                Some((target, slot_id)) => {
                    println!("{}\t{}", target.assembly_id, slot_id);
                    Ok(())
                }
                None => {
                    if !session.quiet {
                        println!("{} is not installed as of {}", style(&unit).cyan(), format_time(&at));
                    }
                    Ok(())
                }
            }
        }
    }
}

fn print_unit(session: &Session, project: &Project, unit_id: &str) {
    let name = find_unit(project, unit_id).map(|(_, u)| u.name.as_str());
    match (session.format, name) {
        (OutputFormat::Auto, Some(name)) if !session.quiet => {
            println!("{}\t{}", unit_id, name);
        }
        _ => println!("{}", unit_id),
    }
}

fn run_history(session: &Session, assembly: &str, slot: &str) -> Result<()> {
    let project = session.load_project()?;
    let mut listing = Listing::new(&["Unit", "Since", "Custom"]);
    for entry in assignment_history(&project.assignments, assembly, slot) {
        listing.row(vec![
            entry.unit_id.clone(),
            format_time(&entry.date_time),
            if entry.custom { "yes".to_string() } else { String::new() },
        ]);
    }
    listing.print(session.format_or(OutputFormat::Tsv))
}

fn run_occupancy(session: &Session, assembly: &str, at: Option<DateTime<Utc>>) -> Result<()> {
    let project = session.load_project()?;
    let at = at.unwrap_or_else(|| session.now());
    let mut listing = Listing::new(&["Slot", "Name", "Component Type", "Unit"]);
    for entry in slot_occupancy(&project, assembly, at)? {
        listing.row(vec![
            entry.slot.id.clone(),
            entry.slot.name.clone(),
            entry.slot.component_type_id.clone(),
            entry.unit_id.unwrap_or("-").to_string(),
        ]);
    }
    listing.print(session.format_or(OutputFormat::Tsv))
}
