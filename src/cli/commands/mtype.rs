//! `plantree mtype` command - Maintenance type catalog of a part model

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{Listing, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::error::CoreError;
use crate::core::identity::EntityPrefix;
use crate::engine::hierarchy::{
    count_maintenance_types, find_maintenance_type, flatten_maintenance_types, parent_options,
    path_to_type, FlatMaintenanceType,
};
use crate::entities::maintenance_type::MaintenanceTypePatch;

#[derive(Subcommand, Debug)]
pub enum MtypeCommands {
    /// List the maintenance types of a part model, indented by nesting
    List {
        /// Part model id
        part_model: String,
    },

    /// Show the chain of maintenance types from a root down to one entry
    Path {
        /// Part model id
        part_model: String,

        /// Maintenance type id
        id: String,
    },

    /// List valid parents, optionally excluding an entry being edited
    Parents {
        /// Part model id
        part_model: String,

        /// Exclude this maintenance type and its subtree
        #[arg(long)]
        editing: Option<String>,
    },

    /// Create a maintenance type
    New(NewArgs),

    /// Change the fields of a maintenance type (moving it if --parent changes)
    Edit(EditArgs),

    /// Delete a maintenance type together with all of its children
    Rm {
        /// Part model id
        part_model: String,

        /// Maintenance type id
        id: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part model id
    pub part_model: String,

    /// Display name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Work duration in days
    #[arg(long, allow_negative_numbers = true)]
    pub duration: i64,

    /// Interval between occurrences in operating hours
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub interval: i64,

    /// Allowed deviation from the interval in hours
    #[arg(long, allow_negative_numbers = true)]
    pub deviation: Option<i64>,

    /// Priority (1 = highest)
    #[arg(long, allow_negative_numbers = true)]
    pub priority: Option<i64>,

    /// Parent maintenance type id
    #[arg(long, short = 'p')]
    pub parent: Option<String>,

    /// Display color
    #[arg(long, default_value = "")]
    pub color: String,

    /// Description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Part model id
    pub part_model: String,

    /// Maintenance type id
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub duration: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub interval: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub deviation: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    pub priority: Option<i64>,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Move under this parent
    #[arg(long, short = 'p', conflicts_with = "root")]
    pub parent: Option<String>,

    /// Move to the top level
    #[arg(long)]
    pub root: bool,
}

pub fn run(cmd: MtypeCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        MtypeCommands::List { part_model } => run_list(&session, &part_model),
        MtypeCommands::Path { part_model, id } => run_path(&session, &part_model, &id),
        MtypeCommands::Parents {
            part_model,
            editing,
        } => run_parents(&session, &part_model, editing.as_deref()),
        MtypeCommands::New(args) => run_new(&session, args),
        MtypeCommands::Edit(args) => run_edit(&session, args),
        MtypeCommands::Rm { part_model, id } => run_rm(&session, &part_model, &id),
    }
}

fn flat_listing(entries: &[FlatMaintenanceType<'_>]) -> Listing {
    let mut listing = Listing::new(&["ID", "Name", "Level", "Duration", "Interval", "Deviation", "Priority"]);
    for entry in entries {
        let item = entry.item;
        listing.row(vec![
            item.id.clone(),
            format!("{}{}", "  ".repeat(entry.level), item.name),
            entry.level.to_string(),
            format!("{}d", item.duration),
            format!("{}h", item.interval),
            item.deviation.map(|d| format!("{}h", d)).unwrap_or_default(),
            item.priority.map(|p| p.to_string()).unwrap_or_default(),
        ]);
    }
    listing
}

fn run_list(session: &Session, part_model_id: &str) -> Result<()> {
    let project = session.load_project()?;
    let part_model = project.part_model(part_model_id)?;
    let listing = flat_listing(&flatten_maintenance_types(&part_model.maintenance_types));

    if listing.is_empty() && !session.quiet && session.format == OutputFormat::Auto {
        println!("No maintenance types defined for {}", style(part_model_id).cyan());
        return Ok(());
    }
    listing.print(session.format_or(OutputFormat::Tsv))
}

fn run_path(session: &Session, part_model_id: &str, id: &str) -> Result<()> {
    let project = session.load_project()?;
    let part_model = project.part_model(part_model_id)?;
    let path = path_to_type(&part_model.maintenance_types, id);
    if path.is_empty() {
        return Err(CoreError::not_found(EntityPrefix::Mtype, id).into());
    }

    match session.format {
        OutputFormat::Auto => {
            let names: Vec<&str> = path.iter().map(|mt| mt.name.as_str()).collect();
            println!("{}", names.join(" > "));
        }
        format => {
            let entries: Vec<FlatMaintenanceType<'_>> = path
                .iter()
                .copied()
                .enumerate()
                .map(|(level, item)| FlatMaintenanceType { item, level })
                .collect();
            flat_listing(&entries).print(format)?;
        }
    }
    Ok(())
}

fn run_parents(session: &Session, part_model_id: &str, editing: Option<&str>) -> Result<()> {
    let project = session.load_project()?;
    let part_model = project.part_model(part_model_id)?;
    flat_listing(&parent_options(&part_model.maintenance_types, editing))
        .print(session.format_or(OutputFormat::Tsv))
}

fn run_new(session: &Session, args: NewArgs) -> Result<()> {
    let mut planner = session.planner()?;
    let fields = MaintenanceTypePatch {
        name: args.name,
        description: args.description,
        color: args.color,
        duration: args.duration,
        interval: args.interval,
        deviation: args.deviation,
        priority: args.priority,
        parent_id: args.parent,
    };
    let (id, _) = planner.add_maintenance_type(&args.part_model, fields)?;

    if session.format == OutputFormat::Id || session.quiet {
        println!("{}", id);
    } else {
        println!(
            "{} Created maintenance type {}",
            style("✓").green(),
            style(&id).cyan()
        );
    }
    Ok(())
}

fn run_edit(session: &Session, args: EditArgs) -> Result<()> {
    let mut planner = session.planner()?;
    let (current, nested_under) = {
        let part_model = planner.project().part_model(&args.part_model)?;
        let path = path_to_type(&part_model.maintenance_types, &args.id);
        let current = path
            .last()
            .ok_or_else(|| CoreError::not_found(EntityPrefix::Mtype, args.id.as_str()))?
            .fields();
        let nested_under = path.iter().rev().nth(1).map(|parent| parent.id.clone());
        (current, nested_under)
    };

    let patch = MaintenanceTypePatch {
        name: args.name.unwrap_or(current.name),
        description: args.description.unwrap_or(current.description),
        color: args.color.unwrap_or(current.color),
        duration: args.duration.unwrap_or(current.duration),
        interval: args.interval.unwrap_or(current.interval),
        deviation: args.deviation.or(current.deviation),
        priority: args.priority.or(current.priority),
        parent_id: if args.root {
            None
        } else {
            args.parent.or(nested_under)
        },
    };
    planner.update_maintenance_type(&args.part_model, &args.id, patch)?;

    if !session.quiet {
        println!(
            "{} Updated maintenance type {}",
            style("✓").green(),
            style(&args.id).cyan()
        );
    }
    Ok(())
}

fn run_rm(session: &Session, part_model_id: &str, id: &str) -> Result<()> {
    let mut planner = session.planner()?;
    let removed = {
        let part_model = planner.project().part_model(part_model_id)?;
        find_maintenance_type(&part_model.maintenance_types, id)
            .map(|mt| count_maintenance_types(std::slice::from_ref(mt)))
            .unwrap_or(0)
    };
    planner.remove_maintenance_type(part_model_id, id)?;

    if !session.quiet {
        println!(
            "{} Removed maintenance type {}",
            style("✓").green(),
            style(id).cyan()
        );
        if removed > 1 {
            println!(
                "  {} {} nested maintenance type(s) were removed with it",
                style("!").yellow(),
                removed - 1
            );
        }
    }
    Ok(())
}
