//! `plantree cond` command - Node conditions

use chrono::{DateTime, Utc};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_time, parse_time, Listing, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::engine::constraints::evaluate_constraints;
use crate::engine::state::EventLog;
use crate::entities::condition::Condition;

#[derive(Subcommand, Debug)]
pub enum CondCommands {
    /// Attach a condition to a node
    Add {
        /// Node id
        node: String,

        #[command(flatten)]
        condition: ConditionArgs,
    },

    /// Replace the condition at a position
    Set {
        node: String,

        /// Position in the node's condition list (0-based)
        index: usize,

        #[command(flatten)]
        condition: ConditionArgs,
    },

    /// Remove the condition at a position
    Rm { node: String, index: usize },

    /// Evaluate every condition against the maintenance event log
    Check {
        /// Point in time (default: now)
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ConditionArgs {
    /// At least N assemblies below the node must be working
    #[arg(long)]
    pub required_working: Option<u32>,

    /// At most N assemblies below the node under maintenance (deprecated)
    #[arg(long)]
    pub max_maintenance: Option<u32>,
}

impl ConditionArgs {
    fn condition(&self) -> Option<Condition> {
        match (self.required_working, self.max_maintenance) {
            (Some(n), _) => Some(Condition::required_working(n)),
            (None, Some(n)) => Some(Condition::max_maintenance(n)),
            (None, None) => None,
        }
    }
}

pub fn run(cmd: CondCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        CondCommands::Add { node, condition } => {
            let condition = require(&condition)?;
            warn_deprecated(&session, &condition);
            let mut planner = session.planner()?;
            planner.add_constraint(&node, condition)?;
            done(&session, format!("Added \"{}\" to {}", condition, node));
            Ok(())
        }
        CondCommands::Set {
            node,
            index,
            condition,
        } => {
            let condition = require(&condition)?;
            warn_deprecated(&session, &condition);
            let mut planner = session.planner()?;
            planner.update_constraint(&node, index, condition)?;
            done(&session, format!("Condition {} of {} is now \"{}\"", index, node, condition));
            Ok(())
        }
        CondCommands::Rm { node, index } => {
            let mut planner = session.planner()?;
            planner.delete_constraint(&node, index)?;
            done(&session, format!("Removed condition {} from {}", index, node));
            Ok(())
        }
        CondCommands::Check { at } => run_check(&session, at),
    }
}

fn require(args: &ConditionArgs) -> Result<Condition> {
    args.condition()
        .ok_or_else(|| miette::miette!("give --required-working or --max-maintenance"))
}

fn warn_deprecated(session: &Session, condition: &Condition) {
    if condition.is_deprecated() && !session.quiet {
        eprintln!(
            "{} {} conditions are deprecated; prefer --required-working",
            style("!").yellow(),
            condition.type_name()
        );
    }
}

fn done(session: &Session, message: String) {
    if !session.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

fn run_check(session: &Session, at: Option<DateTime<Utc>>) -> Result<()> {
    let project = session.load_project()?;
    let at = at.unwrap_or_else(|| session.now());
    let state = EventLog::from_project(&project);
    let reports = evaluate_constraints(&project.tree, &state, at);

    match session.format {
        OutputFormat::Auto => {
            if reports.is_empty() {
                if !session.quiet {
                    println!("No conditions defined");
                }
                return Ok(());
            }
            for report in &reports {
                let mark = if report.satisfied {
                    style("✓").green()
                } else {
                    style("✗").red()
                };
                println!(
                    "{} {}#{} {} (actual {} of {})",
                    mark,
                    style(&report.node_id).cyan(),
                    report.index,
                    report.condition,
                    report.actual,
                    report.total
                );
            }
            let failing = reports.iter().filter(|r| !r.satisfied).count();
            if !session.quiet {
                println!();
                println!(
                    "{} of {} condition(s) satisfied at {}",
                    reports.len() - failing,
                    reports.len(),
                    format_time(&at)
                );
            }
        }
        format => {
            let mut listing = Listing::new(&["Node", "Index", "Condition", "Satisfied", "Actual", "Total"]);
            for report in &reports {
                listing.row(vec![
                    report.node_id.clone(),
                    report.index.to_string(),
                    report.condition.to_string(),
                    report.satisfied.to_string(),
                    report.actual.to_string(),
                    report.total.to_string(),
                ]);
            }
            listing.print(format)?;
        }
    }
    Ok(())
}
