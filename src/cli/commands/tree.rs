//! `plantree tree` command - Equipment tree queries

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

use crate::cli::helpers::{Listing, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::engine::tree::{display_path, list_assemblies, list_nodes};
use crate::entities::tree::{NodeKind, TreeNode};

#[derive(Subcommand, Debug)]
pub enum TreeCommands {
    /// Print the equipment tree
    Show,

    /// List every assembly with its path
    Assemblies,

    /// List grouping nodes with their paths and condition counts
    Nodes,

    /// Rename a node or assembly
    Rename {
        /// Node or assembly id
        id: String,

        /// New display name
        name: String,

        /// New description (default: keep the current one)
        #[arg(long, short = 'd')]
        description: Option<String>,
    },
}

pub fn run(cmd: TreeCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        TreeCommands::Show => run_show(&session),
        TreeCommands::Assemblies => run_assemblies(&session),
        TreeCommands::Nodes => run_nodes(&session),
        TreeCommands::Rename {
            id,
            name,
            description,
        } => run_rename(&session, &id, &name, description),
    }
}

fn run_show(session: &Session) -> Result<()> {
    let project = session.load_project()?;
    match session.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&project.tree).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&project.tree).into_diagnostic()?);
        }
        OutputFormat::Id => {
            let mut ids = Vec::new();
            collect_ids(&project.tree, &mut ids);
            for id in ids {
                println!("{}", id);
            }
        }
        _ => {
            if project.tree.is_empty() {
                if !session.quiet {
                    println!("Equipment tree is empty");
                }
                return Ok(());
            }
            for entry in &project.tree {
                print_entry(entry, 0);
            }
        }
    }
    Ok(())
}

fn print_entry(entry: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let label = match entry.kind() {
        NodeKind::Node => style(entry.name()).bold().to_string(),
        NodeKind::Assembly => {
            let type_id = entry.as_assembly().map(|a| a.assembly_type_id.as_str()).unwrap_or("");
            format!("{} {}", entry.name(), style(format!("[{}]", type_id)).dim())
        }
    };
    println!("{}{} {}", indent, style(entry.id()).cyan(), label);
    for condition in entry.conditions() {
        let marker = if condition.is_deprecated() {
            style("(deprecated)").yellow().to_string()
        } else {
            String::new()
        };
        println!("{}    {} {} {}", indent, style("⚑").magenta(), condition, marker);
    }
    for child in entry.children() {
        print_entry(child, depth + 1);
    }
}

fn collect_ids(tree: &[Arc<TreeNode>], out: &mut Vec<String>) {
    for entry in tree {
        out.push(entry.id().to_string());
        collect_ids(entry.children(), out);
    }
}

fn run_assemblies(session: &Session) -> Result<()> {
    let project = session.load_project()?;
    let mut listing = Listing::new(&["ID", "Name", "Type", "Path"]);
    for assembly in list_assemblies(&project.tree) {
        listing.row(vec![
            assembly.id.clone(),
            assembly.name.clone(),
            assembly.assembly_type_id.clone(),
            display_path(&project.tree, &assembly.id).unwrap_or_default(),
        ]);
    }
    listing.print(session.format_or(OutputFormat::Tsv))
}

fn run_nodes(session: &Session) -> Result<()> {
    let project = session.load_project()?;
    let mut listing = Listing::new(&["ID", "Name", "Path", "Conditions"]);
    for entry in list_nodes(&project.tree) {
        listing.row(vec![
            entry.node.id.clone(),
            entry.node.name.clone(),
            entry.path.clone(),
            entry.node.conditions.len().to_string(),
        ]);
    }
    listing.print(session.format_or(OutputFormat::Tsv))
}

fn run_rename(session: &Session, id: &str, name: &str, description: Option<String>) -> Result<()> {
    let mut planner = session.planner()?;
    let description = match description {
        Some(d) => d,
        None => crate::engine::tree::find_tree_node(&planner.project().tree, id)
            .map(|entry| entry.description().to_string())
            .unwrap_or_default(),
    };
    planner.rename_node(id, name, &description)?;
    if !session.quiet {
        println!("{} Renamed {} to {}", style("✓").green(), style(id).cyan(), name);
    }
    Ok(())
}
