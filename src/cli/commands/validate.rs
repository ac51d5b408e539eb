//! `plantree validate` command - Check the project for broken references

use console::style;
use miette::Result;

use crate::cli::helpers::{Listing, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::engine::catalog::{check_project, Severity};
use crate::engine::hierarchy::count_maintenance_types;
use crate::engine::tree::list_assemblies;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    // Parse errors surface here with their source location
    let project = session.load_project()?;
    let issues = check_project(&project);

    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warnings = issues.len() - errors;

    match session.format {
        OutputFormat::Auto => {
            for issue in &issues {
                let tag = match issue.severity {
                    Severity::Error => style("error").red().bold(),
                    Severity::Warning => style("warning").yellow().bold(),
                };
                println!("{} {}: {}", tag, style(&issue.subject).cyan(), issue.message);
            }
        }
        format => {
            let mut listing = Listing::new(&["Subject", "Severity", "Message"]);
            for issue in &issues {
                listing.row(vec![
                    issue.subject.clone(),
                    issue.severity.to_string(),
                    issue.message.clone(),
                ]);
            }
            listing.print(format)?;
        }
    }

    if !session.quiet && session.format == OutputFormat::Auto {
        if !issues.is_empty() {
            println!();
        }
        let mtypes: usize = project
            .part_models
            .iter()
            .map(|pm| count_maintenance_types(&pm.maintenance_types))
            .sum();
        println!(
            "Checked {} part models, {} maintenance types, {} assemblies, {} assignments",
            project.part_models.len(),
            mtypes,
            list_assemblies(&project.tree).len(),
            project.assignments.len()
        );
    }

    let failed = errors > 0 || (args.strict && warnings > 0);
    if failed {
        return Err(miette::miette!(
            "validation failed: {} error(s), {} warning(s)",
            errors,
            warnings
        ));
    }

    if session.format == OutputFormat::Auto {
        println!(
            "{} Project is valid{}",
            style("✓").green(),
            if warnings > 0 {
                format!(" ({} warning(s))", warnings)
            } else {
                String::new()
            }
        );
    }
    Ok(())
}
