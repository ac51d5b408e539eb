//! Shared helper functions for CLI commands

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use miette::Result;
use std::sync::Arc;
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::Config;
use crate::core::planner::{Planner, YamlFileHook};
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::entities::project::Project;

/// Locate the workspace from `--project` or the current directory
pub fn find_workspace(global: &GlobalOpts) -> std::result::Result<Workspace, WorkspaceError> {
    match &global.project {
        Some(dir) => Workspace::discover_from(dir),
        None => Workspace::discover(),
    }
}

/// Workspace, merged configuration and effective output format
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub format: OutputFormat,
    pub quiet: bool,
    clock: Arc<dyn Clock>,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = find_workspace(global).map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load(Some(&workspace.dir()));
        let format = effective_format(global.format, &config);
        Ok(Self {
            workspace,
            config,
            format,
            quiet: global.quiet,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Default timestamp for commands run without `--at`
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn load_project(&self) -> Result<Project> {
        Ok(self.workspace.load_project()?)
    }

    /// Planner over the stored project that writes back on every commit
    pub fn planner(&self) -> Result<Planner> {
        Ok(Planner::new(self.load_project()?)
            .with_clock(Arc::clone(&self.clock))
            .with_hook(YamlFileHook::new(self.workspace.clone()))
            .with_default_unit_fallback(self.config.default_unit_fallback()))
    }

    /// Format to use when a command's natural default is `fallback`
    pub fn format_or(&self, fallback: OutputFormat) -> OutputFormat {
        if self.format == OutputFormat::Auto {
            fallback
        } else {
            self.format
        }
    }
}

fn effective_format(requested: OutputFormat, config: &Config) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| OutputFormat::from_str(f, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Parse an RFC 3339 timestamp or a plain date (midnight UTC)
pub fn parse_time(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid time '{}': use YYYY-MM-DD or RFC 3339", s))
}

pub fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Rows of strings printable in every output format
///
/// The first column is the id column used by `--format id`.
pub struct Listing {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Listing {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Auto | OutputFormat::Md => {
                let mut builder = Builder::default();
                builder.push_record(self.headers.iter().copied());
                for row in &self.rows {
                    builder.push_record(row.iter().map(String::as_str));
                }
                builder.build().with(Style::markdown()).to_string()
            }
            OutputFormat::Tsv => {
                let mut out = self.headers.join("\t");
                for row in &self.rows {
                    out.push('\n');
                    out.push_str(&row.join("\t"));
                }
                out
            }
            OutputFormat::Id => self
                .rows
                .iter()
                .filter_map(|row| row.first().cloned())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&self.records()).map_err(|e| miette::miette!("{}", e))?
            }
            OutputFormat::Yaml => {
                serde_yml::to_string(&self.records()).map_err(|e| miette::miette!("{}", e))?
            }
        })
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        let rendered = self.render(format)?;
        if !rendered.is_empty() {
            println!("{}", rendered.trim_end());
        }
        Ok(())
    }

    fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .map(|(h, v)| (h.to_lowercase().replace(' ', "_"), serde_json::Value::from(v.as_str())))
                    .collect()
            })
            .collect()
    }
}
