//! YAML diagnostics for project files
//!
//! Parse failures carry the offending file and a span so miette can point at
//! the exact line.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::entities::project::Project;

/// A project file that could not be parsed
#[derive(Debug, Error, Diagnostic)]
#[error("invalid project file: {message}")]
#[diagnostic(code(plantree::yaml::parse))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let offset = err
            .location()
            .map(|loc| line_col_to_offset(source, loc.line(), loc.column()))
            .unwrap_or(0);
        let message = err.to_string();

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help: suggest_fix(&message),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("could not serialize project: {0}")]
    #[diagnostic(code(plantree::yaml::serialize))]
    Serialize(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(plantree::yaml::io))]
    Io(#[from] std::io::Error),
}

/// Parse a project document
pub fn parse_project(source: &str, filename: &str) -> Result<Project, YamlSyntaxError> {
    serde_yml::from_str(source).map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename))
}

pub fn render_project(project: &Project) -> Result<String, YamlError> {
    serde_yml::to_string(project).map_err(|e| YamlError::Serialize(e.to_string()))
}

/// Byte offset of a 1-based line and column
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let line_text = source[line_start..].split('\n').next().unwrap_or("");
    let within = line_text
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(line_text.len());
    (line_start + within).min(source.len())
}

fn suggest_fix(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("tab") {
        return Some("YAML indentation must use spaces, not tabs".to_string());
    }
    if msg.contains("unknown variant") && msg.contains("required_working") {
        return Some("Condition types are REQUIRED_WORKING and MAX_MAINTENANCE".to_string());
    }
    if msg.contains("unknown variant") && msg.contains("assembly") {
        return Some("Tree entries need `type: NODE` or `type: ASSEMBLY`".to_string());
    }
    if msg.contains("missing field `type`") {
        return Some("Every tree entry and condition needs a `type` field".to_string());
    }
    if msg.contains("datetime") || msg.contains("premature end of input") {
        return Some("Timestamps use RFC 3339, e.g. 2024-01-10T00:00:00Z".to_string());
    }
    if msg.contains("missing field") {
        return Some("Check the entry against `plantree init` output for required keys".to_string());
    }
    if msg.contains("duplicate") {
        return Some("Each key can only appear once in a mapping".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
        assert_eq!(line_col_to_offset(source, 9, 1), source.len());
    }

    #[test]
    fn test_parse_project() {
        let source = r#"
name: Plant
componentTypes:
  - id: CT1
    name: Motor
tree:
  - type: NODE
    id: N1
    name: Hall
    conditions:
      - type: REQUIRED_WORKING
        requiredWorking: 1
    children:
      - type: ASSEMBLY
        id: A1
        name: Conveyor
        assemblyTypeId: AT1
"#;
        let project = parse_project(source, "project.yaml").unwrap();
        assert_eq!(project.name, "Plant");
        assert_eq!(project.tree[0].children()[0].id(), "A1");
        assert_eq!(project.tree[0].conditions().len(), 1);
    }

    #[test]
    fn test_parse_error_has_hint() {
        let source = "tree:\n  - id: N1\n    name: Hall\n";
        let err = parse_project(source, "project.yaml").unwrap_err();
        assert!(err.message().contains("type"));
        assert!(err.help.is_some());
    }

    #[test]
    fn test_render_then_parse_keeps_tree() {
        let source = "name: P\ntree:\n  - type: ASSEMBLY\n    id: A1\n    name: Pump\n    assemblyTypeId: AT1\n";
        let project = parse_project(source, "p.yaml").unwrap();
        let rendered = render_project(&project).unwrap();
        assert_eq!(parse_project(&rendered, "p.yaml").unwrap(), project);
    }
}
