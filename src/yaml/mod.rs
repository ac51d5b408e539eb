//! YAML reading and writing for project files

pub mod diagnostics;

pub use diagnostics::{parse_project, render_project, YamlError, YamlSyntaxError};
