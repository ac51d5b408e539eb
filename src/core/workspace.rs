//! Workspace discovery and structure
//!
//! A workspace is any directory holding a `.plantree/` folder with
//! `config.yaml` and `project.yaml`.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::project::Project;
use crate::yaml::{parse_project, render_project, YamlError};

const DIR_NAME: &str = ".plantree";
const PROJECT_FILE: &str = "project.yaml";

#[derive(Debug, Clone)]
pub struct Workspace {
    /// Parent of `.plantree/`
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir().map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace by walking up from `start`
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::Io(format!("{}: {}", start.display(), e)))?;

        loop {
            if current.join(DIR_NAME).is_dir() {
                return Ok(Self { root: current });
            }
            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a workspace at `path` with an empty project
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(DIR_NAME).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }
        Self::write_skeleton(root)
    }

    /// Like [`Workspace::init`], overwriting an existing `.plantree/`
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_skeleton(root)
    }

    fn write_skeleton(root: PathBuf) -> Result<Self, WorkspaceError> {
        let workspace = Self { root };
        std::fs::create_dir_all(workspace.dir()).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        std::fs::write(workspace.dir().join("config.yaml"), Self::default_config())
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        let name = workspace
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plant".to_string());
        workspace.save_project(&Project::new(name))?;
        Ok(workspace)
    }

    fn default_config() -> &'static str {
        r#"# plantree workspace configuration

# Default output format (auto, yaml, tsv, json, id)
# default_format: auto

# Log filter when RUST_LOG is unset
# log_level: warn

# Seed new maintenance events with the first compatible unit when a slot
# has no recorded assignment
# default_unit_fallback: true
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.plantree/` directory
    pub fn dir(&self) -> PathBuf {
        self.root.join(DIR_NAME)
    }

    pub fn project_path(&self) -> PathBuf {
        self.dir().join(PROJECT_FILE)
    }

    pub fn load_project(&self) -> Result<Project, YamlError> {
        let path = self.project_path();
        let source = std::fs::read_to_string(&path)?;
        Ok(parse_project(&source, &path.display().to_string())?)
    }

    pub fn save_project(&self, project: &Project) -> Result<(), WorkspaceError> {
        let rendered = render_project(project).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        let path = self.project_path();
        // Replace via rename; readers never see a partial file
        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, rendered).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        std::fs::rename(&tmp, &path).map_err(|e| WorkspaceError::Io(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a plantree workspace (searched from {searched_from:?}). Run 'plantree init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("plantree workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(ws.dir().join("config.yaml").exists());
        let project = ws.load_project().unwrap();
        assert!(project.tree.is_empty());
        assert!(!project.name.is_empty());
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();
        let nested = tmp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let ws = Workspace::discover_from(&nested).unwrap();
        assert_eq!(ws.root(), tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_discover_fails_without_workspace() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        let mut project = ws.load_project().unwrap();
        project.name = "Rolling mill".to_string();
        ws.save_project(&project).unwrap();
        assert_eq!(ws.load_project().unwrap().name, "Rolling mill");
    }
}
