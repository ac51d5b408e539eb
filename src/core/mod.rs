//! Core module - identity, errors, configuration and the command façade

pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod logging;
pub mod planner;
pub mod workspace;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use entity::Entity;
pub use error::CoreError;
pub use identity::{EntityId, EntityPrefix, IdGenerator, SequentialIds, UlidGenerator};
pub use planner::{HookError, NewEvent, Planner, SaveHook, YamlFileHook};
pub use workspace::{Workspace, WorkspaceError};
