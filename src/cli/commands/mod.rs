//! CLI command implementations

pub mod completions;
pub mod cond;
pub mod event;
pub mod init;
pub mod mtype;
pub mod tree;
pub mod unit;
pub mod validate;
