//! Sysctl file model, the tuning profile, and the `sysctl` command wrapper.
pub mod document;
pub mod mock;
pub mod profile;
pub mod runner;

pub use document::{Line, ParseError, SysctlDocument};
pub use runner::{SysctlCommand, SysctlRunner};
