//! User-facing commands: the tuning run, restore, status and show.
pub mod prompt;
pub mod restore;
pub mod show;
pub mod status;
pub mod summary;
pub mod tune;
pub mod verify;
