//! scotty - ssh into remote directories described by a YAML inventory.
//!
//! The inventory maps hostnames to server entries and group-keys to lists
//! of filesystem paths. scotty presents an interactive picker for the
//! server and then the directory, and finally opens a login shell there
//! over ssh.

pub mod actions;
pub mod cli;
pub mod inventory;
pub mod menu;
pub mod persistence;
pub mod ssh;
