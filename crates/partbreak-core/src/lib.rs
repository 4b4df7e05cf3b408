//! Core types and definitions for the PARTBREAK battle simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, loadouts, commands, events, snapshots, configuration
//! and constants. It has no dependency on the ECS or on randomness.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod loadout;
pub mod state;
pub mod types;
