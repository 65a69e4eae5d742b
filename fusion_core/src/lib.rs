//! # Fusion Core
//!
//! Drives the discovery game on top of `alchemy_rules`. This crate talks to
//! the fusion oracle, paces each fusion attempt, and owns the game session
//! that presentation layers read from and send picks into.
//!
//! ## Core Components
//!
//! - **oracle**: The asynchronous boundary that decides what two elements make
//! - **session**: Selection admission, fusion orchestration and phase timing
//! - **config**: TOML configuration for pacing and the oracle client
//!
//! ## Design Philosophy
//!
//! - **Single Writer**: Only the orchestrator's success path mutates the inventory
//! - **One Fusion At A Time**: Picks are refused until the previous attempt has released
//! - **Never Stuck**: Every attempt returns the session to idle, whatever the oracle does

pub mod config;
pub mod oracle;
pub mod session;

pub use config::*;
pub use oracle::*;
pub use session::*;
