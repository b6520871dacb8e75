//! Command line driver for fob-rsc.
//!
//! Loads a [`fob_rsc::BuildConfig`] from defaults, `fob-rsc.config.json`,
//! `FOB_RSC_*` environment variables and flags, then runs one orchestrated
//! build with the Rolldown engine.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;
