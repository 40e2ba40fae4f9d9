//! Command line runner for the rollcall engine.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod properties;
pub mod run;
