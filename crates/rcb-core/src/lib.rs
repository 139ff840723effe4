//! Core domain + application logic for the RCON control bot.
//!
//! This crate is framework-agnostic. Telegram and the RCON client live behind
//! ports (traits) implemented in adapter crates.

pub mod access;
pub mod admin;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod images;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod relay;

pub use errors::{Error, Result};

#[cfg(test)]
mod testing;
