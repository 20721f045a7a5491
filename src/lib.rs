//! pstreport — per-folder reports from Outlook PST/OST mailbox archives.
//!
//! This library provides the container capability traits, the folder walk,
//! message projection, and the CSV / raw-text report writers.

pub mod config;
pub mod container;
pub mod error;
pub mod export;
pub mod inventory;
pub mod model;
pub mod report;
pub mod traverse;
