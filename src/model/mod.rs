//! Core data model types: message bodies and projected message records.

pub mod body;
pub mod record;
