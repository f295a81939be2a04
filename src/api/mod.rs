//! HTTP API Handlers
//! Mission: Links, notes, statistics, and role-tier endpoints

pub mod links;
pub mod notes;
pub mod stats;
pub mod users;
