//! Shared leaf utilities.

pub mod time;
