//! # RaidWatch Core
//!
//! Shared foundation for the RaidWatch workspace: the unified error type,
//! the TOML configuration layer, and the event catalog (recurrence rules and
//! the occurrences they produce).

pub mod catalog;
pub mod config;
pub mod error;

pub use catalog::{
    Catalog, EventClass, Occurrence, OccurrenceKey, RaidEvent, RecurrenceRule, Trigger,
};
pub use config::RaidWatchConfig;
pub use error::{RaidWatchError, Result};
