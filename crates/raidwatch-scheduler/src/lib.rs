//! # RaidWatch Scheduler
//!
//! The occurrence-driven alert lifecycle: classify each upcoming occurrence
//! against the clock, create a webhook alert as it approaches, keep the
//! message edited while it starts and runs, and retire it exactly once.
//!
//! ## Architecture
//! ```text
//! ScheduleEngine (tokio interval, single task)
//!   each tick:
//!     Clock::now()
//!       → Catalog::upcoming(now)          (recomputed from rules, sorted)
//!       → AlertManager::maybe_create      (send once per occurrence key)
//!       → AlertManager::update_active     (edit on cadence, retire Finished)
//!       → AlertManager::gc_completed      (bound memory over long uptimes)
//! ```
//!
//! All mutable state lives in the `AlertManager`; everything else is
//! recomputed from scratch each tick, which is what makes the loop
//! self-healing after transient webhook failures.

pub mod clock;
pub mod engine;
pub mod lifecycle;
pub mod sink;
pub mod status;

pub use clock::{Clock, SystemClock};
pub use engine::ScheduleEngine;
pub use lifecycle::{AlertManager, AlertPolicy, AlertRecord};
pub use sink::{AlertRenderer, AlertView, MessageId, NotifierSink, RenderedAlert};
pub use status::{Phase, PhaseWindows, classify, display_minutes};

#[cfg(test)]
pub(crate) mod testutil;
