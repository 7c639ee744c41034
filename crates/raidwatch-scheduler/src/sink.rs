//! The seams between the lifecycle core and the outside world: the notifier
//! sink (send/edit against the messaging endpoint) and the alert renderer.
//! The core treats rendered payloads as opaque beyond needing a stable
//! message id for later edits.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use raidwatch_core::catalog::{EventClass, RaidEvent};
use raidwatch_core::error::Result;

use crate::status::Phase;

/// Stable identifier of an externally created message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An opaque rendered alert payload: the mention line plus the embed body.
#[derive(Debug, Clone)]
pub struct RenderedAlert {
    pub content: String,
    pub embed: serde_json::Value,
}

/// Snapshot of one occurrence's state handed to the renderer.
#[derive(Debug, Clone)]
pub struct AlertView {
    pub phase: Phase,
    /// Display minutes: remaining before start, elapsed after.
    pub minutes: i64,
    pub scheduled: DateTime<FixedOffset>,
    pub now: DateTime<FixedOffset>,
    pub class: EventClass,
}

/// External messaging endpoint with create + update-in-place primitives.
#[async_trait]
pub trait NotifierSink: Send + Sync {
    /// Post a new message; returns its stable id.
    async fn send(&self, alert: &RenderedAlert) -> Result<MessageId>;
    /// Edit a previously posted message in place.
    async fn edit(&self, id: &MessageId, alert: &RenderedAlert) -> Result<()>;
}

/// Turns an event + occurrence snapshot into a rendered payload.
pub trait AlertRenderer: Send + Sync {
    fn render(&self, event: &RaidEvent, view: &AlertView) -> RenderedAlert;
}
