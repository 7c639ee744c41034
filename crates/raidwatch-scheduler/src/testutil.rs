//! Shared test doubles: a recording mock sink, a minimal renderer, a manual
//! clock, and occurrence builders.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};

use raidwatch_core::catalog::{
    Catalog, EventClass, Occurrence, RaidEvent, Trigger, game_timezone,
};
use raidwatch_core::error::{RaidWatchError, Result};
use raidwatch_core::RaidWatchConfig;

use crate::clock::Clock;
use crate::lifecycle::AlertPolicy;
use crate::sink::{AlertRenderer, AlertView, MessageId, NotifierSink, RenderedAlert};

/// A time in the game timezone.
pub fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
    game_timezone().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// Default threshold set (600s create, 60s update, 300/300 + 120/60 windows,
/// 7-day retention).
pub fn policy() -> AlertPolicy {
    AlertPolicy::from_config(&RaidWatchConfig::default())
}

fn fixed_event(
    id: &str,
    scheduled: DateTime<FixedOffset>,
    class: EventClass,
) -> (RaidEvent, Occurrence) {
    let event = RaidEvent {
        event_id: id.to_string(),
        display_name: id.to_string(),
        location: "Shibuya".into(),
        artwork: None,
        class,
        trigger: Trigger::At(scheduled),
    };
    let occurrence = Occurrence {
        event_id: id.to_string(),
        scheduled,
        class,
    };
    (event, occurrence)
}

pub fn event_at(id: &str, scheduled: DateTime<FixedOffset>) -> (RaidEvent, Occurrence) {
    fixed_event(id, scheduled, EventClass::Scheduled)
}

pub fn drill_at(id: &str, scheduled: DateTime<FixedOffset>) -> (RaidEvent, Occurrence) {
    fixed_event(id, scheduled, EventClass::Drill)
}

pub fn catalog_of(events: &[RaidEvent]) -> Catalog {
    Catalog::from_events(events.to_vec())
}

/// Recording sink with switchable failure modes.
pub struct MockSink {
    sends: Mutex<Vec<RenderedAlert>>,
    edits: Mutex<Vec<(MessageId, RenderedAlert)>>,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
    next_id: AtomicU64,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            fail_edits: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    pub fn send_count(&self) -> usize {
        self.sends.lock().unwrap().len()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.lock().unwrap().len()
    }

    pub fn send_contents(&self) -> Vec<String> {
        self.sends.lock().unwrap().iter().map(|a| a.content.clone()).collect()
    }

    pub fn last_send_content(&self) -> Option<String> {
        self.sends.lock().unwrap().last().map(|a| a.content.clone())
    }

    pub fn last_edit_content(&self) -> Option<String> {
        self.edits.lock().unwrap().last().map(|(_, a)| a.content.clone())
    }
}

#[async_trait]
impl NotifierSink for MockSink {
    async fn send(&self, alert: &RenderedAlert) -> Result<MessageId> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RaidWatchError::sink("mock send failure"));
        }
        self.sends.lock().unwrap().push(alert.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId(id.to_string()))
    }

    async fn edit(&self, id: &MessageId, alert: &RenderedAlert) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(RaidWatchError::sink("mock edit failure"));
        }
        self.edits.lock().unwrap().push((id.clone(), alert.clone()));
        Ok(())
    }
}

/// Renderer producing "{name} | {phase} | {minutes}m" for easy assertions.
pub struct PlainRenderer;

impl AlertRenderer for PlainRenderer {
    fn render(&self, event: &RaidEvent, view: &AlertView) -> RenderedAlert {
        RenderedAlert {
            content: format!("{} | {} | {}m", event.display_name, view.phase.as_str(), view.minutes),
            embed: serde_json::json!({}),
        }
    }
}

/// A clock tests move by hand.
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap()
    }
}

impl Clock for std::sync::Arc<ManualClock> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}
