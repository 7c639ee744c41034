//! Alert lifecycle manager — decides, per occurrence, whether to create,
//! update, or retire a webhook alert, and owns all the bookkeeping.
//!
//! Invariants:
//! - at most one live alert per occurrence key;
//! - a retired key never re-enters the active map (the completed set blocks
//!   it while retained, and an already-finished occurrence is never created);
//! - any sink failure leaves state untouched, so the same decision is simply
//!   re-evaluated on the next tick.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};

use raidwatch_core::RaidWatchConfig;
use raidwatch_core::catalog::{Catalog, EventClass, Occurrence, OccurrenceKey, RaidEvent};

use crate::sink::{AlertRenderer, AlertView, MessageId, NotifierSink};
use crate::status::{Phase, PhaseWindows, classify, display_minutes};

/// Threshold set governing the lifecycle, constant for the process lifetime.
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    pub creation_threshold_secs: i64,
    pub update_interval_secs: i64,
    pub scheduled_windows: PhaseWindows,
    pub drill_windows: PhaseWindows,
    /// How long retired keys are remembered.
    pub retention: Duration,
    /// How often the completed set is swept.
    pub gc_interval: Duration,
}

impl AlertPolicy {
    pub fn from_config(config: &RaidWatchConfig) -> Self {
        Self {
            creation_threshold_secs: config.creation_threshold_secs,
            update_interval_secs: config.update_interval_secs,
            scheduled_windows: PhaseWindows {
                start_window_secs: config.windows.scheduled.start_window_secs,
                grace_window_secs: config.windows.scheduled.grace_window_secs,
            },
            drill_windows: PhaseWindows {
                start_window_secs: config.windows.drill.start_window_secs,
                grace_window_secs: config.windows.drill.grace_window_secs,
            },
            retention: Duration::days(config.retention_days),
            gc_interval: Duration::days(config.retention_days),
        }
    }

    pub fn windows_for(&self, class: EventClass) -> PhaseWindows {
        match class {
            EventClass::Scheduled => self.scheduled_windows,
            EventClass::Drill => self.drill_windows,
        }
    }
}

/// Bookkeeping for one externally created alert message.
#[derive(Debug, Clone)]
pub struct AlertRecord {
    pub key: OccurrenceKey,
    pub message_id: MessageId,
    pub scheduled: DateTime<FixedOffset>,
    pub class: EventClass,
    pub created_at: DateTime<FixedOffset>,
    pub last_updated_at: DateTime<FixedOffset>,
    pub last_phase: Phase,
}

/// Stateful orchestrator owning the active alert map and the completed set.
pub struct AlertManager {
    sink: Arc<dyn NotifierSink>,
    renderer: Arc<dyn AlertRenderer>,
    policy: AlertPolicy,
    active: HashMap<OccurrenceKey, AlertRecord>,
    completed: HashMap<OccurrenceKey, DateTime<FixedOffset>>,
    last_gc: Option<DateTime<FixedOffset>>,
}

impl AlertManager {
    pub fn new(
        sink: Arc<dyn NotifierSink>,
        renderer: Arc<dyn AlertRenderer>,
        policy: AlertPolicy,
    ) -> Self {
        Self {
            sink,
            renderer,
            policy,
            active: HashMap::new(),
            completed: HashMap::new(),
            last_gc: None,
        }
    }

    /// Create an alert for the occurrence if it is close enough, unseen, and
    /// not already retired. A failed send records nothing; the condition is
    /// re-evaluated next tick for as long as the occurrence stays relevant.
    pub async fn maybe_create(
        &mut self,
        event: &RaidEvent,
        occurrence: &Occurrence,
        now: DateTime<FixedOffset>,
    ) {
        let key = occurrence.key();
        if self.active.contains_key(&key) || self.completed.contains_key(&key) {
            return;
        }
        let remaining = (occurrence.scheduled - now).num_seconds();
        if remaining > self.policy.creation_threshold_secs {
            return;
        }

        let windows = self.policy.windows_for(occurrence.class);
        let phase = classify(remaining, &windows);
        if phase == Phase::Finished {
            // A stale occurrence whose retired key has aged out of the
            // completed set must stay silent, not come back as a new alert.
            return;
        }
        let view = AlertView {
            phase,
            minutes: view_minutes(remaining),
            scheduled: occurrence.scheduled,
            now,
            class: occurrence.class,
        };
        let rendered = self.renderer.render(event, &view);

        match self.sink.send(&rendered).await {
            Ok(message_id) => {
                tracing::info!(
                    "📣 Alert created for '{}' ({}s remaining, id {})",
                    event.display_name,
                    remaining,
                    message_id
                );
                self.active.insert(
                    key.clone(),
                    AlertRecord {
                        key,
                        message_id,
                        scheduled: occurrence.scheduled,
                        class: occurrence.class,
                        created_at: now,
                        last_updated_at: now,
                        last_phase: phase,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Alert send failed for '{}': {e} (retrying next tick)",
                    event.display_name
                );
            }
        }
    }

    /// Walk every live alert and edit the ones whose update cadence is due.
    /// Updates classify against the record's own scheduled instant, so an
    /// alert keeps progressing even after its rule has rolled over to the
    /// next occurrence.
    pub async fn update_active(&mut self, catalog: &Catalog, now: DateTime<FixedOffset>) {
        let due: Vec<OccurrenceKey> = self
            .active
            .values()
            .filter(|r| (now - r.last_updated_at).num_seconds() >= self.policy.update_interval_secs)
            .map(|r| r.key.clone())
            .collect();

        for key in due {
            match catalog.event(&key.event_id) {
                Some(event) => self.maybe_update(event, &key, now).await,
                None => {
                    // Stale bookkeeping for an event the catalog no longer
                    // knows; skip it rather than abort the pass.
                    tracing::debug!("skipping update for unknown event '{}'", key.event_id);
                }
            }
        }
    }

    /// Re-render and edit one live alert. A Finished status moves the key
    /// into the completed set, but only after the edit succeeds.
    pub async fn maybe_update(
        &mut self,
        event: &RaidEvent,
        key: &OccurrenceKey,
        now: DateTime<FixedOffset>,
    ) {
        let (message_id, scheduled, class) = match self.active.get(key) {
            Some(r) => (r.message_id.clone(), r.scheduled, r.class),
            None => return,
        };
        let remaining = (scheduled - now).num_seconds();
        let windows = self.policy.windows_for(class);
        let phase = classify(remaining, &windows);
        let view = AlertView {
            phase,
            minutes: view_minutes(remaining),
            scheduled,
            now,
            class,
        };
        let rendered = self.renderer.render(event, &view);

        match self.sink.edit(&message_id, &rendered).await {
            Ok(()) => {
                if phase == Phase::Finished {
                    self.active.remove(key);
                    self.completed.insert(key.clone(), now);
                    tracing::info!("✅ '{}' finished; alert retired", event.display_name);
                } else if let Some(record) = self.active.get_mut(key) {
                    record.last_updated_at = now;
                    record.last_phase = phase;
                    tracing::debug!(
                        "✏️ Alert updated for '{}' ({}, {}s remaining)",
                        event.display_name,
                        phase.as_str(),
                        remaining
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Alert edit failed for '{}': {e} (retrying next tick)",
                    event.display_name
                );
            }
        }
    }

    /// Sweep retired keys older than the retention window. Runs at most once
    /// per `gc_interval`, keeping the completed set bounded over long uptimes.
    pub fn gc_completed(&mut self, now: DateTime<FixedOffset>) {
        let due = match self.last_gc {
            Some(last) => now - last >= self.policy.gc_interval,
            None => true,
        };
        if !due {
            return;
        }
        let cutoff = now - self.policy.retention;
        let before = self.completed.len();
        self.completed.retain(|_, retired_at| *retired_at >= cutoff);
        if self.completed.len() != before {
            tracing::info!(
                "🧹 Completed-set GC: {} -> {}",
                before,
                self.completed.len()
            );
        }
        self.last_gc = Some(now);
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_completed(&self, key: &OccurrenceKey) -> bool {
        self.completed.contains_key(key)
    }

    pub fn record(&self, key: &OccurrenceKey) -> Option<&AlertRecord> {
        self.active.get(key)
    }
}

/// Display minutes for a signed remaining duration: remaining before the
/// start, elapsed after it.
fn view_minutes(remaining_secs: i64) -> i64 {
    if remaining_secs >= 0 {
        display_minutes(remaining_secs)
    } else {
        display_minutes(-remaining_secs)
    }
}
