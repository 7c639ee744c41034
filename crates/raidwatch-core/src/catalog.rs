//! Event catalog — recurrence rules and the occurrences they produce.
//!
//! Rules are validated once at construction; `next_after` is pure and always
//! returns an instant strictly after the reference clock, so a tick landing
//! exactly on a scheduled instant never re-fires the same occurrence.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};

use crate::config::{EventSpec, RaidWatchConfig};
use crate::error::{RaidWatchError, Result};

/// The fixed game-server timezone (KST, UTC+9, no DST).
pub fn game_timezone() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("KST is a valid offset")
}

/// How an event's firings relate to the calendar.
#[derive(Debug, Clone)]
pub enum RecurrenceRule {
    /// Every day at the same time of day.
    Daily { time_of_day: NaiveTime },
    /// Every 14 days from an anchor date, at a fixed time of day.
    Biweekly {
        time_of_day: NaiveTime,
        anchor_date: NaiveDate,
    },
    /// Daily, but the effective time of day shifts by a fixed amount each cycle.
    RotatingOffset {
        time_of_day: NaiveTime,
        anchor_date: NaiveDate,
        per_cycle_offset: Duration,
    },
}

impl RecurrenceRule {
    /// Daily rule from an "HH:MM" time of day.
    pub fn daily(time_of_day: &str) -> Result<Self> {
        Ok(Self::Daily {
            time_of_day: parse_time_of_day(time_of_day)?,
        })
    }

    /// Biweekly rule from "HH:MM" and a "YYYY-MM-DD" anchor not after `today`.
    pub fn biweekly(time_of_day: &str, anchor_date: &str, today: NaiveDate) -> Result<Self> {
        Ok(Self::Biweekly {
            time_of_day: parse_time_of_day(time_of_day)?,
            anchor_date: parse_anchor_date(anchor_date, today)?,
        })
    }

    /// Rotating rule: time of day shifts by `offset_minutes` per cycle.
    /// The offset must stay within a day so the forward search always advances.
    pub fn rotating_offset(
        time_of_day: &str,
        anchor_date: &str,
        offset_minutes: i64,
        today: NaiveDate,
    ) -> Result<Self> {
        if offset_minutes.abs() >= 24 * 60 {
            return Err(RaidWatchError::config(format!(
                "rotation of {offset_minutes} minutes exceeds one day"
            )));
        }
        Ok(Self::RotatingOffset {
            time_of_day: parse_time_of_day(time_of_day)?,
            anchor_date: parse_anchor_date(anchor_date, today)?,
            per_cycle_offset: Duration::minutes(offset_minutes),
        })
    }

    /// The earliest firing strictly after `now`.
    pub fn next_after(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let tz = *now.offset();
        match self {
            Self::Daily { time_of_day } => {
                let mut candidate = at_time(now.date_naive(), *time_of_day, tz);
                if candidate <= now {
                    candidate += Duration::days(1);
                }
                candidate
            }
            Self::Biweekly {
                time_of_day,
                anchor_date,
            } => {
                let elapsed_days = (now.date_naive() - *anchor_date).num_days();
                let cycles = elapsed_days.div_euclid(14);
                let mut candidate =
                    at_time(*anchor_date + Duration::days(cycles * 14), *time_of_day, tz);
                if candidate <= now {
                    candidate += Duration::days(14);
                }
                candidate
            }
            Self::RotatingOffset {
                time_of_day,
                anchor_date,
                per_cycle_offset,
            } => {
                let fire = |n: i64| {
                    at_time(*anchor_date + Duration::days(n), *time_of_day, tz)
                        + *per_cycle_offset * (n as i32)
                };
                // Shifted instants are strictly increasing in n (|offset| is
                // under a day), so back-step from the calendar estimate to the
                // earliest cycle still in the future, then search forward.
                let mut n = (now.date_naive() - *anchor_date).num_days().max(0);
                while n > 0 && fire(n - 1) > now {
                    n -= 1;
                }
                loop {
                    let candidate = fire(n);
                    if candidate > now {
                        return candidate;
                    }
                    n += 1;
                }
            }
        }
    }
}

fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|e| RaidWatchError::Config(format!("invalid time of day '{s}': {e}")))
}

fn parse_anchor_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let anchor = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| RaidWatchError::Config(format!("invalid anchor date '{s}': {e}")))?;
    if anchor > today {
        return Err(RaidWatchError::Config(format!(
            "anchor date '{s}' is in the future"
        )));
    }
    Ok(anchor)
}

fn at_time(date: NaiveDate, time_of_day: NaiveTime, tz: FixedOffset) -> DateTime<FixedOffset> {
    date.and_time(time_of_day)
        .and_local_timezone(tz)
        .single()
        .expect("fixed offsets have a single local interpretation")
}

/// Whether an occurrence is a real scheduled raid or an ephemeral drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    Scheduled,
    Drill,
}

/// What produces an event's firings: a recurrence rule, or a fixed instant
/// captured at startup (drills).
#[derive(Debug, Clone)]
pub enum Trigger {
    Schedule(RecurrenceRule),
    At(DateTime<FixedOffset>),
}

/// One schedulable catalog entry. Catalog entries with several time slots
/// expand into one `RaidEvent` per slot.
#[derive(Debug, Clone)]
pub struct RaidEvent {
    /// Stable identity: "{name} {HH:MM}" for scheduled slots.
    pub event_id: String,
    pub display_name: String,
    pub location: String,
    /// Explicit icon URL override, when configured.
    pub artwork: Option<String>,
    pub class: EventClass,
    pub trigger: Trigger,
}

/// One concrete future firing of an event, recomputed fresh every tick.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub event_id: String,
    pub scheduled: DateTime<FixedOffset>,
    pub class: EventClass,
}

impl Occurrence {
    pub fn key(&self) -> OccurrenceKey {
        OccurrenceKey {
            event_id: self.event_id.clone(),
            scheduled_unix: self.scheduled.timestamp(),
        }
    }
}

/// Identity of one concrete firing: which event, at which instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    pub event_id: String,
    pub scheduled_unix: i64,
}

/// The static per-run event catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    events: Vec<RaidEvent>,
}

impl Catalog {
    /// Build a catalog directly from already-expanded events.
    pub fn from_events(events: Vec<RaidEvent>) -> Self {
        Self { events }
    }

    /// Build the catalog from configuration, validating every rule up front.
    pub fn from_config(config: &RaidWatchConfig, today: NaiveDate) -> Result<Self> {
        let mut events = Vec::new();
        for spec in config.event_specs() {
            events.extend(expand_spec(&spec, today)?);
        }
        Ok(Self { events })
    }

    /// Append ephemeral drill events firing `offsets_minutes` after `now`,
    /// aligned to the next whole minute.
    pub fn add_drills(&mut self, now: DateTime<FixedOffset>, offsets_minutes: &[i64]) {
        let base = align_to_next_minute(now);
        for (i, offset) in offsets_minutes.iter().enumerate() {
            let at = base + Duration::minutes(*offset);
            self.events.push(RaidEvent {
                event_id: format!("Drill {}", i + 1),
                display_name: format!("Drill Boss {}", i + 1),
                location: "Test Zone".into(),
                artwork: None,
                class: EventClass::Drill,
                trigger: Trigger::At(at),
            });
        }
    }

    /// The occurrences to evaluate this tick, sorted by scheduled instant.
    pub fn upcoming(&self, now: DateTime<FixedOffset>) -> Vec<Occurrence> {
        let mut occurrences: Vec<Occurrence> = self
            .events
            .iter()
            .map(|event| Occurrence {
                event_id: event.event_id.clone(),
                scheduled: match &event.trigger {
                    Trigger::Schedule(rule) => rule.next_after(now),
                    Trigger::At(at) => *at,
                },
                class: event.class,
            })
            .collect();
        occurrences.sort_by(|a, b| {
            a.scheduled
                .cmp(&b.scheduled)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        occurrences
    }

    pub fn event(&self, event_id: &str) -> Option<&RaidEvent> {
        self.events.iter().find(|e| e.event_id == event_id)
    }

    pub fn events(&self) -> &[RaidEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn expand_spec(spec: &EventSpec, today: NaiveDate) -> Result<Vec<RaidEvent>> {
    if spec.times.is_empty() {
        return Err(RaidWatchError::Config(format!(
            "event '{}' lists no times",
            spec.name
        )));
    }
    let mut events = Vec::with_capacity(spec.times.len());
    for time in &spec.times {
        let rule = match spec.frequency.as_str() {
            "daily" => RecurrenceRule::daily(time)?,
            "biweekly" => {
                let anchor = require_anchor(spec)?;
                RecurrenceRule::biweekly(time, anchor, today)?
            }
            "rotating" => {
                let anchor = require_anchor(spec)?;
                let minutes = spec.rotation_minutes.ok_or_else(|| {
                    RaidWatchError::Config(format!(
                        "event '{}' is rotating but has no rotation_minutes",
                        spec.name
                    ))
                })?;
                RecurrenceRule::rotating_offset(time, anchor, minutes, today)?
            }
            other => {
                return Err(RaidWatchError::Config(format!(
                    "event '{}' has unknown frequency '{other}'",
                    spec.name
                )));
            }
        };
        events.push(RaidEvent {
            event_id: format!("{} {}", spec.name, time),
            display_name: spec.name.clone(),
            location: spec.location.clone(),
            artwork: spec.artwork.clone(),
            class: EventClass::Scheduled,
            trigger: Trigger::Schedule(rule),
        });
    }
    Ok(events)
}

fn require_anchor(spec: &EventSpec) -> Result<&str> {
    spec.anchor_date.as_deref().ok_or_else(|| {
        RaidWatchError::Config(format!(
            "event '{}' is {} but has no anchor_date",
            spec.name, spec.frequency
        ))
    })
}

fn align_to_next_minute(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    use chrono::Timelike;
    let truncated = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    if truncated < now {
        truncated + Duration::minutes(1)
    } else {
        truncated
    }
}
