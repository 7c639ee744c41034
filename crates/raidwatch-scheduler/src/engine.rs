//! Scheduler engine — the single-task polling loop driving the alert
//! lifecycle. Everything outside the `AlertManager` is recomputed from the
//! catalog each tick.

use chrono::{DateTime, FixedOffset};

use raidwatch_core::catalog::Catalog;

use crate::clock::Clock;
use crate::lifecycle::AlertManager;

/// The scheduler engine — owns the catalog, the lifecycle state, and the clock.
pub struct ScheduleEngine<C: Clock> {
    catalog: Catalog,
    manager: AlertManager,
    clock: C,
    tick_interval: std::time::Duration,
}

impl<C: Clock> ScheduleEngine<C> {
    pub fn new(
        catalog: Catalog,
        manager: AlertManager,
        clock: C,
        tick_interval: std::time::Duration,
    ) -> Self {
        Self {
            catalog,
            manager,
            clock,
            tick_interval,
        }
    }

    /// One evaluation pass: recompute occurrences, create due alerts in
    /// scheduled order, update live ones, sweep the completed set.
    pub async fn tick(&mut self) -> DateTime<FixedOffset> {
        let now = self.clock.now();

        let occurrences = self.catalog.upcoming(now);
        for occurrence in &occurrences {
            match self.catalog.event(&occurrence.event_id) {
                Some(event) => self.manager.maybe_create(event, occurrence, now).await,
                None => continue,
            }
        }

        self.manager.update_active(&self.catalog, now).await;
        self.manager.gc_completed(now);
        now
    }

    /// Run until ctrl-c. Shutdown is cooperative: an in-flight tick always
    /// finishes before the loop exits.
    pub async fn run(mut self) {
        tracing::info!(
            "⏰ Raid watch started ({} events, tick every {:?})",
            self.catalog.len(),
            self.tick_interval
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = &mut shutdown => {
                    tracing::info!("👋 Shutdown requested, stopping raid watch");
                    break;
                }
            }
        }
    }

    pub fn manager(&self) -> &AlertManager {
        &self.manager
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use raidwatch_core::RaidWatchConfig;
    use raidwatch_core::config::EventSpec;

    use crate::lifecycle::AlertPolicy;
    use crate::sink::NotifierSink;
    use crate::testutil::{ManualClock, MockSink, PlainRenderer, dt, policy};

    fn engine_with(
        catalog: Catalog,
        sink: &Arc<MockSink>,
        clock: &Arc<ManualClock>,
        policy: AlertPolicy,
    ) -> ScheduleEngine<Arc<ManualClock>> {
        let manager = AlertManager::new(
            Arc::clone(sink) as Arc<dyn NotifierSink>,
            Arc::new(PlainRenderer),
            policy,
        );
        ScheduleEngine::new(
            catalog,
            manager,
            Arc::clone(clock),
            std::time::Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_drill_lifecycle_through_ticks() {
        let config = RaidWatchConfig::default();
        let start = dt(2025, 6, 10, 12, 0);
        let mut catalog = Catalog::from_config(&config, start.date_naive()).unwrap();
        catalog.add_drills(start, &[2, 3]);

        let sink = Arc::new(MockSink::new());
        let clock = Arc::new(ManualClock::at(start));
        let mut engine = engine_with(catalog, &sink, &clock, policy());

        // 12:00 — both drills are inside the 600s lead window; nothing else is.
        engine.tick().await;
        assert_eq!(sink.send_count(), 2);
        let contents = sink.send_contents();
        // Processed in scheduled order: the 12:02 drill before the 12:03 one.
        assert!(contents[0].starts_with("Drill Boss 1"));
        assert!(contents[1].starts_with("Drill Boss 2"));
        assert_eq!(contents[0], "Drill Boss 1 | starting | 2m");
        assert_eq!(contents[1], "Drill Boss 2 | upcoming | 3m");

        // 12:04 — drill 1 is 120s past start (beyond the 60s drill grace) and
        // retires; drill 2 is 60s in and stays ongoing.
        clock.set(dt(2025, 6, 10, 12, 4));
        engine.tick().await;
        assert_eq!(sink.edit_count(), 2);
        assert_eq!(engine.manager().active_len(), 1);
        assert_eq!(engine.manager().completed_len(), 1);

        // 12:06 — drill 2 retires too.
        clock.set(dt(2025, 6, 10, 12, 6));
        engine.tick().await;
        assert_eq!(engine.manager().active_len(), 0);
        assert_eq!(engine.manager().completed_len(), 2);

        // Later ticks re-enumerate the fixed drill instants but the completed
        // set keeps them silent.
        clock.set(dt(2025, 6, 10, 12, 10));
        engine.tick().await;
        assert_eq!(sink.send_count(), 2);
        assert_eq!(sink.edit_count(), 3);
    }

    #[tokio::test]
    async fn test_daily_event_full_lifecycle_and_next_day_realert() {
        let mut config = RaidWatchConfig::default();
        config.events = vec![EventSpec {
            name: "Pumpkinmon".into(),
            location: "Shibuya".into(),
            times: vec!["19:30".into()],
            frequency: "daily".into(),
            anchor_date: None,
            rotation_minutes: None,
            artwork: None,
        }];
        let start = dt(2025, 6, 10, 19, 21);
        let catalog = Catalog::from_config(&config, start.date_naive()).unwrap();

        let sink = Arc::new(MockSink::new());
        let clock = Arc::new(ManualClock::at(start));
        let mut engine = engine_with(catalog, &sink, &clock, policy());

        // 540s out: alert created as Upcoming.
        engine.tick().await;
        assert_eq!(sink.send_count(), 1);
        assert_eq!(sink.last_send_content().unwrap(), "Pumpkinmon | upcoming | 9m");

        // One minute past the start the rule has rolled over to tomorrow, but
        // the live record still progresses from its own scheduled instant.
        clock.set(dt(2025, 6, 10, 19, 31));
        engine.tick().await;
        assert_eq!(sink.send_count(), 1, "tomorrow's occurrence is outside the lead window");
        assert_eq!(sink.last_edit_content().unwrap(), "Pumpkinmon | ongoing | 1m");

        // Past the 300s grace: retired.
        clock.set(dt(2025, 6, 10, 19, 36));
        engine.tick().await;
        assert_eq!(sink.last_edit_content().unwrap(), "Pumpkinmon | finished | 6m");
        assert_eq!(engine.manager().active_len(), 0);
        assert_eq!(engine.manager().completed_len(), 1);

        // Next day, the fresh occurrence has a fresh key and alerts again.
        clock.set(dt(2025, 6, 11, 19, 25));
        engine.tick().await;
        assert_eq!(sink.send_count(), 2);
        assert_eq!(engine.manager().active_len(), 1);
    }
}
