//! Daily update schedule.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use tokio::sync::watch;

use crate::bot::service::RssBot;
use crate::error::{AppError, AppResult};

/// Hours of the day at which the feed is checked.
///
/// Built from a first hour and a step: `2` and `8` give 02:00, 10:00 and 18:00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    hours: Vec<u32>,
}

impl Schedule {
    pub fn new(first_hour: u32, every_hours: u32) -> AppResult<Self> {
        if first_hour >= 24 {
            return Err(AppError::Config(format!(
                "first update hour must be below 24, got {first_hour}"
            )));
        }
        if every_hours == 0 {
            return Err(AppError::Config(
                "update interval must be at least one hour".to_string(),
            ));
        }

        let hours = (first_hour..24).step_by(every_hours as usize).collect();
        Ok(Self { hours })
    }

    pub fn hours(&self) -> &[u32] {
        &self.hours
    }

    /// The first scheduled slot strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let midnight = now.date().and_time(NaiveTime::MIN);

        self.hours
            .iter()
            .map(|&hour| midnight + Duration::hours(i64::from(hour)))
            .find(|slot| *slot > now)
            .unwrap_or_else(|| midnight + Duration::hours(24 + i64::from(self.hours[0])))
    }
}

/// Runs one update, logging the outcome. Failures are reported, never propagated.
pub async fn run_update(bot: &RssBot) {
    match bot.update().await {
        Ok(outcome) => {
            tracing::info!(
                received = outcome.received,
                collected = outcome.collected,
                posted = outcome.posted.as_ref().map(|p| p.url.as_str()),
                "Feed update finished"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Feed update failed");
            sentry::capture_error(&e);
        }
    }
}

/// Runs feed updates at every scheduled slot (local time) until shutdown.
pub async fn run_schedule(bot: Arc<RssBot>, schedule: Schedule, mut shutdown: watch::Receiver<bool>) {
    tracing::info!("Setting up RSS bot schedule");
    for hour in schedule.hours() {
        tracing::info!("Bot will run at {hour:02}:00");
    }

    let mut last_slot: Option<NaiveDateTime> = None;
    loop {
        let now = Local::now().naive_local();
        // Never fire the same slot twice if the timer wakes slightly early
        let from = last_slot.map_or(now, |slot| slot.max(now));
        let next = schedule.next_after(from);
        let wait = (next - now).to_std().unwrap_or_default();

        tracing::debug!(next_run = %next, "Waiting for the next feed update");
        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => {
                tracing::info!("Scheduler stopped");
                return;
            }
        }

        last_slot = Some(next);
        run_update(&bot).await;
    }
}
