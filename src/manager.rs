//! The activity state manager: sole owner and writer of the engagement data,
//! the user preferences and the session flag.
//!
//! Every mutation runs to completion before returning: counters, the derived
//! weekly fields, the timestamp and the write to the store. Storage faults
//! never fail a mutation. They are recorded in [`ActivityManager::last_error`]
//! and switch the manager to memory-only mode for the rest of the session.

use crate::errors::{ActivityError, StorageError};
use crate::models::{ActivityState, EngagementCounters, Goals, Metric, WeekTotals, WeeklyAggregate};
use crate::settings::{Capabilities, NotificationSettings, Preferences, SettingsUpdate, Theme};
use crate::stats::{refresh_streaks, refresh_totals, same_week, weekday_index};
use crate::storage::{
    ACTIVITY_DATA_KEY, KeyValueStore, LOGGED_IN_KEY, NOTIFICATIONS_KEY, THEME_KEY,
};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

/// Upper bound for a single day's counter. Larger values are clamped.
pub const MAX_DAILY_COUNT: u64 = 1_000_000;

/// How the state was obtained when the session started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing usable was stored; defaults were used.
    Fresh,
    /// Stored state from earlier today, used as-is.
    Restored,
    /// Stored state from an earlier day of this week; today's counters zeroed.
    RolledOver,
    /// Stored state from an earlier week; the weekly record was archived and cleared.
    NewWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    Durable,
    MemoryOnly,
}

pub struct ActivityManager<S: KeyValueStore> {
    store: S,
    state: ActivityState,
    preferences: Preferences,
    logged_in: bool,
    capabilities: Capabilities,
    outcome: LoadOutcome,
    status: StorageStatus,
    last_error: Option<ActivityError>,
    warning: Option<String>,
}

impl<S: KeyValueStore> ActivityManager<S> {
    pub fn load(store: S, capabilities: Capabilities) -> Self {
        Self::load_at(store, capabilities, Local::now())
    }

    pub fn load_at(mut store: S, capabilities: Capabilities, now: DateTime<Local>) -> Self {
        let mut last_error = store.take_open_error().map(|err| {
            error!("store could not be read, starting from defaults: {err}");
            ActivityError::from(err)
        });

        let (mut state, outcome) = match read_json::<ActivityState>(&store, ACTIVITY_DATA_KEY) {
            Ok(Some(mut state)) => {
                let outcome = roll_forward(&mut state, now).unwrap_or(LoadOutcome::Restored);
                (state, outcome)
            }
            Ok(None) => (ActivityState::new_at(now), LoadOutcome::Fresh),
            Err(err) => {
                error!("falling back to default activity data: {err}");
                last_error = Some(err);
                (ActivityState::new_at(now), LoadOutcome::Fresh)
            }
        };
        sanitize_loaded(&mut state);

        let theme = match store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse::<Theme>().unwrap_or_else(|err: String| {
                warn!("ignoring stored theme: {err}");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!("failed to read theme: {err}");
                Theme::default()
            }
        };

        let notifications = match read_json::<NotificationSettings>(&store, NOTIFICATIONS_KEY) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                warn!("ignoring stored notification settings: {err}");
                NotificationSettings::default()
            }
        };

        let logged_in = matches!(store.get(LOGGED_IN_KEY), Ok(Some(flag)) if flag == "true");

        info!(?outcome, logged_in, "activity state loaded");

        let mut manager = Self {
            store,
            state,
            preferences: Preferences {
                theme,
                notifications,
            },
            logged_in,
            capabilities,
            outcome,
            status: StorageStatus::Durable,
            last_error,
            warning: None,
        };

        if matches!(outcome, LoadOutcome::RolledOver | LoadOutcome::NewWeek) {
            manager.persist_state();
        }

        manager
    }

    pub fn state(&self) -> &ActivityState {
        &self.state
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn load_outcome(&self) -> LoadOutcome {
        self.outcome
    }

    pub fn storage_status(&self) -> StorageStatus {
        self.status
    }

    /// The most recent fault absorbed by the manager, if any.
    pub fn last_error(&self) -> Option<&ActivityError> {
        self.last_error.as_ref()
    }

    /// Returns the storage warning once; later calls return `None`.
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn refresh_day(&mut self) -> bool {
        self.refresh_day_at(Local::now())
    }

    /// Moves the state to the calendar day of `now` and saves it when the day
    /// changed. Returns whether it did. Readers call this before taking a
    /// snapshot so a long-running session never shows yesterday as today.
    pub fn refresh_day_at(&mut self, now: DateTime<Local>) -> bool {
        let changed = self.roll_forward_at(now);
        if changed {
            self.persist_state();
        }
        changed
    }

    pub fn set_replies(&mut self, count: u64) {
        self.set_count_at(Metric::Replies, count, Local::now());
    }

    pub fn set_posts(&mut self, count: u64) {
        self.set_count_at(Metric::Posts, count, Local::now());
    }

    pub fn set_retweets(&mut self, count: u64) {
        self.set_count_at(Metric::Retweets, count, Local::now());
    }

    pub fn set_count(&mut self, metric: Metric, count: u64) {
        self.set_count_at(metric, count, Local::now());
    }

    /// Sets today's counter for `metric` to an absolute value (at most
    /// [`MAX_DAILY_COUNT`]) and brings the weekly record up to date.
    pub fn set_count_at(&mut self, metric: Metric, count: u64, now: DateTime<Local>) {
        self.roll_forward_at(now);
        let count = count.min(MAX_DAILY_COUNT);

        self.state.today.set(metric, count);

        let index = weekday_index(now.date_naive());
        let goals = self.state.goals;
        let slot = &mut self.state.weekly.days[index];
        slot.set(metric, count);
        slot.goals_completed = goals.met_by(&slot.counters());

        refresh_totals(&mut self.state.weekly);
        refresh_streaks(&mut self.state.weekly, index);
        self.state.last_updated = now;
        self.persist_state();
    }

    /// Applies a signed step to today's counter, clamped at zero.
    pub fn adjust_count_at(&mut self, metric: Metric, step: i64, now: DateTime<Local>) -> u64 {
        self.roll_forward_at(now);
        let current = self.state.today.get(metric);
        let next = current.saturating_add_signed(step).min(MAX_DAILY_COUNT);
        self.set_count_at(metric, next, now);
        next
    }

    pub fn adjust_count(&mut self, metric: Metric, step: i64) -> u64 {
        self.adjust_count_at(metric, step, Local::now())
    }

    pub fn set_goals(&mut self, goals: Goals) -> Result<(), ActivityError> {
        self.set_goals_at(goals, Local::now())
    }

    /// Replaces the goals. Days already recorded keep their completion flag.
    pub fn set_goals_at(&mut self, goals: Goals, now: DateTime<Local>) -> Result<(), ActivityError> {
        validate_goals(&goals)?;
        self.roll_forward_at(now);
        self.state.goals = goals;
        self.state.last_updated = now;
        self.persist_state();
        Ok(())
    }

    pub fn reset_today(&mut self) {
        self.reset_today_at(Local::now());
    }

    /// Zeroes today's counters. Today's weekly slot is left as it was.
    pub fn reset_today_at(&mut self, now: DateTime<Local>) {
        self.roll_forward_at(now);
        self.state.today = EngagementCounters::default();
        self.state.last_updated = now;
        self.persist_state();
    }

    pub fn save_settings(&mut self, update: SettingsUpdate) -> Result<(), ActivityError> {
        self.save_settings_at(update, Local::now())
    }

    /// Saves goals, theme and notification preferences together. Floating
    /// window mode stays off when the platform does not offer it.
    pub fn save_settings_at(
        &mut self,
        update: SettingsUpdate,
        now: DateTime<Local>,
    ) -> Result<(), ActivityError> {
        self.set_goals_at(update.goals, now)?;

        let notifications = NotificationSettings {
            enabled: update.notifications.enabled,
            floating_window: update.notifications.floating_window
                && self.capabilities.floating_window,
        };
        self.preferences = Preferences {
            theme: update.theme,
            notifications,
        };

        self.write(THEME_KEY, update.theme.as_str().to_string());
        match serde_json::to_string(&notifications) {
            Ok(json) => self.write(NOTIFICATIONS_KEY, json),
            Err(err) => self.record(StorageError::Encode(err).into()),
        }
        Ok(())
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
        self.write(LOGGED_IN_KEY, logged_in.to_string());
    }

    fn roll_forward_at(&mut self, now: DateTime<Local>) -> bool {
        match roll_forward(&mut self.state, now) {
            Some(outcome) => {
                info!(?outcome, "day changed during session");
                true
            }
            None => false,
        }
    }

    fn persist_state(&mut self) {
        match serde_json::to_string(&self.state) {
            Ok(json) => self.write(ACTIVITY_DATA_KEY, json),
            Err(err) => self.record(StorageError::Encode(err).into()),
        }
    }

    fn write(&mut self, key: &'static str, value: String) {
        if self.status == StorageStatus::MemoryOnly {
            return;
        }

        if let Err(err) = self.store.set(key, value) {
            warn!(key, "storage write failed, keeping changes in memory only: {err}");
            self.status = StorageStatus::MemoryOnly;
            self.warning = Some(format!(
                "Your activity can no longer be saved on this device ({err}). \
                 Changes are kept until the app is closed."
            ));
            self.record(err.into());
        }
    }

    fn record(&mut self, err: ActivityError) {
        error!("{err}");
        self.last_error = Some(err);
    }
}

fn read_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &'static str,
) -> Result<Option<T>, ActivityError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| ActivityError::Corrupt { key, source })
}

fn validate_goals(goals: &Goals) -> Result<(), ActivityError> {
    let checks = [
        ("replyGoal", goals.reply_goal),
        ("postGoal", goals.post_goal),
        ("retweetGoal", goals.retweet_goal),
    ];
    match checks.into_iter().find(|&(_, value)| value == 0) {
        Some((field, _)) => Err(ActivityError::InvalidGoal { field }),
        None => Ok(()),
    }
}

/// Goals of zero can only come from a hand-edited store.
fn sanitize_loaded(state: &mut ActivityState) {
    let goals = &mut state.goals;
    for goal in [&mut goals.reply_goal, &mut goals.post_goal, &mut goals.retweet_goal] {
        if *goal == 0 {
            *goal = 1;
        }
    }
    refresh_totals(&mut state.weekly);
}

/// Moves `state` to the calendar day of `now`. Returns `None` when the day is
/// unchanged.
fn roll_forward(state: &mut ActivityState, now: DateTime<Local>) -> Option<LoadOutcome> {
    let last = state.last_updated.date_naive();
    let today = now.date_naive();
    if last == today {
        return None;
    }

    let outcome = if last < today && !same_week(last, today) {
        archive_week(&mut state.weekly, last, today);
        LoadOutcome::NewWeek
    } else {
        LoadOutcome::RolledOver
    };

    state.today = EngagementCounters::default();
    state.last_updated = now;
    refresh_streaks(&mut state.weekly, weekday_index(today));
    Some(outcome)
}

fn archive_week(weekly: &mut WeeklyAggregate, last: NaiveDate, today: NaiveDate) {
    let previous = if week_start(today) - week_start(last) == Duration::weeks(1) {
        weekly.totals()
    } else {
        WeekTotals::default()
    };

    let longest = weekly.longest_streak;
    *weekly = WeeklyAggregate {
        longest_streak: longest,
        previous_week: Some(previous),
        ..WeeklyAggregate::default()
    };
    refresh_totals(weekly);
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(year, month, day, hour, 0, 0)
            .single()
            .expect("unambiguous local time")
    }

    // 2026-01-07 is a Wednesday.
    fn wednesday() -> DateTime<Local> {
        at(2026, 1, 7, 12)
    }

    fn fresh_at(now: DateTime<Local>) -> ActivityManager<MemoryStore> {
        ActivityManager::load_at(MemoryStore::new(), Capabilities::default(), now)
    }

    fn stored(state: &ActivityState) -> MemoryStore {
        MemoryStore::new().with_entry(ACTIVITY_DATA_KEY, serde_json::to_string(state).unwrap())
    }

    fn assert_totals_match(state: &ActivityState) {
        let days = &state.weekly.days;
        assert_eq!(state.weekly.total_replies, days.iter().map(|d| d.replies).sum::<u64>());
        assert_eq!(state.weekly.total_posts, days.iter().map(|d| d.posts).sum::<u64>());
        assert_eq!(state.weekly.total_retweets, days.iter().map(|d| d.retweets).sum::<u64>());
    }

    #[test]
    fn fresh_install_uses_defaults() {
        let manager = fresh_at(wednesday());
        let state = manager.state();

        assert_eq!(manager.load_outcome(), LoadOutcome::Fresh);
        assert_eq!(state.today, EngagementCounters::default());
        assert_eq!(state.goals.reply_goal, 10);
        assert_eq!(state.goals.post_goal, 3);
        assert_eq!(state.goals.retweet_goal, 5);
        assert_eq!(state.weekly.days[0].date, "Mon");
        assert_eq!(state.weekly.days[6].date, "Sun");
        assert!(!manager.is_logged_in());
        assert_eq!(manager.preferences(), Preferences::default());
        assert!(manager.last_error().is_none());
    }

    #[test]
    fn setting_a_counter_updates_today_and_its_slot() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        for n in [0, 1, 7, 250] {
            manager.set_count_at(Metric::Replies, n, now);
            assert_eq!(manager.state().today.replies, n);
            assert_eq!(manager.state().weekly.days[2].replies, n);
        }
        assert_eq!(manager.state().last_updated, now);
    }

    #[test]
    fn totals_always_equal_sum_of_days() {
        let mut manager = fresh_at(at(2026, 1, 5, 9));
        manager.set_count_at(Metric::Replies, 4, at(2026, 1, 5, 9));
        manager.set_count_at(Metric::Posts, 2, at(2026, 1, 5, 10));
        manager.set_count_at(Metric::Replies, 6, at(2026, 1, 6, 9));
        manager.set_count_at(Metric::Retweets, 3, at(2026, 1, 6, 11));
        manager.set_count_at(Metric::Replies, 1, at(2026, 1, 6, 12));

        let state = manager.state();
        assert_totals_match(state);
        assert_eq!(state.weekly.total_replies, 5);
        assert_eq!(state.weekly.total_posts, 2);
        assert_eq!(state.weekly.total_retweets, 3);
    }

    #[test]
    fn goals_complete_in_any_order_and_revert() {
        let orders = [
            [Metric::Replies, Metric::Posts, Metric::Retweets],
            [Metric::Retweets, Metric::Replies, Metric::Posts],
            [Metric::Posts, Metric::Retweets, Metric::Replies],
        ];
        let now = wednesday();

        for order in orders {
            let mut manager = fresh_at(now);
            for metric in order {
                let goal = u64::from(manager.state().goals.get(metric));
                manager.set_count_at(metric, goal, now);
            }
            assert!(manager.state().weekly.days[2].goals_completed);

            manager.set_count_at(Metric::Posts, 2, now);
            assert!(!manager.state().weekly.days[2].goals_completed);
        }
    }

    #[test]
    fn reset_today_is_idempotent_and_keeps_slot() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        manager.set_count_at(Metric::Replies, 8, now);
        manager.set_count_at(Metric::Posts, 2, now);

        manager.reset_today_at(now);
        let once = manager.state().clone();
        manager.reset_today_at(now);

        assert_eq!(manager.state(), &once);
        assert_eq!(once.today, EngagementCounters::default());
        assert_eq!(once.weekly.days[2].replies, 8);
        assert_eq!(once.weekly.days[2].posts, 2);
    }

    #[test]
    fn new_day_zeroes_today_but_keeps_week() {
        let mut state = ActivityState::new_at(wednesday());
        state.today.replies = 5;
        state.weekly.days[2].replies = 5;
        state.weekly.days[1].posts = 3;
        refresh_totals(&mut state.weekly);

        let thursday = at(2026, 1, 8, 8);
        let manager = ActivityManager::load_at(stored(&state), Capabilities::default(), thursday);

        assert_eq!(manager.load_outcome(), LoadOutcome::RolledOver);
        assert_eq!(manager.state().today.replies, 0);
        assert_eq!(manager.state().weekly.days, state.weekly.days);
        assert_eq!(manager.state().last_updated, thursday);
    }

    #[test]
    fn same_day_restores_as_is() {
        let mut state = ActivityState::new_at(at(2026, 1, 7, 8));
        state.today.posts = 2;
        state.weekly.days[2].posts = 2;
        refresh_totals(&mut state.weekly);

        let manager = ActivityManager::load_at(stored(&state), Capabilities::default(), wednesday());
        assert_eq!(manager.load_outcome(), LoadOutcome::Restored);
        assert_eq!(manager.state(), &state);
    }

    #[test]
    fn new_week_archives_totals_for_comparison() {
        let friday = at(2026, 1, 9, 18);
        let mut state = ActivityState::new_at(friday);
        state.weekly.days[0].replies = 10;
        state.weekly.days[4].replies = 2;
        state.weekly.days[4].posts = 4;
        state.weekly.days[4].goals_completed = true;
        state.weekly.longest_streak = 3;
        refresh_totals(&mut state.weekly);

        let tuesday = at(2026, 1, 13, 9);
        let mut manager = ActivityManager::load_at(stored(&state), Capabilities::default(), tuesday);
        assert_eq!(manager.load_outcome(), LoadOutcome::NewWeek);

        let weekly = &manager.state().weekly;
        assert!(weekly.days.iter().all(|day| day.replies == 0 && !day.goals_completed));
        assert_eq!(weekly.previous_week, Some(WeekTotals { replies: 12, posts: 4, retweets: 0 }));
        assert_eq!(weekly.longest_streak, 3);
        assert_eq!(weekly.current_streak, 0);

        manager.set_count_at(Metric::Replies, 15, tuesday);
        let comparison = manager.state().weekly.comparison_to_previous_week;
        assert_eq!(comparison.replies, 3);
        assert_eq!(comparison.posts, -4);
    }

    #[test]
    fn long_absence_compares_against_empty_week() {
        let mut state = ActivityState::new_at(at(2026, 1, 5, 9));
        state.weekly.days[0].replies = 9;
        refresh_totals(&mut state.weekly);

        let later = at(2026, 1, 21, 9);
        let manager = ActivityManager::load_at(stored(&state), Capabilities::default(), later);
        assert_eq!(manager.state().weekly.previous_week, Some(WeekTotals::default()));
    }

    #[test]
    fn session_open_past_midnight_rolls_over_on_next_change() {
        let mut manager = fresh_at(at(2026, 1, 7, 23));
        manager.set_count_at(Metric::Replies, 4, at(2026, 1, 7, 23));
        manager.set_count_at(Metric::Posts, 1, at(2026, 1, 8, 9));

        let state = manager.state();
        assert_eq!(state.today.replies, 0);
        assert_eq!(state.today.posts, 1);
        assert_eq!(state.weekly.days[2].replies, 4);
        assert_eq!(state.weekly.days[3].posts, 1);
        assert_eq!(state.weekly.days[3].replies, 0);
    }

    #[test]
    fn streak_spans_consecutive_completed_days() {
        let mut manager = fresh_at(at(2026, 1, 5, 9));
        for day in [5, 6] {
            let now = at(2026, 1, day, 9);
            manager.set_count_at(Metric::Replies, 10, now);
            manager.set_count_at(Metric::Posts, 3, now);
            manager.set_count_at(Metric::Retweets, 5, now);
        }
        assert_eq!(manager.state().weekly.current_streak, 2);

        manager.set_count_at(Metric::Replies, 1, at(2026, 1, 7, 9));
        assert_eq!(manager.state().weekly.current_streak, 2);
        assert_eq!(manager.state().weekly.longest_streak, 2);
    }

    #[test]
    fn state_survives_serde_round_trip() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        manager.set_count_at(Metric::Replies, 3, now);
        manager.set_count_at(Metric::Retweets, 6, now);

        let json = serde_json::to_string(manager.state()).unwrap();
        assert!(json.contains("\"lastUpdated\""));
        assert!(json.contains("\"goalsCompleted\""));
        let decoded: ActivityState = serde_json::from_str(&json).unwrap();
        assert_eq!(&decoded, manager.state());
    }

    #[test]
    fn every_change_is_written_to_the_store() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        manager.set_count_at(Metric::Posts, 2, now);
        let expected = manager.state().clone();

        let reloaded = ActivityManager::load_at(manager.into_store(), Capabilities::default(), now);
        assert_eq!(reloaded.load_outcome(), LoadOutcome::Restored);
        assert_eq!(reloaded.state(), &expected);
    }

    #[test]
    fn goals_change_does_not_rewrite_history() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        manager.set_count_at(Metric::Replies, 10, now);
        manager.set_count_at(Metric::Posts, 3, now);
        manager.set_count_at(Metric::Retweets, 5, now);

        let goals = Goals { reply_goal: 20, post_goal: 3, retweet_goal: 5 };
        manager.set_goals_at(goals, now).unwrap();
        assert_eq!(manager.state().goals, goals);
        assert!(manager.state().weekly.days[2].goals_completed);

        manager.set_count_at(Metric::Posts, 3, now);
        assert!(!manager.state().weekly.days[2].goals_completed);
    }

    #[test]
    fn zero_goal_is_rejected() {
        let mut manager = fresh_at(wednesday());
        let err = manager
            .set_goals_at(Goals { reply_goal: 4, post_goal: 0, retweet_goal: 1 }, wednesday())
            .unwrap_err();
        assert!(matches!(err, ActivityError::InvalidGoal { field: "postGoal" }));
        assert_eq!(manager.state().goals, Goals::default());
    }

    #[test]
    fn adjust_clamps_at_zero() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        assert_eq!(manager.adjust_count_at(Metric::Retweets, -1, now), 0);
        assert_eq!(manager.adjust_count_at(Metric::Retweets, 1, now), 1);
        assert_eq!(manager.adjust_count_at(Metric::Retweets, 1, now), 2);
        assert_eq!(manager.adjust_count_at(Metric::Retweets, -1, now), 1);
        assert_eq!(manager.state().weekly.days[2].retweets, 1);
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let store = MemoryStore::new().with_entry(ACTIVITY_DATA_KEY, "{\"today\": oops");
        let manager = ActivityManager::load_at(store, Capabilities::default(), wednesday());

        assert_eq!(manager.load_outcome(), LoadOutcome::Fresh);
        assert_eq!(manager.state(), &ActivityState::new_at(wednesday()));
        assert!(matches!(
            manager.last_error(),
            Some(ActivityError::Corrupt { key: ACTIVITY_DATA_KEY, .. })
        ));
    }

    #[test]
    fn write_failure_degrades_to_memory_only() {
        let now = wednesday();
        let store = MemoryStore::new().failing_writes();
        let mut manager = ActivityManager::load_at(store, Capabilities::default(), now);

        manager.set_count_at(Metric::Replies, 3, now);
        assert_eq!(manager.state().today.replies, 3);
        assert_eq!(manager.storage_status(), StorageStatus::MemoryOnly);
        assert!(matches!(manager.last_error(), Some(ActivityError::Storage(_))));

        assert!(manager.take_warning().is_some());
        manager.set_count_at(Metric::Replies, 4, now);
        assert!(manager.take_warning().is_none());
        assert_eq!(manager.state().weekly.total_replies, 4);
    }

    #[test]
    fn memory_only_mode_stops_writing() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        manager.set_count_at(Metric::Replies, 1, now);

        let mut store = manager.into_store();
        store.set_fail_writes(true);
        let mut manager = ActivityManager::load_at(store, Capabilities::default(), now);
        manager.set_count_at(Metric::Replies, 2, now);

        let mut store = manager.into_store();
        store.set_fail_writes(false);
        let manager = ActivityManager::load_at(store, Capabilities::default(), now);
        assert_eq!(manager.state().today.replies, 1);
    }

    #[test]
    fn settings_persist_and_respect_capabilities() {
        let now = wednesday();
        let mut manager = fresh_at(now);
        let update = SettingsUpdate {
            goals: Goals { reply_goal: 15, post_goal: 4, retweet_goal: 2 },
            theme: Theme::Matrix,
            notifications: NotificationSettings { enabled: false, floating_window: true },
        };
        manager.save_settings_at(update, now).unwrap();
        assert!(!manager.preferences().notifications.floating_window);

        let store = manager.into_store();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("matrix"));

        let capable = Capabilities { floating_window: true };
        let mut manager = ActivityManager::load_at(store, capable, now);
        assert_eq!(manager.state().goals, update.goals);
        assert_eq!(manager.preferences().theme, Theme::Matrix);
        assert!(!manager.preferences().notifications.enabled);

        manager.save_settings_at(update, now).unwrap();
        assert!(manager.preferences().notifications.floating_window);
    }

    #[test]
    fn login_flag_is_stored_as_string() {
        let mut manager = fresh_at(wednesday());
        manager.set_logged_in(true);
        assert_eq!(manager.store().get(LOGGED_IN_KEY).unwrap().as_deref(), Some("true"));

        let mut manager =
            ActivityManager::load_at(manager.into_store(), Capabilities::default(), wednesday());
        assert!(manager.is_logged_in());

        manager.set_logged_in(false);
        assert_eq!(manager.store().get(LOGGED_IN_KEY).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn unknown_stored_theme_is_ignored() {
        let store = MemoryStore::new()
            .with_entry(THEME_KEY, "neon")
            .with_entry(NOTIFICATIONS_KEY, "{\"enabled\":false,\"floatingWindow\":false}");
        let manager = ActivityManager::load_at(store, Capabilities::default(), wednesday());
        assert_eq!(manager.preferences().theme, Theme::Minimal);
        assert!(!manager.preferences().notifications.enabled);
    }

    #[test]
    fn missed_day_breaks_streak_on_load() {
        let mut manager = fresh_at(at(2026, 1, 5, 9));
        for day in [5, 6] {
            let now = at(2026, 1, day, 9);
            manager.set_count_at(Metric::Replies, 10, now);
            manager.set_count_at(Metric::Posts, 3, now);
            manager.set_count_at(Metric::Retweets, 5, now);
        }
        assert_eq!(manager.state().weekly.current_streak, 2);

        let thursday = at(2026, 1, 8, 9);
        let manager = ActivityManager::load_at(manager.into_store(), Capabilities::default(), thursday);
        assert_eq!(manager.load_outcome(), LoadOutcome::RolledOver);
        assert_eq!(manager.state().weekly.current_streak, 0);
        assert_eq!(manager.state().weekly.longest_streak, 2);
    }

    #[test]
    fn next_day_load_keeps_yesterdays_streak() {
        let mut manager = fresh_at(at(2026, 1, 6, 9));
        let tuesday = at(2026, 1, 6, 9);
        manager.set_count_at(Metric::Replies, 10, tuesday);
        manager.set_count_at(Metric::Posts, 3, tuesday);
        manager.set_count_at(Metric::Retweets, 5, tuesday);

        let manager =
            ActivityManager::load_at(manager.into_store(), Capabilities::default(), wednesday());
        assert_eq!(manager.state().weekly.current_streak, 1);
    }

    #[test]
    fn huge_counts_are_capped_across_weeks() {
        let mut manager = fresh_at(at(2026, 1, 9, 9));
        manager.set_count_at(Metric::Replies, u64::MAX, at(2026, 1, 9, 9));
        assert_eq!(manager.state().today.replies, MAX_DAILY_COUNT);

        let tuesday = at(2026, 1, 13, 9);
        manager.set_count_at(Metric::Replies, i64::MAX as u64, tuesday);

        let state = manager.state();
        assert_eq!(state.today.replies, MAX_DAILY_COUNT);
        assert_eq!(state.weekly.comparison_to_previous_week.replies, 0);
        assert_totals_match(state);

        let mut manager = fresh_at(wednesday());
        manager.set_count_at(Metric::Posts, MAX_DAILY_COUNT, wednesday());
        assert_eq!(manager.adjust_count_at(Metric::Posts, 1, wednesday()), MAX_DAILY_COUNT);
    }

    #[test]
    fn read_after_midnight_rolls_the_day() {
        let mut manager = fresh_at(at(2026, 1, 7, 22));
        manager.set_count_at(Metric::Replies, 6, at(2026, 1, 7, 22));
        assert!(!manager.refresh_day_at(at(2026, 1, 7, 23)));
        assert_eq!(manager.state().today.replies, 6);

        let after_midnight = at(2026, 1, 8, 1);
        assert!(manager.refresh_day_at(after_midnight));
        assert_eq!(manager.state().today.replies, 0);
        assert_eq!(manager.state().weekly.days[2].replies, 6);
        assert_eq!(manager.state().last_updated, after_midnight);
        assert!(!manager.refresh_day_at(after_midnight));

        let reloaded =
            ActivityManager::load_at(manager.into_store(), Capabilities::default(), after_midnight);
        assert_eq!(reloaded.load_outcome(), LoadOutcome::Restored);
        assert_eq!(reloaded.state().today.replies, 0);
    }

    #[test]
    fn corrupt_store_file_is_reported() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "engagement_manager_corrupt_{}_{nanos}.json",
            std::process::id()
        ));
        std::fs::write(&path, b"[[[").unwrap();

        let store = crate::storage::JsonFileStore::open(&path);
        let backup = store.backup_path();
        let manager = ActivityManager::load_at(store, Capabilities::default(), wednesday());

        assert_eq!(manager.load_outcome(), LoadOutcome::Fresh);
        assert!(matches!(
            manager.last_error(),
            Some(ActivityError::Storage(StorageError::Decode { .. }))
        ));

        std::fs::remove_file(backup).unwrap();
    }
}
