//! Main application state and logic.

use crate::analytics::Analytics;
use crate::catalog::{CatalogError, SessionCatalog};
use crate::models::{SessionPatch, SessionPreset, Settings, TimerState};
use crate::persistence::{
    Store, StoreError, KEY_ACTIVE_SESSION, KEY_ANALYTICS, KEY_SESSIONS, KEY_SETTINGS,
};
use chrono::Local;
use log::warn;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Fired exactly once when a running countdown reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEvent {
    pub session_id: String,
    pub session_name: String,
    pub duration_secs: u32,
    /// Sessions completed today, including this one.
    pub completed_today: u32,
}

/// Application state: the session catalog, the countdown engine, the
/// analytics counters, and the store they persist through.
///
/// All mutation goes through one instance behind a mutex, so a tick and
/// a menu event can never interleave mid-transition.
pub struct App {
    pub timer: TimerState,
    pub catalog: SessionCatalog,
    pub analytics: Analytics,
    pub settings: Settings,
    pub store: Store,
}

impl App {
    /// Creates the application, loading persisted state. When the
    /// on-disk database cannot be opened the app degrades to an
    /// in-memory store and keeps working for the process lifetime.
    pub fn new() -> Result<Self, AppError> {
        let store = match Store::new() {
            Ok(store) => store,
            Err(e) => {
                warn!("cannot open database, running in memory only: {}", e);
                Store::open_in_memory()?
            }
        };
        Ok(Self::from_store(store))
    }

    /// Creates an app over a specific store (for testing).
    #[cfg(test)]
    pub fn with_store(store: Store) -> Self {
        Self::from_store(store)
    }

    fn from_store(store: Store) -> Self {
        let presets: Vec<SessionPreset> = load_or_default(&store, KEY_SESSIONS, Vec::new);
        let active_id: String = load_or_default(&store, KEY_ACTIVE_SESSION, String::new);
        let catalog = SessionCatalog::from_parts(presets, active_id);

        let analytics: Analytics = load_or_default(&store, KEY_ANALYTICS, Analytics::default);
        let settings: Settings = load_or_default(&store, KEY_SETTINGS, Settings::default);

        let timer = TimerState::armed(catalog.active().duration_secs);

        let mut app = Self {
            timer,
            catalog,
            analytics,
            settings,
            store,
        };
        // The today bucket may be stale if the app was last run on an
        // earlier calendar day.
        app.check_day_rollover();
        app
    }

    // --- Timer engine -----------------------------------------------------

    /// The single start/pause control: starts a stopped countdown,
    /// pauses a running one. Starting requires time on the clock.
    pub fn toggle_timer(&mut self) {
        match self.timer {
            TimerState::Paused {
                remaining_secs,
                total_secs,
            } if remaining_secs > 0 => {
                self.timer = TimerState::Running {
                    remaining_secs,
                    total_secs,
                };
            }
            TimerState::Running {
                remaining_secs,
                total_secs,
            } => {
                self.timer = TimerState::Paused {
                    remaining_secs,
                    total_secs,
                };
            }
            TimerState::Paused { .. } => {}
        }
    }

    /// Stops the countdown and restores the active session's full
    /// duration. Never emits a completion event.
    pub fn reset_timer(&mut self) {
        self.timer = TimerState::armed(self.catalog.active().duration_secs);
    }

    /// Skipping forfeits the session: same contract as reset, and no
    /// analytics credit is awarded.
    pub fn skip_timer(&mut self) {
        self.reset_timer();
    }

    /// Advances the countdown by one second.
    /// Returns (state_changed, optional_completion_event).
    ///
    /// The zero-crossing tick itself completes the session: credit the
    /// analytics, hand the event to the caller, and re-arm at the full
    /// duration without auto-starting. A re-armed timer holds a positive
    /// remaining time, so a given countdown can complete at most once.
    pub fn tick(&mut self) -> (bool, Option<CompletionEvent>) {
        match &mut self.timer {
            TimerState::Running { remaining_secs, .. } if *remaining_secs > 0 => {
                *remaining_secs -= 1;
                if *remaining_secs == 0 {
                    let event = self.finish_session();
                    (true, Some(event))
                } else {
                    (true, None)
                }
            }
            _ => (false, None),
        }
    }

    fn finish_session(&mut self) -> CompletionEvent {
        let preset = self.catalog.active().clone();

        self.analytics.record_completion(preset.duration_secs);
        self.persist_analytics();

        self.timer = TimerState::armed(preset.duration_secs);

        CompletionEvent {
            session_id: preset.id,
            session_name: preset.name,
            duration_secs: preset.duration_secs,
            completed_today: self.analytics.today_sessions,
        }
    }

    /// Zeroes the today bucket when the local calendar day has advanced.
    /// Runs at startup and from the tick loop; a no-op within a day.
    pub fn check_day_rollover(&mut self) -> bool {
        let rolled = self.analytics.check_day_rollover(Local::now().date_naive());
        if rolled {
            self.persist_analytics();
        }
        rolled
    }

    // --- Session catalog --------------------------------------------------

    /// Adds a preset without switching to it. Returns the new id.
    pub fn create_session(&mut self, name: &str, duration_mins: u32) -> Result<String, CatalogError> {
        let id = self.catalog.create(name, duration_mins)?.id;
        self.persist_sessions();
        Ok(id)
    }

    /// Applies a partial edit. Editing the active session stops the
    /// countdown and resyncs it to the new duration; partial progress
    /// is discarded, not prorated.
    pub fn update_session(&mut self, id: &str, patch: SessionPatch) -> Result<(), CatalogError> {
        self.catalog.update(id, patch)?;
        if id == self.catalog.active_id() {
            self.reset_timer();
        }
        self.persist_sessions();
        Ok(())
    }

    /// Removes a preset. Refused for the last one. Removing the active
    /// preset moves the pointer to the first remaining preset and
    /// resyncs the countdown.
    pub fn remove_session(&mut self, id: &str) -> Result<(), CatalogError> {
        let reassigned = self.catalog.remove(id)?;
        if reassigned {
            self.reset_timer();
            self.persist_active();
        }
        self.persist_sessions();
        Ok(())
    }

    /// Makes a preset active. Switching never carries over partial
    /// progress and never auto-starts.
    pub fn switch_session(&mut self, id: &str) -> Result<(), CatalogError> {
        self.catalog.switch_to(id)?;
        self.reset_timer();
        self.persist_active();
        Ok(())
    }

    // --- Settings ---------------------------------------------------------

    /// Updates a setting and saves to the store.
    pub fn update_setting<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut Settings),
    {
        updater(&mut self.settings);
        self.persist_settings();
    }

    // --- Persistence (best-effort; warnings, never errors) ---------------

    fn persist_sessions(&self) {
        if let Err(e) = self.store.save(KEY_SESSIONS, self.catalog.presets()) {
            warn!("failed to persist sessions: {}", e);
        }
    }

    fn persist_active(&self) {
        if let Err(e) = self.store.save(KEY_ACTIVE_SESSION, self.catalog.active_id()) {
            warn!("failed to persist active session: {}", e);
        }
    }

    fn persist_analytics(&self) {
        if let Err(e) = self.store.save(KEY_ANALYTICS, &self.analytics) {
            warn!("failed to persist analytics: {}", e);
        }
    }

    fn persist_settings(&self) {
        if let Err(e) = self.store.save(KEY_SETTINGS, &self.settings) {
            warn!("failed to persist settings: {}", e);
        }
    }
}

/// Loads a value, falling back to the default on a missing key or a
/// corrupt row. Only the corrupt case is worth a warning.
fn load_or_default<T, F>(store: &Store, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match store.load(key) {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(e) => {
            warn!("failed to load '{}', using defaults: {}", key, e);
            default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Store;
    use chrono::NaiveDate;

    fn create_test_app() -> App {
        let store = Store::open_in_memory().unwrap();
        App::with_store(store)
    }

    #[test]
    fn test_initial_state() {
        let app = create_test_app();
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 25 * 60);
        assert_eq!(app.catalog.active_id(), "work");
        assert_eq!(app.settings, Settings::default());
        assert_eq!(app.analytics.total_sessions, 0);
    }

    #[test]
    fn test_toggle_starts_and_pauses() {
        let mut app = create_test_app();

        app.toggle_timer();
        assert!(app.timer.is_running());

        for _ in 0..10 {
            app.tick();
        }
        assert_eq!(app.timer.remaining_secs(), 25 * 60 - 10);

        app.toggle_timer();
        assert!(!app.timer.is_running());
        let remaining_before = app.timer.remaining_secs();

        // Ticks are ignored while paused.
        let (changed, event) = app.tick();
        assert!(!changed);
        assert!(event.is_none());
        assert_eq!(app.timer.remaining_secs(), remaining_before);

        app.toggle_timer();
        assert!(app.timer.is_running());
    }

    #[test]
    fn test_n_ticks_decrement_without_completion() {
        let mut app = create_test_app();
        app.toggle_timer();

        let mut events = 0;
        for _ in 0..100 {
            let (_, event) = app.tick();
            if event.is_some() {
                events += 1;
            }
        }

        assert_eq!(app.timer.remaining_secs(), 25 * 60 - 100);
        assert_eq!(events, 0);
    }

    #[test]
    fn test_zero_crossing_fires_exactly_one_completion() {
        let mut app = create_test_app();
        app.timer = TimerState::Running {
            remaining_secs: 1,
            total_secs: 25 * 60,
        };

        let (changed, event) = app.tick();
        assert!(changed);
        let event = event.unwrap();
        assert_eq!(event.session_id, "work");
        assert_eq!(event.session_name, "Work");
        assert_eq!(event.duration_secs, 25 * 60);
        assert_eq!(event.completed_today, 1);

        // Re-armed at the full duration, stopped, and no further event.
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 25 * 60);
        let (changed, event) = app.tick();
        assert!(!changed);
        assert!(event.is_none());
    }

    #[test]
    fn test_full_countdown_completes_once() {
        let mut app = create_test_app();
        app.update_session("work", SessionPatch::duration(1)).unwrap();
        app.toggle_timer();

        let mut events = Vec::new();
        for _ in 0..60 {
            let (_, event) = app.tick();
            if let Some(e) = event {
                events.push(e);
            }
        }

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].duration_secs, 60);
        assert_eq!(app.analytics.total_sessions, 1);
        assert_eq!(app.analytics.total_focus_secs, 60);
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 60);
    }

    #[test]
    fn test_completion_accumulates_analytics() {
        let mut app = create_test_app();

        for _ in 0..3 {
            app.timer = TimerState::Running {
                remaining_secs: 1,
                total_secs: 25 * 60,
            };
            app.tick();
        }

        assert_eq!(app.analytics.total_sessions, 3);
        assert_eq!(app.analytics.total_focus_secs, 4500);
        assert_eq!(app.analytics.today_sessions, 3);
        assert_eq!(app.analytics.today_focus_secs, 4500);

        // Persisted after each completion.
        let stored: Analytics = app.store.load(KEY_ANALYTICS).unwrap().unwrap();
        assert_eq!(stored.total_sessions, 3);
    }

    #[test]
    fn test_reset_discards_progress_without_event() {
        let mut app = create_test_app();
        app.toggle_timer();
        for _ in 0..120 {
            app.tick();
        }

        app.reset_timer();
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 25 * 60);
        assert_eq!(app.analytics.total_sessions, 0);
    }

    #[test]
    fn test_skip_matches_reset_and_awards_no_credit() {
        let mut app = create_test_app();
        app.toggle_timer();
        for _ in 0..120 {
            app.tick();
        }

        app.skip_timer();
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 25 * 60);
        assert_eq!(app.analytics.total_sessions, 0);
        assert_eq!(app.analytics.today_sessions, 0);
    }

    #[test]
    fn test_switch_discards_progress_without_event() {
        let mut app = create_test_app();
        app.toggle_timer();
        for _ in 0..100 {
            app.tick();
        }
        assert!(app.timer.is_running());

        app.switch_session("short-break").unwrap();

        assert_eq!(app.catalog.active_id(), "short-break");
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 5 * 60);
        assert_eq!(app.analytics.total_sessions, 0);
    }

    #[test]
    fn test_switch_then_reset_holds_full_duration() {
        let mut app = create_test_app();
        app.switch_session("long-break").unwrap();
        app.reset_timer();

        assert_eq!(app.timer.remaining_secs(), 15 * 60);
        assert!(!app.timer.is_running());
    }

    #[test]
    fn test_switch_persists_active_pointer() {
        let mut app = create_test_app();
        app.switch_session("long-break").unwrap();

        let stored: String = app.store.load(KEY_ACTIVE_SESSION).unwrap().unwrap();
        assert_eq!(stored, "long-break");
    }

    #[test]
    fn test_editing_active_session_stops_and_resyncs() {
        let mut app = create_test_app();
        app.toggle_timer();
        for _ in 0..100 {
            app.tick();
        }

        app.update_session("work", SessionPatch::duration(50)).unwrap();

        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 50 * 60);
    }

    #[test]
    fn test_editing_inactive_session_leaves_timer_alone() {
        let mut app = create_test_app();
        app.toggle_timer();
        for _ in 0..100 {
            app.tick();
        }

        app.update_session("short-break", SessionPatch::duration(10))
            .unwrap();

        assert!(app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 25 * 60 - 100);
    }

    #[test]
    fn test_rejected_edit_mutates_nothing() {
        let mut app = create_test_app();
        app.toggle_timer();
        for _ in 0..10 {
            app.tick();
        }

        let err = app
            .update_session("work", SessionPatch::duration(0))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 25 * 60 - 10);
    }

    #[test]
    fn test_removing_active_session_reassigns_and_resyncs() {
        let mut app = create_test_app();
        app.toggle_timer();
        for _ in 0..100 {
            app.tick();
        }

        app.remove_session("work").unwrap();

        assert_eq!(app.catalog.active_id(), "short-break");
        assert!(!app.timer.is_running());
        assert_eq!(app.timer.remaining_secs(), 5 * 60);
    }

    #[test]
    fn test_removing_last_session_refused() {
        let mut app = create_test_app();
        app.remove_session("short-break").unwrap();
        app.remove_session("long-break").unwrap();

        let err = app.remove_session("work").unwrap_err();
        assert_eq!(err, CatalogError::LastSession);
        assert_eq!(app.catalog.presets().len(), 1);
    }

    #[test]
    fn test_create_session_persists_catalog() {
        let mut app = create_test_app();
        let id = app.create_session("Deep Work", 50).unwrap();

        let stored: Vec<SessionPreset> = app.store.load(KEY_SESSIONS).unwrap().unwrap();
        assert_eq!(stored.len(), 4);
        assert!(stored.iter().any(|p| p.id == id));
    }

    #[test]
    fn test_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusbar.db");

        let id = {
            let mut app = App::with_store(Store::open(&path).unwrap());
            let id = app.create_session("Deep Work", 50).unwrap();
            app.switch_session(&id).unwrap();
            app.timer = TimerState::Running {
                remaining_secs: 1,
                total_secs: 50 * 60,
            };
            app.tick();
            id
        };

        let app = App::with_store(Store::open(&path).unwrap());
        assert_eq!(app.catalog.presets().len(), 4);
        assert_eq!(app.catalog.active_id(), id);
        assert_eq!(app.timer.remaining_secs(), 50 * 60);
        assert_eq!(app.analytics.total_sessions, 1);
        assert_eq!(app.analytics.total_focus_secs, 3000);
    }

    #[test]
    fn test_stale_today_bucket_rolls_over_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusbar.db");

        {
            let store = Store::open(&path).unwrap();
            let stale = Analytics {
                total_sessions: 10,
                total_focus_secs: 15000,
                today_sessions: 4,
                today_focus_secs: 6000,
                last_reset_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            };
            store.save(KEY_ANALYTICS, &stale).unwrap();
        }

        let app = App::with_store(Store::open(&path).unwrap());
        assert_eq!(app.analytics.today_sessions, 0);
        assert_eq!(app.analytics.today_focus_secs, 0);
        assert_eq!(app.analytics.total_sessions, 10);
        assert_eq!(app.analytics.last_reset_date, Local::now().date_naive());

        // The rollover itself was persisted.
        let stored: Analytics = app.store.load(KEY_ANALYTICS).unwrap().unwrap();
        assert_eq!(stored.today_sessions, 0);
    }

    #[test]
    fn test_corrupt_catalog_falls_back_to_builtins() {
        let store = Store::open_in_memory().unwrap();
        // Wrong shape under the sessions key.
        store.save(KEY_SESSIONS, &42).unwrap();

        let app = App::with_store(store);
        assert_eq!(app.catalog.presets().len(), 3);
        assert_eq!(app.catalog.active_id(), "work");
    }

    #[test]
    fn test_update_setting_persists() {
        let mut app = create_test_app();
        app.update_setting(|s| s.sound_enabled = false);

        assert!(!app.settings.sound_enabled);
        let stored: Settings = app.store.load(KEY_SETTINGS).unwrap().unwrap();
        assert!(!stored.sound_enabled);
    }
}
