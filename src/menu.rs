//! Menu building and updating for the tray dropdown.
//!
//! Unlike a fixed menu, the session list changes shape at runtime, so
//! the whole menu is rebuilt whenever a preset is created, edited,
//! removed, or switched. In-place updates are only used for the ticking
//! status lines.

use crate::analytics::Analytics;
use crate::app::App;
use crate::models::TimerState;
use crate::timer::format_time;
use muda::accelerator::Accelerator;
use muda::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use std::collections::HashMap;
use thiserror::Error;

// Menu item IDs as constants
pub const ID_STATUS: &str = "status";
pub const ID_PROGRESS: &str = "progress";
pub const ID_STATS_TODAY: &str = "stats_today";
pub const ID_STATS_TOTAL: &str = "stats_total";
pub const ID_TOGGLE: &str = "toggle";
pub const ID_RESET: &str = "reset";
pub const ID_SKIP: &str = "skip";
pub const ID_NEW_SESSION: &str = "new_session";
pub const ID_REMOVE_SESSION: &str = "remove_session";
pub const ID_SOUND_TOGGLE: &str = "sound_toggle";
pub const ID_NOTIF_TOGGLE: &str = "notif_toggle";
pub const ID_QUIT: &str = "quit";

/// Prefix for per-preset switch items; the rest of the id is the preset id.
pub const SWITCH_PREFIX: &str = "switch_";
/// Prefix for active-session duration choices; the rest is minutes.
pub const DURATION_PREFIX: &str = "duration_";

/// Duration choices offered for the active session, in minutes.
pub const DURATION_CHOICES: [u32; 9] = [5, 10, 15, 20, 25, 30, 45, 60, 90];

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu error: {0}")]
    Muda(#[from] muda::Error),
}

/// Holds references to menu items that need dynamic updates.
pub struct MenuItems {
    pub status: MenuItem,
    pub progress: MenuItem,
    pub stats_today: MenuItem,
    pub stats_total: MenuItem,
    pub toggle: MenuItem,
    pub sound_toggle: CheckMenuItem,
    pub notif_toggle: CheckMenuItem,
    pub session_checks: HashMap<String, CheckMenuItem>,
    pub duration_checks: HashMap<u32, CheckMenuItem>,
}

/// Builds the complete menu structure from the current app state.
pub fn build_menu(app: &App) -> Result<(Menu, MenuItems), MenuError> {
    let menu = Menu::new();

    // Status display (disabled, info only)
    let status = MenuItem::with_id(
        MenuId::new(ID_STATUS),
        format_status(app),
        false, // disabled
        None::<Accelerator>,
    );
    menu.append(&status)?;

    // Progress bar (ASCII)
    let progress = MenuItem::with_id(
        MenuId::new(ID_PROGRESS),
        format_progress(&app.timer),
        false,
        None::<Accelerator>,
    );
    menu.append(&progress)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Analytics lines
    let stats_today = MenuItem::with_id(
        MenuId::new(ID_STATS_TODAY),
        format_stats_today(&app.analytics),
        false,
        None::<Accelerator>,
    );
    menu.append(&stats_today)?;

    let stats_total = MenuItem::with_id(
        MenuId::new(ID_STATS_TOTAL),
        format_stats_lifetime(&app.analytics),
        false,
        None::<Accelerator>,
    );
    menu.append(&stats_total)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Control buttons: one start/pause toggle plus reset and skip
    let toggle = MenuItem::with_id(
        MenuId::new(ID_TOGGLE),
        format_toggle_label(&app.timer),
        true,
        None::<Accelerator>,
    );
    let reset = MenuItem::with_id(MenuId::new(ID_RESET), "↺  Reset", true, None::<Accelerator>);
    let skip = MenuItem::with_id(MenuId::new(ID_SKIP), "⏭  Skip", true, None::<Accelerator>);

    menu.append(&toggle)?;
    menu.append(&reset)?;
    menu.append(&skip)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Sessions submenu
    let (sessions_menu, session_checks, duration_checks) = build_sessions_submenu(app)?;
    menu.append(&sessions_menu)?;

    // Settings submenu
    let (settings_menu, sound_toggle, notif_toggle) = build_settings_submenu(app)?;
    menu.append(&settings_menu)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Quit
    let quit = MenuItem::with_id(MenuId::new(ID_QUIT), "Quit Focusbar", true, None::<Accelerator>);
    menu.append(&quit)?;

    let items = MenuItems {
        status,
        progress,
        stats_today,
        stats_total,
        toggle,
        sound_toggle,
        notif_toggle,
        session_checks,
        duration_checks,
    };

    Ok((menu, items))
}

/// Type alias for the sessions submenu result to avoid clippy complexity warning.
type SessionsSubmenuResult = (
    Submenu,
    HashMap<String, CheckMenuItem>,
    HashMap<u32, CheckMenuItem>,
);

fn build_sessions_submenu(app: &App) -> Result<SessionsSubmenuResult, MenuError> {
    let active = app.catalog.active();
    let submenu = Submenu::new(format!("Sessions: {}", active.name), true);

    let mut session_checks = HashMap::new();
    for preset in app.catalog.presets() {
        let checked = preset.id == active.id;
        let item = CheckMenuItem::with_id(
            MenuId::new(format!("{}{}", SWITCH_PREFIX, preset.id)),
            format!("{} ({} min)", preset.name, preset.duration_mins()),
            true,
            checked,
            None::<Accelerator>,
        );
        submenu.append(&item)?;
        session_checks.insert(preset.id.clone(), item);
    }

    submenu.append(&PredefinedMenuItem::separator())?;

    // Duration choices for the active session
    let duration_sub = Submenu::new(
        format!("{}: {} min", active.name, active.duration_mins()),
        true,
    );
    let mut duration_checks = HashMap::new();
    for mins in DURATION_CHOICES {
        let checked = mins * 60 == active.duration_secs;
        let item = CheckMenuItem::with_id(
            MenuId::new(format!("{}{}", DURATION_PREFIX, mins)),
            format!("{} min", mins),
            true,
            checked,
            None::<Accelerator>,
        );
        duration_sub.append(&item)?;
        duration_checks.insert(mins, item);
    }
    submenu.append(&duration_sub)?;

    submenu.append(&PredefinedMenuItem::separator())?;

    let new_session = MenuItem::with_id(
        MenuId::new(ID_NEW_SESSION),
        "＋ New Session",
        true,
        None::<Accelerator>,
    );
    submenu.append(&new_session)?;

    // Removing the last session is refused by the catalog anyway; the
    // disabled item just makes the rule visible.
    let remove = MenuItem::with_id(
        MenuId::new(ID_REMOVE_SESSION),
        format!("Remove \"{}\"", active.name),
        app.catalog.presets().len() > 1,
        None::<Accelerator>,
    );
    submenu.append(&remove)?;

    Ok((submenu, session_checks, duration_checks))
}

fn build_settings_submenu(app: &App) -> Result<(Submenu, CheckMenuItem, CheckMenuItem), MenuError> {
    let submenu = Submenu::new("⚙  Settings", true);

    let sound_toggle = CheckMenuItem::with_id(
        MenuId::new(ID_SOUND_TOGGLE),
        "Sound Enabled",
        true,
        app.settings.sound_enabled,
        None::<Accelerator>,
    );
    submenu.append(&sound_toggle)?;

    let notif_toggle = CheckMenuItem::with_id(
        MenuId::new(ID_NOTIF_TOGGLE),
        "Notifications Enabled",
        true,
        app.settings.notifications_enabled,
        None::<Accelerator>,
    );
    submenu.append(&notif_toggle)?;

    Ok((submenu, sound_toggle, notif_toggle))
}

/// Updates the ticking lines and checkmarks in place. Catalog shape
/// changes go through a full rebuild instead.
pub fn update_menu_items(items: &MenuItems, app: &App) {
    items.status.set_text(format_status(app));
    items.progress.set_text(format_progress(&app.timer));
    items.stats_today.set_text(format_stats_today(&app.analytics));
    items.stats_total.set_text(format_stats_lifetime(&app.analytics));
    items.toggle.set_text(format_toggle_label(&app.timer));

    let active_id = app.catalog.active_id();
    for (id, check) in &items.session_checks {
        check.set_checked(id == active_id);
    }
    let active_secs = app.catalog.active().duration_secs;
    for (&mins, check) in &items.duration_checks {
        check.set_checked(mins * 60 == active_secs);
    }
}

/// Formats the status line for the menu.
pub fn format_status(app: &App) -> String {
    let name = &app.catalog.active().name;
    match &app.timer {
        TimerState::Running { remaining_secs, .. } => {
            format!("⏱  {} · {} remaining", name, format_time(*remaining_secs))
        }
        TimerState::Paused {
            remaining_secs,
            total_secs,
        } if remaining_secs < total_secs => {
            format!("⏸  {} · {} (paused)", name, format_time(*remaining_secs))
        }
        TimerState::Paused { .. } => format!("Ready to focus · {}", name),
    }
}

/// Formats the label of the start/pause toggle.
pub fn format_toggle_label(timer: &TimerState) -> String {
    if timer.is_running() {
        "⏸  Pause".to_string()
    } else {
        "▶  Start".to_string()
    }
}

/// Formats the progress bar for the menu.
pub fn format_progress(timer: &TimerState) -> String {
    let pct = timer.progress_percent();
    let filled = (pct * 20.0).round() as usize;
    let empty = 20 - filled;
    format!(
        "{}{}  {}%",
        "█".repeat(filled),
        "░".repeat(empty),
        (pct * 100.0).round() as u32
    )
}

/// Formats today's stats line.
pub fn format_stats_today(analytics: &Analytics) -> String {
    let count = analytics.today_sessions;
    let mins = analytics.today_focus_secs / 60;

    if count == 0 {
        "Today: —  0 (0 min)".to_string()
    } else {
        let dots = "●".repeat(count.min(10) as usize);
        let extra = if count > 10 {
            format!("+{}", count - 10)
        } else {
            String::new()
        };
        format!("Today: {}{}  {} ({} min)", dots, extra, count, mins)
    }
}

/// Formats the lifetime stats line.
pub fn format_stats_lifetime(analytics: &Analytics) -> String {
    format!(
        "All time: {} sessions · {} h · avg {} min",
        analytics.total_sessions,
        analytics.total_focus_secs / 3600,
        analytics.avg_session_secs() / 60
    )
}
