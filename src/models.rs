//! Data models for the Focusbar application.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named countdown preset: the unit a user focuses in.
///
/// The three built-in presets (Work, Short Break, Long Break) are seeded
/// on first launch; user-created presets get a fresh UUID id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionPreset {
    /// Stable identifier, immutable after creation.
    pub id: String,
    /// Display label, never empty.
    pub name: String,
    /// Countdown length in seconds, always positive.
    pub duration_secs: u32,
    /// Display accent color, behaviorally inert.
    pub color: String,
    /// Marks the seeded presets. Informational only; deletion is guarded
    /// by the last-remaining-session invariant, not by this flag.
    #[serde(default)]
    pub is_default: bool,
}

impl SessionPreset {
    /// Creates a user preset with a fresh id and the default accent.
    pub fn new(name: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            duration_secs,
            color: ACCENT_PRIMARY.to_string(),
            is_default: false,
        }
    }

    pub fn duration_mins(&self) -> u32 {
        self.duration_secs / 60
    }
}

pub const ACCENT_PRIMARY: &str = "#2563eb";
pub const ACCENT_SUCCESS: &str = "#059669";
pub const ACCENT_WARNING: &str = "#d97706";

/// The presets seeded when the catalog is empty or unreadable.
pub fn builtin_presets() -> Vec<SessionPreset> {
    vec![
        SessionPreset {
            id: "work".to_string(),
            name: "Work".to_string(),
            duration_secs: 25 * 60,
            color: ACCENT_PRIMARY.to_string(),
            is_default: true,
        },
        SessionPreset {
            id: "short-break".to_string(),
            name: "Short Break".to_string(),
            duration_secs: 5 * 60,
            color: ACCENT_SUCCESS.to_string(),
            is_default: true,
        },
        SessionPreset {
            id: "long-break".to_string(),
            name: "Long Break".to_string(),
            duration_secs: 15 * 60,
            color: ACCENT_WARNING.to_string(),
            is_default: true,
        },
    ]
}

/// A partial edit of a preset. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub duration_mins: Option<u32>,
}

impl SessionPatch {
    pub fn duration(mins: u32) -> Self {
        Self {
            name: None,
            duration_mins: Some(mins),
        }
    }
}

/// Countdown state machine for the active session.
///
/// Idle and paused are the same state: not running, some time remaining.
/// Completion is instantaneous inside the tick that reaches zero; the
/// timer re-arms to the full duration and comes to rest here as Paused.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerState {
    /// Not counting down. Holds remaining time, at most the full duration.
    Paused { remaining_secs: u32, total_secs: u32 },
    /// Counting down one second per tick.
    Running { remaining_secs: u32, total_secs: u32 },
}

impl TimerState {
    /// A stopped timer holding the full duration of a session.
    pub fn armed(total_secs: u32) -> Self {
        Self::Paused {
            remaining_secs: total_secs,
            total_secs,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn remaining_secs(&self) -> u32 {
        match self {
            Self::Paused { remaining_secs, .. } | Self::Running { remaining_secs, .. } => {
                *remaining_secs
            }
        }
    }

    pub fn total_secs(&self) -> u32 {
        match self {
            Self::Paused { total_secs, .. } | Self::Running { total_secs, .. } => *total_secs,
        }
    }

    /// Elapsed fraction of the countdown (0.0 to 1.0).
    pub fn progress_percent(&self) -> f32 {
        let total = self.total_secs();
        if total == 0 {
            return 1.0;
        }
        1.0 - (self.remaining_secs() as f32 / total as f32)
    }
}

/// User-configurable settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Whether to play a chime on session completion.
    pub sound_enabled: bool,
    /// Whether to show system notifications on session completion.
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}
