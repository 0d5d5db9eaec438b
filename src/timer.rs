//! Timer tick loop driving the countdown once per second.

use crate::app::{App, CompletionEvent};
use crate::models::TimerState;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Message sent from the timer thread to the main thread.
#[derive(Debug, Clone)]
pub enum TimerMessage {
    /// Timer state has changed, UI needs update.
    StateChanged { title: String },
    /// A session completed, trigger notification/sound.
    Completed(CompletionEvent),
}

/// Runs the timer loop, ticking every second.
/// Sends messages to the main thread via the provided channel.
///
/// This is the only place ticks originate, and the whole
/// decrement -> zero-check -> completion -> re-arm sequence runs under
/// the app mutex, so a tick can never race a menu-driven reset or
/// switch: it either observes the state before the operation or the
/// re-armed state after it, never something in between.
pub fn run_timer_loop(app: Arc<Mutex<App>>, tx: Sender<TimerMessage>) {
    loop {
        thread::sleep(Duration::from_secs(1));

        let message = {
            let mut app = app.lock().unwrap();

            // Check for day rollover
            app.check_day_rollover();

            // Tick the timer
            let (changed, completion) = app.tick();

            if let Some(event) = completion {
                let _ = tx.send(TimerMessage::Completed(event));
            }

            if changed {
                let title = format_tray_title(&app.timer);
                Some(TimerMessage::StateChanged { title })
            } else {
                None
            }
        };

        if let Some(msg) = message {
            let _ = tx.send(msg);
        }
    }
}

/// Formats the tray title based on current timer state.
pub fn format_tray_title(timer: &TimerState) -> String {
    match timer {
        TimerState::Running { remaining_secs, .. } => {
            format!("▶ {}", format_time(*remaining_secs))
        }
        TimerState::Paused {
            remaining_secs,
            total_secs,
        } if remaining_secs < total_secs => {
            format!("⏸ {}", format_time(*remaining_secs))
        }
        TimerState::Paused { .. } => "⏱".to_string(),
    }
}

/// Formats seconds as MM:SS, or H:MM:SS for durations of an hour or more.
pub fn format_time(secs: u32) -> String {
    let hrs = secs / 3600;
    let mins = (secs % 3600) / 60;
    let rem = secs % 60;
    if hrs > 0 {
        format!("{}:{:02}:{:02}", hrs, mins, rem)
    } else {
        format!("{:02}:{:02}", mins, rem)
    }
}
