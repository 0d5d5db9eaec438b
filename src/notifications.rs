//! System notifications for session completion.

use log::warn;
use notify_rust::Notification;
use std::thread;

/// Shows a notification when a session completes.
/// Runs in a background thread; failure never reaches the timer engine.
pub fn notify_session_complete(session_name: &str, completed_today: u32) {
    let session_name = session_name.to_string();
    thread::spawn(move || {
        let body = if completed_today == 1 {
            format!("{} finished. First session of the day!", session_name)
        } else {
            format!(
                "{} finished. {} sessions completed today.",
                session_name, completed_today
            )
        };

        if let Err(e) = Notification::new()
            .summary("Session Complete!")
            .body(&body)
            .sound_name("default")
            .show()
        {
            warn!("failed to show notification: {}", e);
        }
    });
}
