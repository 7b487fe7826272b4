//daemon.rs
use crate::config;
use crate::gateway::HttpGateway;
use chrono::Local;
use std::{thread, time::Duration};

#[cfg(target_os = "linux")]
use notify_rust::Notification;

#[cfg(target_os = "windows")]
use notifica::notify;

#[cfg(target_os = "macos")]
use mac_notification_sys::*;

/// Reminder loop: once a minute, look up the signed-in user's incomplete
/// tasks due today and raise a desktop notification for each. Runs on its
/// own thread next to the TUI; a missing config or expired token just means
/// nothing to do this round.
pub fn start_daemon() -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let cfg = config::load();
        if cfg.is_complete() {
            if let Ok(gateway) = HttpGateway::new(&cfg) {
                if let Ok(Some(user)) = gateway.current_user() {
                    let today = Local::now().date_naive();
                    if let Ok(due) = gateway.list_tasks_due(&user.id, today) {
                        for task in &due {
                            #[cfg(target_os = "linux")]
                            Notification::new()
                                .summary("Task due today!")
                                .body(&format!(
                                    "\"{}\" is due today! Don't forget!",
                                    task.title
                                ))
                                .show()?;
                            #[cfg(target_os = "windows")]
                            {
                                notify(
                                    "MyTodo",
                                    &format!("\"{}\" is due today! Don't forget!", task.title),
                                );
                            }
                            #[cfg(target_os = "macos")]
                            {
                                send_notification(
                                    "MyTodo",
                                    &None,
                                    &format!("\"{}\" is due today! Don't forget!", task.title),
                                    None,
                                )?;
                            }
                        }
                    }
                }
            }
        }
        thread::sleep(Duration::from_secs(60));
    }
}
