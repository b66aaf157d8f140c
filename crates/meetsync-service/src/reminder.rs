//! Reminder scheduling rules and email content.

use chrono::{DateTime, Utc};

use meetsync_entity::slot::Slot;

/// Decide whether a reminder is due for a slot starting at `start`.
///
/// Reminders fire at three boundaries before the start: 24 hours,
/// 3 hours, and 5 minutes. The boundary tests are expressed on
/// truncated day/hour/minute counts so that a minute-resolution tick
/// lands exactly once in each window. A cooldown suppresses repeat
/// sends when ticks arrive faster than once per boundary.
pub fn reminder_due(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    last_sent: Option<DateTime<Utc>>,
    cooldown_seconds: i64,
) -> bool {
    let until = start - now;
    if until <= chrono::Duration::zero() {
        return false;
    }

    let days = until.num_days();
    let hours = until.num_hours();
    let minutes = until.num_minutes();

    let at_boundary = (days == 1 && hours % 24 == 0 && minutes % 60 == 0)
        || (days == 0 && hours == 3 && minutes % 60 == 0)
        || (days == 0 && hours == 0 && minutes == 5);
    if !at_boundary {
        return false;
    }

    match last_sent {
        Some(sent) => (now - sent).num_seconds() > cooldown_seconds,
        None => true,
    }
}

/// Subject line for a reminder email.
pub fn reminder_subject(slot: &Slot) -> String {
    format!("Reminder: \"{}\" is coming up", slot.title)
}

/// HTML body for a reminder email.
pub fn reminder_html(slot: &Slot, start: DateTime<Utc>) -> String {
    format!(
        "<div style=\"font-family:sans-serif\">\
         <h2>Your meeting is coming up</h2>\
         <p><strong>{}</strong> starts at {} ({} &ndash; {}).</p>\
         <p>Make sure you're ready to join on time.</p>\
         </div>",
        slot.title,
        start.format("%Y-%m-%d %H:%M UTC"),
        slot.duration_from,
        slot.duration_to,
    )
}
