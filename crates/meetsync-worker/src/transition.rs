//! Pure slot status transition rules.

use chrono::{DateTime, Utc};

use meetsync_entity::slot::SlotStatus;
use meetsync_service::TimeWindow;

/// Compute the status a slot should hold at `now`.
///
/// Terminal statuses map to themselves unconditionally. For live
/// slots the window decides: before the start the slot stays
/// `Upcoming`, inside the window (end inclusive) it is `Ongoing`, and
/// past the end it lands in `Completed` when the call recorded at
/// least two participants, `Expired` otherwise. The participant
/// count must be read before the call record is deleted.
pub fn next_status(
    current: SlotStatus,
    now: DateTime<Utc>,
    window: &TimeWindow,
    participant_count: usize,
) -> SlotStatus {
    if current.is_terminal() {
        return current;
    }

    if now < window.start {
        SlotStatus::Upcoming
    } else if now <= window.end {
        SlotStatus::Ongoing
    } else if participant_count >= 2 {
        SlotStatus::Completed
    } else {
        SlotStatus::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window() -> TimeWindow {
        let start = Utc::now();
        TimeWindow {
            start,
            end: start + Duration::hours(1),
        }
    }

    #[test]
    fn window_position_drives_live_slots() {
        let w = window();
        let cases = [
            (w.start - Duration::minutes(1), 0, SlotStatus::Upcoming),
            (w.start, 0, SlotStatus::Ongoing),
            (w.end, 0, SlotStatus::Ongoing),
            (w.end + Duration::seconds(1), 0, SlotStatus::Expired),
            (w.end + Duration::seconds(1), 1, SlotStatus::Expired),
            (w.end + Duration::seconds(1), 2, SlotStatus::Completed),
            (w.end + Duration::seconds(1), 5, SlotStatus::Completed),
        ];

        for current in [SlotStatus::Upcoming, SlotStatus::Ongoing] {
            for (now, count, expected) in cases {
                assert_eq!(
                    next_status(current, now, &w, count),
                    expected,
                    "{current} at {now} with {count} participants"
                );
            }
        }
    }

    #[test]
    fn terminal_statuses_never_move() {
        let w = window();
        for status in [SlotStatus::Completed, SlotStatus::Expired] {
            for now in [
                w.start - Duration::hours(2),
                w.start + Duration::minutes(30),
                w.end + Duration::days(1),
            ] {
                assert_eq!(next_status(status, now, &w, 10), status);
            }
        }
    }
}
