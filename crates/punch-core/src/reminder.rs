//! Reminder trigger policy
//!
//! Pure decisions about which daily triggers have been reached and whether
//! their conditions still hold. Delivery lives in the scheduler.

use chrono::{DateTime, Local};
use punch_store::{ReminderKind, WorkSession};

/// Kinds whose wall-clock trigger has been reached today
pub fn due_kinds(now: DateTime<Local>) -> Vec<ReminderKind> {
    ReminderKind::ALL
        .into_iter()
        .filter(|kind| now.time() >= kind.trigger().to_naive_time())
        .collect()
}

/// Whether a reminder still makes sense given today's session.
///
/// The morning nag wants a check-in to exist; the evening and late nags
/// want an existing check-in to gain its check-out.
pub fn still_needed(kind: ReminderKind, session: Option<&WorkSession>) -> bool {
    match kind {
        ReminderKind::MorningCheckIn => session.is_none(),
        ReminderKind::EveningCheckOut | ReminderKind::LateCheckOut => {
            session.is_some_and(|s| !s.is_complete())
        }
    }
}

/// Webhook body for each reminder kind
pub fn reminder_message(kind: ReminderKind) -> &'static str {
    if kind.is_check_in() {
        "⏰ Time to check in! Don't forget to clock in for work."
    } else {
        "✅ Time to check out! Remember to clock out from work."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 16, hour, minute, 0).unwrap()
    }

    fn open_session() -> WorkSession {
        WorkSession {
            date: at(9, 0).date_naive(),
            check_in: at(9, 0),
            check_out: None,
            work_minutes: 480,
        }
    }

    #[test]
    fn due_kinds_accumulate_through_the_day() {
        assert!(due_kinds(at(9, 0)).is_empty());
        assert_eq!(due_kinds(at(9, 55)), vec![ReminderKind::MorningCheckIn]);
        assert_eq!(
            due_kinds(at(20, 30)),
            vec![ReminderKind::MorningCheckIn, ReminderKind::EveningCheckOut]
        );
        assert_eq!(due_kinds(at(23, 59)).len(), 3);
    }

    #[test]
    fn morning_wants_a_check_in() {
        assert!(still_needed(ReminderKind::MorningCheckIn, None));
        assert!(!still_needed(
            ReminderKind::MorningCheckIn,
            Some(&open_session())
        ));
    }

    #[test]
    fn evening_wants_a_check_out() {
        let open = open_session();
        let mut complete = open_session();
        complete.check_out = Some(at(17, 0));

        assert!(!still_needed(ReminderKind::EveningCheckOut, None));
        assert!(still_needed(ReminderKind::EveningCheckOut, Some(&open)));
        assert!(still_needed(ReminderKind::LateCheckOut, Some(&open)));
        assert!(!still_needed(ReminderKind::EveningCheckOut, Some(&complete)));
        assert!(!still_needed(ReminderKind::LateCheckOut, Some(&complete)));
    }

    #[test]
    fn messages_match_direction() {
        assert!(reminder_message(ReminderKind::MorningCheckIn).contains("check in"));
        assert!(reminder_message(ReminderKind::EveningCheckOut).contains("check out"));
        assert!(reminder_message(ReminderKind::LateCheckOut).contains("check out"));
    }
}
