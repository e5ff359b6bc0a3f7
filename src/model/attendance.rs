use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status label written on first punch-in of a day.
pub const STATUS_PRESENT: &str = "Present";

/// One row per employee per calendar day. `punch_in`/`punch_out` describe
/// the open (or most recently closed) session; `accumulated_seconds` holds
/// the day's closed sessions and never decreases within the day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "2026-03-02T09:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub punch_in: Option<DateTime<Utc>>,
    #[schema(example = "2026-03-02T13:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub punch_out: Option<DateTime<Utc>>,
    #[schema(example = 14400)]
    pub accumulated_seconds: i64,
    #[schema(example = "Present")]
    pub status: String,
}

impl AttendanceRecord {
    /// A session is open when a punch-in has no matching punch-out yet.
    pub fn is_open(&self) -> bool {
        self.punch_in.is_some() && self.punch_out.is_none()
    }

    /// Seconds worked on this record's day as of `now`: the closed
    /// sessions, plus the running span while a session is open.
    pub fn total_seconds(&self, now: DateTime<Utc>) -> i64 {
        match self.punch_in {
            Some(punch_in) if self.punch_out.is_none() => {
                self.accumulated_seconds + session_seconds(punch_in, now)
            }
            _ => self.accumulated_seconds,
        }
    }
}

/// Non-negative span of a session. Clock skew can place `now` before the
/// stored punch-in; the span is clamped so accumulated totals never shrink.
pub fn session_seconds(punch_in: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - punch_in).num_seconds().max(0)
}

/// What a punch toggle has to do to today's record. Derived purely from
/// the fetched row so the toggle handler performs exactly one write.
#[derive(Debug, PartialEq, Eq)]
pub enum PunchAction {
    /// No record today yet: insert one opening a session now.
    Start,
    /// Today's record is closed: reopen it, restarting the session now.
    Reopen,
    /// Today's record is open: close it, folding the session span into
    /// the accumulated total.
    Close { session_seconds: i64 },
}

pub fn next_action(today: Option<&AttendanceRecord>, now: DateTime<Utc>) -> PunchAction {
    match today {
        None => PunchAction::Start,
        Some(rec) => match (rec.punch_in, rec.punch_out) {
            (Some(punch_in), None) => PunchAction::Close {
                session_seconds: session_seconds(punch_in, now),
            },
            _ => PunchAction::Reopen,
        },
    }
}

/// `HH:MM:SS` rendering used by the dashboard's timer and the summaries.
/// Hours are not wrapped at 24.
pub fn format_hms(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, s).unwrap()
    }

    fn record(
        punch_in: Option<DateTime<Utc>>,
        punch_out: Option<DateTime<Utc>>,
        accumulated: i64,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            employee_id: 7,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            punch_in,
            punch_out,
            accumulated_seconds: accumulated,
            status: STATUS_PRESENT.to_string(),
        }
    }

    #[test]
    fn first_punch_of_the_day_starts_a_session() {
        assert_eq!(next_action(None, at(9, 0, 0)), PunchAction::Start);
    }

    #[test]
    fn punching_an_open_session_closes_it() {
        let rec = record(Some(at(9, 0, 0)), None, 0);
        assert_eq!(
            next_action(Some(&rec), at(13, 0, 0)),
            PunchAction::Close {
                session_seconds: 14400
            }
        );
    }

    #[test]
    fn punching_a_closed_day_reopens_it() {
        let rec = record(Some(at(9, 0, 0)), Some(at(13, 0, 0)), 14400);
        assert_eq!(next_action(Some(&rec), at(13, 30, 0)), PunchAction::Reopen);
    }

    #[test]
    fn full_day_of_toggles_accumulates_each_closed_session() {
        // punch in 09:00, out 13:00, in again 13:30, out 14:00
        let mut acc = 0i64;

        assert_eq!(next_action(None, at(9, 0, 0)), PunchAction::Start);
        let open = record(Some(at(9, 0, 0)), None, acc);

        match next_action(Some(&open), at(13, 0, 0)) {
            PunchAction::Close { session_seconds } => acc += session_seconds,
            other => panic!("expected close, got {:?}", other),
        }
        assert_eq!(acc, 14400); // 4h

        let closed = record(Some(at(9, 0, 0)), Some(at(13, 0, 0)), acc);
        assert_eq!(next_action(Some(&closed), at(13, 30, 0)), PunchAction::Reopen);

        let reopened = record(Some(at(13, 30, 0)), None, acc);
        match next_action(Some(&reopened), at(14, 0, 0)) {
            PunchAction::Close { session_seconds } => acc += session_seconds,
            other => panic!("expected close, got {:?}", other),
        }
        assert_eq!(acc, 16200); // 4h30m
    }

    #[test]
    fn session_span_is_clamped_to_zero() {
        // now earlier than punch_in (skewed clock) must not shrink totals
        assert_eq!(session_seconds(at(10, 0, 0), at(9, 59, 0)), 0);

        let rec = record(Some(at(10, 0, 0)), None, 500);
        assert_eq!(rec.total_seconds(at(9, 0, 0)), 500);
    }

    #[test]
    fn open_record_total_grows_with_now() {
        let rec = record(Some(at(13, 30, 0)), None, 14400);
        let early = rec.total_seconds(at(13, 40, 0));
        let late = rec.total_seconds(at(14, 0, 0));
        assert_eq!(early, 15000);
        assert_eq!(late, 16200);
        assert!(early <= late);
    }

    #[test]
    fn closed_record_total_ignores_now() {
        let rec = record(Some(at(9, 0, 0)), Some(at(13, 0, 0)), 14400);
        assert_eq!(rec.total_seconds(at(18, 0, 0)), 14400);
    }

    #[test]
    fn missing_punch_in_is_not_an_open_session() {
        let rec = record(None, None, 300);
        assert!(!rec.is_open());
        assert_eq!(rec.total_seconds(at(12, 0, 0)), 300);
        // a corrupt row still toggles back into a usable open state
        assert_eq!(next_action(Some(&rec), at(12, 0, 0)), PunchAction::Reopen);
    }

    #[test]
    fn hms_formatting() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(14400), "04:00:00");
        assert_eq!(format_hms(16200), "04:30:00");
        assert_eq!(format_hms(90000), "25:00:00");
        assert_eq!(format_hms(-5), "00:00:00");
    }
}
