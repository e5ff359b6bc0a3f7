use chrono::NaiveDate;

/// Days covered by a leave request, both ends inclusive. A request whose
/// end precedes its start counts as zero (such rows are rejected at
/// creation; old data may still hold them).
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    (end - start).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_day_leave_counts_one() {
        assert_eq!(leave_days(d(2026, 5, 4), d(2026, 5, 4)), 1);
    }

    #[test]
    fn span_is_inclusive_on_both_ends() {
        assert_eq!(leave_days(d(2026, 5, 4), d(2026, 5, 8)), 5);
    }

    #[test]
    fn inverted_span_counts_zero() {
        assert_eq!(leave_days(d(2026, 5, 8), d(2026, 5, 4)), 0);
    }
}
