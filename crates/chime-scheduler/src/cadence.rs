use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};

use crate::types::Cadence;

const HOUR_SECS: u64 = 3_600;
const DAY_SECS: u64 = 24 * HOUR_SECS;
const WEEK_SECS: u64 = 7 * DAY_SECS;

/// Compute the next occurrence of `cadence` strictly after `now`.
///
/// The candidate is built on the current hour/day/week. A candidate that
/// is not strictly after `now` (an exact match included) is pushed one
/// full cycle. Candidates always land on a whole minute.
pub fn next_fire(cadence: &Cadence, now: NaiveDateTime) -> NaiveDateTime {
    let midnight = now.date().and_time(NaiveTime::MIN);
    match *cadence {
        Cadence::Hourly { minute } => {
            // Candidate within the current hour.
            let candidate =
                midnight + Duration::hours(now.hour() as i64) + Duration::minutes(minute as i64);
            if candidate > now {
                candidate
            } else {
                candidate + Duration::hours(1)
            }
        }

        Cadence::Daily { hour, minute } => {
            // Today's candidate at HH:MM:00.
            let candidate =
                midnight + Duration::hours(hour as i64) + Duration::minutes(minute as i64);
            if candidate > now {
                candidate
            } else {
                // Today's occurrence has passed; roll to tomorrow.
                candidate + Duration::days(1)
            }
        }

        Cadence::Weekly {
            weekday,
            hour,
            minute,
        } => {
            // Days until the next-or-same target weekday.
            let days_ahead = (weekday.num_days_from_monday() as i64
                - now.weekday().num_days_from_monday() as i64)
                .rem_euclid(7);
            let candidate = midnight
                + Duration::days(days_ahead)
                + Duration::hours(hour as i64)
                + Duration::minutes(minute as i64);
            if candidate > now {
                candidate
            } else {
                // Already past this week's occurrence; push a full week.
                candidate + Duration::days(7)
            }
        }
    }
}

/// Delay from `now` until the next occurrence of `cadence`.
///
/// Strictly positive for any validated cadence, even when `now` carries
/// sub-second precision.
pub fn next_delay(cadence: &Cadence, now: NaiveDateTime) -> std::time::Duration {
    (next_fire(cadence, now) - now)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}

/// Fixed re-arm interval between consecutive firings of `cadence`.
pub fn interval(cadence: &Cadence) -> std::time::Duration {
    let secs = match cadence {
        Cadence::Hourly { .. } => HOUR_SECS,
        Cadence::Daily { .. } => DAY_SECS,
        Cadence::Weekly { .. } => WEEK_SECS,
    };
    std::time::Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn daily_one_minute_ahead_fires_in_sixty_seconds() {
        let cadence = Cadence::daily(14, 30).unwrap();
        let now = at(2024, 1, 1, 14, 29, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 1, 14, 30, 0));
        assert_eq!(next_delay(&cadence, now), std::time::Duration::from_secs(60));
    }

    #[test]
    fn daily_exact_match_pushes_one_day() {
        let cadence = Cadence::daily(14, 30).unwrap();
        let now = at(2024, 1, 1, 14, 30, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 2, 14, 30, 0));
        assert_eq!(
            next_delay(&cadence, now),
            std::time::Duration::from_secs(86_400)
        );
    }

    #[test]
    fn daily_time_already_passed_fires_tomorrow() {
        let cadence = Cadence::daily(6, 0).unwrap();
        let now = at(2024, 1, 1, 18, 45, 12);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 2, 6, 0, 0));
    }

    #[test]
    fn hourly_fires_within_the_current_hour() {
        let cadence = Cadence::hourly(45).unwrap();
        let now = at(2024, 1, 1, 10, 20, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 1, 10, 45, 0));
    }

    #[test]
    fn hourly_exact_match_pushes_one_hour() {
        let cadence = Cadence::hourly(15).unwrap();
        let now = at(2024, 1, 1, 10, 15, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 1, 11, 15, 0));
        assert_eq!(
            next_delay(&cadence, now),
            std::time::Duration::from_secs(3_600)
        );
    }

    #[test]
    fn hourly_minute_already_passed_rolls_to_next_hour() {
        let cadence = Cadence::hourly(15).unwrap();
        let now = at(2024, 1, 1, 23, 50, 0);
        // Crosses midnight.
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 2, 0, 15, 0));
    }

    #[test]
    fn weekly_fires_later_in_the_same_week() {
        // 2024-01-01 is a Monday.
        let cadence = Cadence::weekly(Weekday::Sun, 10, 0).unwrap();
        let now = at(2024, 1, 1, 10, 0, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 7, 10, 0, 0));
    }

    #[test]
    fn weekly_same_day_time_passed_pushes_one_week() {
        let cadence = Cadence::weekly(Weekday::Mon, 9, 0).unwrap();
        let now = at(2024, 1, 1, 10, 0, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 8, 9, 0, 0));
    }

    #[test]
    fn weekly_exact_match_pushes_one_week() {
        let cadence = Cadence::weekly(Weekday::Sun, 10, 0).unwrap();
        let now = at(2024, 1, 7, 10, 0, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 14, 10, 0, 0));
        assert_eq!(
            next_delay(&cadence, now),
            std::time::Duration::from_secs(604_800)
        );
    }

    #[test]
    fn weekly_target_earlier_in_week_wraps_forward() {
        // From Wednesday to the next Monday is five days.
        let cadence = Cadence::weekly(Weekday::Mon, 8, 30).unwrap();
        let now = at(2024, 1, 3, 12, 0, 0);
        assert_eq!(next_fire(&cadence, now), at(2024, 1, 8, 8, 30, 0));
    }

    #[test]
    fn sub_second_now_still_yields_positive_delay() {
        let cadence = Cadence::daily(14, 30).unwrap();
        let now = at(2024, 1, 1, 14, 30, 0).with_nanosecond(500_000_000).unwrap();
        let next = next_fire(&cadence, now);
        assert!(next > now);
        assert_eq!(next, at(2024, 1, 2, 14, 30, 0));
        assert!(next_delay(&cadence, now) > std::time::Duration::ZERO);
    }

    #[test]
    fn candidates_land_on_whole_minutes() {
        let cadence = Cadence::hourly(7).unwrap();
        let now = at(2024, 6, 15, 9, 7, 33).with_nanosecond(123_456_789).unwrap();
        let next = next_fire(&cadence, now);
        assert_eq!(next.second(), 0);
        assert_eq!(next.nanosecond(), 0);
        assert_eq!(next.minute(), 7);
    }

    #[test]
    fn hourly_delay_never_exceeds_one_hour() {
        let cadence = Cadence::hourly(0).unwrap();
        let now = at(2024, 1, 1, 5, 0, 0);
        assert_eq!(
            next_delay(&cadence, now),
            std::time::Duration::from_secs(3_600)
        );
    }

    #[test]
    fn intervals_match_cadence_kind() {
        assert_eq!(
            interval(&Cadence::hourly(0).unwrap()),
            std::time::Duration::from_secs(3_600)
        );
        assert_eq!(
            interval(&Cadence::daily(0, 0).unwrap()),
            std::time::Duration::from_secs(86_400)
        );
        assert_eq!(
            interval(&Cadence::weekly(Weekday::Mon, 0, 0).unwrap()),
            std::time::Duration::from_secs(604_800)
        );
    }
}
