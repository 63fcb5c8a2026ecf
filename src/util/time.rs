//! Unix-time conversions and month arithmetic
//!
//! Unix time is whole seconds since 1970-01-01T00:00:00Z. All functions are
//! generic over [`chrono::TimeZone`], so they work with `Utc`, `Local`,
//! `FixedOffset` and Olson zones from [`timezone`] alike.

use chrono::{DateTime, Months, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::{Result, SsError};

/// Look up a timezone by its Olson name, e.g. `Europe/London`
///
/// # Examples
/// ```
/// use ss_utilities::util::time::timezone;
///
/// assert!(timezone("Europe/London").is_ok());
/// assert!(timezone("Mars/Olympus_Mons").is_err());
/// ```
pub fn timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| SsError::InvalidInput(format!("Unknown timezone '{}': {}", name, e)))
}

/// Convert a timezone-aware datetime into Unix time
///
/// Sub-second precision is truncated.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use ss_utilities::util::time::to_unixtime;
///
/// let dt = Utc.with_ymd_and_hms(2001, 9, 9, 1, 46, 40).unwrap();
/// assert_eq!(to_unixtime(&dt), 1_000_000_000);
/// ```
pub fn to_unixtime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> i64 {
    datetime.timestamp()
}

/// Localize a wall-clock datetime into `tz` and convert it into Unix time
///
/// Ambiguous wall-clock times (the repeated hour when clocks go back) resolve
/// to the earliest instant. Times skipped when clocks go forward do not exist
/// and are rejected.
pub fn to_unixtime_in<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Result<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| {
            SsError::InvalidInput(format!("{} does not exist in the given timezone", naive))
        })
}

/// Convert Unix time into a timezone-aware datetime in `tz`
///
/// # Examples
/// ```
/// use chrono::{FixedOffset, Timelike};
/// use ss_utilities::util::time::from_unixtime;
///
/// let cet = FixedOffset::east_opt(3600).unwrap();
/// let dt = from_unixtime(0, &cet).unwrap();
/// assert_eq!(dt.hour(), 1);
/// ```
pub fn from_unixtime<Tz: TimeZone>(unixtime: i64, tz: &Tz) -> Result<DateTime<Tz>> {
    tz.timestamp_opt(unixtime, 0)
        .single()
        .ok_or_else(|| SsError::InvalidInput(format!("Unix time {} is out of range", unixtime)))
}

/// Add (or with a negative `delta`, subtract) whole calendar months
///
/// The time of day is kept and the day of month is clamped to the length of
/// the target month, so 31 January plus one month is the last day of
/// February.
///
/// # Examples
/// ```
/// use chrono::{Datelike, TimeZone, Utc};
/// use ss_utilities::util::time::month_delta;
///
/// let dt = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
/// assert_eq!(month_delta(&dt, 1).unwrap().day(), 29);
/// assert_eq!(month_delta(&dt, -2).unwrap().month(), 11);
/// ```
pub fn month_delta<Tz: TimeZone>(datetime: &DateTime<Tz>, delta: i32) -> Result<DateTime<Tz>> {
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        datetime.clone().checked_add_months(months)
    } else {
        datetime.clone().checked_sub_months(months)
    };

    shifted.ok_or_else(|| {
        SsError::InvalidInput(format!(
            "cannot shift {:?} by {} months",
            datetime.naive_local(),
            delta
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, NaiveDate, Timelike, Utc};

    #[test]
    fn test_to_unixtime() {
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_unixtime(&epoch), 0);

        let before = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(to_unixtime(&before), -60);

        // The same instant in another offset has the same Unix time.
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = east.with_ymd_and_hms(1970, 1, 1, 2, 0, 0).unwrap();
        assert_eq!(to_unixtime(&local), 0);
    }

    #[test]
    fn test_to_unixtime_in() {
        let naive = NaiveDate::from_ymd_opt(2015, 1, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let utc_secs = to_unixtime_in(naive, &Utc).unwrap();

        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        let west_secs = to_unixtime_in(naive, &west).unwrap();
        assert_eq!(west_secs - utc_secs, 5 * 3600);
    }

    #[test]
    fn test_to_unixtime_in_ambiguous_takes_earliest() {
        // Clocks go back at 02:00 BST, so 01:30 happens twice.
        let london = timezone("Europe/London").unwrap();
        let naive = NaiveDate::from_ymd_opt(2023, 10, 29)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(to_unixtime_in(naive, &london).unwrap(), 1_698_539_400);
    }

    #[test]
    fn test_to_unixtime_in_rejects_skipped_time() {
        // Clocks go forward at 01:00 GMT, so 01:30 never happens.
        let london = timezone("Europe/London").unwrap();
        let naive = NaiveDate::from_ymd_opt(2023, 3, 26)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert!(matches!(
            to_unixtime_in(naive, &london),
            Err(SsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_timezone_lookup() {
        assert_eq!(timezone(" UTC ").unwrap(), Tz::UTC);
        assert!(matches!(timezone("Europe/Nowhere"), Err(SsError::InvalidInput(_))));
    }

    #[test]
    fn test_round_trip() {
        let tz = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let original = tz.with_ymd_and_hms(2018, 9, 4, 17, 45, 12).unwrap();
        let back = from_unixtime(to_unixtime(&original), &tz).unwrap();
        assert_eq!(back, original);
        assert_eq!(back.offset(), original.offset());
    }

    #[test]
    fn test_from_unixtime() {
        let dt = from_unixtime(86_400 + 3_661, &Utc).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (1970, 1, 2));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (1, 1, 1));

        assert!(from_unixtime(i64::MAX, &Utc).is_err());
        assert!(from_unixtime(i64::MIN, &Utc).is_err());
    }

    #[test]
    fn test_round_trip_negative_and_extreme() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        for secs in [-1, -2_208_945_600, -62_135_596_800, 253_402_300_799] {
            let dt = from_unixtime(secs, &tz).unwrap();
            assert_eq!(to_unixtime(&dt), secs);
        }

        let first = from_unixtime(-62_135_596_800, &Utc).unwrap();
        assert_eq!((first.year(), first.month(), first.day()), (1, 1, 1));

        let london = timezone("Europe/London").unwrap();
        let dt = from_unixtime(-2_208_945_600, &london).unwrap();
        assert_eq!(to_unixtime(&dt), -2_208_945_600);
    }

    #[test]
    fn test_month_delta_clamps_to_target_month() {
        let dt = Utc.with_ymd_and_hms(2023, 1, 31, 8, 30, 0).unwrap();
        let feb = month_delta(&dt, 1).unwrap();
        assert_eq!((feb.month(), feb.day()), (2, 28));
        assert_eq!((feb.hour(), feb.minute()), (8, 30));

        let apr = month_delta(&dt, 3).unwrap();
        assert_eq!((apr.month(), apr.day()), (4, 30));
    }

    #[test]
    fn test_month_delta_crosses_years() {
        let dt = Utc.with_ymd_and_hms(2020, 11, 15, 0, 0, 0).unwrap();

        let next = month_delta(&dt, 2).unwrap();
        assert_eq!((next.year(), next.month()), (2021, 1));

        let prev = month_delta(&dt, -11).unwrap();
        assert_eq!((prev.year(), prev.month()), (2019, 12));

        let prev = month_delta(&dt, -23).unwrap();
        assert_eq!((prev.year(), prev.month()), (2018, 12));

        assert_eq!(month_delta(&dt, 0).unwrap(), dt);
    }

    #[test]
    fn test_month_delta_overflow() {
        let dt = Utc.with_ymd_and_hms(2020, 11, 15, 0, 0, 0).unwrap();
        assert!(matches!(month_delta(&dt, i32::MAX), Err(SsError::InvalidInput(_))));
        assert!(matches!(month_delta(&dt, i32::MIN), Err(SsError::InvalidInput(_))));
    }
}
