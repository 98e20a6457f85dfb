/*!
 Timestamps as they are stored in a property list.
*/

use std::fmt::{Display, Formatter, Result};

use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z
const REFERENCE_EPOCH_UNIX: i64 = 978_307_200;

/// A point in time, stored as seconds relative to 2001-01-01T00:00:00Z
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Date {
    seconds: f64,
}

impl Date {
    pub fn from_seconds_since_reference(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn seconds_since_reference(&self) -> f64 {
        self.seconds
    }

    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        let whole = (datetime.timestamp() - REFERENCE_EPOCH_UNIX) as f64;
        let fraction = f64::from(datetime.timestamp_subsec_nanos()) / 1e9;
        Self::from_seconds_since_reference(whole + fraction)
    }

    /// Convert to a calendar timestamp, truncated to the containing whole second
    ///
    /// Returns `None` if the value is not finite or is outside of the supported calendar range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.seconds.is_finite() {
            return None;
        }
        let floored = self.seconds.floor();
        if floored.abs() > 1e16 {
            return None;
        }
        let unix = (floored as i64).checked_add(REFERENCE_EPOCH_UNIX)?;
        DateTime::from_timestamp(unix, 0)
    }

    /// Build a timestamp from Gregorian calendar fields, carrying any out-of-range field
    /// forward into the next period, so that January 32nd is February 1st
    pub fn from_components(
        year: i64,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        let months = year
            .checked_mul(12)?
            .checked_add(i64::from(month))?
            .checked_sub(1)?;
        let year = i32::try_from(months.div_euclid(12)).ok()?;
        let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;

        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
        let date = match day.checked_sub(1) {
            Some(offset) => first_of_month.checked_add_days(Days::new(u64::from(offset)))?,
            None => first_of_month.checked_sub_days(Days::new(1))?,
        };
        let seconds = i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second);
        let datetime = date
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(TimeDelta::try_seconds(seconds)?)?
            .and_utc();

        Some(Self::from_datetime(&datetime))
    }
}

impl Display for Date {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self.to_datetime() {
            Some(datetime) => write!(fmt, "{}", datetime.format("%Y-%m-%dT%H:%M:%SZ")),
            None => write!(fmt, "{} seconds since 2001-01-01T00:00:00Z", self.seconds),
        }
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(&datetime)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::value::date::Date;

    #[test]
    fn can_convert_reference_epoch() {
        let epoch = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(Date::from_datetime(&epoch).seconds_since_reference(), 0.0);
    }

    #[test]
    fn can_normalize_day_overflow() {
        let date = Date::from_components(2024, 1, 32, 20, 43, 14).unwrap();

        assert_eq!(date.seconds_since_reference(), 728512994.0);
    }

    #[test]
    fn can_normalize_month_overflow() {
        let overflow = Date::from_components(2023, 13, 1, 0, 0, 0).unwrap();
        let expected = Date::from_components(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(overflow, expected);
    }

    #[test]
    fn can_display() {
        let date = Date::from_seconds_since_reference(728512994.0);

        assert_eq!(date.to_string(), "2024-02-01T20:43:14Z");
    }

    #[test]
    fn can_truncate_fractional_seconds() {
        let date = Date::from_seconds_since_reference(-0.5);

        assert_eq!(date.to_string(), "2000-12-31T23:59:59Z");
    }

    #[test]
    fn cant_convert_nan() {
        assert!(Date::from_seconds_since_reference(f64::NAN)
            .to_datetime()
            .is_none());
    }
}
